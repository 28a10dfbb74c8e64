//! Reference tables
//!
//! Lookup maps, plausible ranges and descriptive tables are loaded once
//! before any subject is processed and shared read-only afterwards.

pub mod descriptive;
pub mod ranges;
pub mod variable_map;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::ReferencePaths;
use crate::error::{PipelineError, Result};

pub use descriptive::{DescriptiveTable, LABEL_COLUMNS};
pub use ranges::{RangeCheck, VariableRange, VariableRanges};
pub use variable_map::VariableMap;

/// All reference data used by the event consolidator
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    pub variables: VariableMap,
    pub ranges: VariableRanges,
    descriptive: BTreeMap<String, Arc<DescriptiveTable>>,
}

impl ReferenceTables {
    #[must_use]
    pub fn new(variables: VariableMap, ranges: VariableRanges) -> Self {
        Self {
            variables,
            ranges,
            descriptive: BTreeMap::new(),
        }
    }

    /// Attach a descriptive table to an event category
    #[must_use]
    pub fn with_descriptive(mut self, category: &str, table: Arc<DescriptiveTable>) -> Self {
        self.descriptive.insert(category.to_string(), table);
        self
    }

    /// Load every table named in `paths`.
    ///
    /// A descriptive table file shared by several categories is read once.
    /// Missing descriptive files are skipped with a warning; a missing
    /// variable map or range file is fatal.
    pub fn load(paths: &ReferencePaths) -> Result<Self> {
        let variables = VariableMap::load(&paths.variable_map)?;
        if variables.is_empty() {
            return Err(PipelineError::Reference(format!(
                "no usable rows in {}",
                paths.variable_map.display()
            )));
        }
        let ranges = match &paths.variable_ranges {
            Some(path) => VariableRanges::load(path)?,
            None => VariableRanges::default(),
        };

        let mut tables = Self::new(variables, ranges);
        let Some(dir) = &paths.descriptive_dir else {
            return Ok(tables);
        };

        let mut loaded: BTreeMap<&str, Arc<DescriptiveTable>> = BTreeMap::new();
        for (category, file_name) in &paths.descriptive_tables {
            let table = match loaded.get(file_name.as_str()) {
                Some(table) => Arc::clone(table),
                None => {
                    let path = dir.join(file_name);
                    if !path.is_file() {
                        log::warn!(
                            "Descriptive table for {category} not found: {}",
                            path.display()
                        );
                        continue;
                    }
                    let table = Arc::new(DescriptiveTable::load(&path)?);
                    loaded.insert(file_name.as_str(), Arc::clone(&table));
                    table
                }
            };
            tables.descriptive.insert(category.clone(), table);
        }

        Ok(tables)
    }

    /// Descriptive table of a category, if one is configured
    #[must_use]
    pub fn descriptive_for(&self, category: &str) -> Option<&DescriptiveTable> {
        self.descriptive.get(category).map(AsRef::as_ref)
    }
}
