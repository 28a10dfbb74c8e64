//! Reference code to canonical variable mapping

use std::collections::BTreeSet;
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::error::{PipelineError, Result};
use crate::utils::io::table::{cell, parse_number, read_table};

/// Maps raw reference codes to canonical variable names
#[derive(Debug, Clone, Default)]
pub struct VariableMap {
    by_code: FxHashMap<String, String>,
}

impl VariableMap {
    /// Build a map from `(code, variable)` pairs; later pairs override earlier
    pub fn from_pairs<I, C, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, V)>,
        C: Into<String>,
        V: Into<String>,
    {
        Self {
            by_code: pairs
                .into_iter()
                .map(|(c, v)| (c.into(), v.into()))
                .collect(),
        }
    }

    /// Load the map from a CSV file.
    ///
    /// Requires `ITEMID` and `VARIABLE` (or `LEVEL2`). When a `STATUS` column
    /// exists only `ready` rows are kept; when a `COUNT` column exists only
    /// rows with a positive count are kept.
    pub fn load(path: &Path) -> Result<Self> {
        let (headers, records) = read_table(path)
            .map_err(|e| PipelineError::Reference(format!("variable map: {e}")))?;
        let code_col = headers
            .require(&["ITEMID"])
            .map_err(|e| PipelineError::Reference(e.to_string()))?;
        let var_col = headers
            .require(&["VARIABLE", "LEVEL2"])
            .map_err(|e| PipelineError::Reference(e.to_string()))?;
        let status_col = headers.find(&["STATUS"]);
        let count_col = headers.find(&["COUNT"]);

        let mut by_code = FxHashMap::default();
        for record in &records {
            if status_col.is_some() && cell(record, status_col) != Some("ready") {
                continue;
            }
            if count_col.is_some() && parse_number(cell(record, count_col)).is_none_or(|c| c <= 0.0) {
                continue;
            }
            let (Some(code), Some(variable)) = (cell(record, Some(code_col)), cell(record, Some(var_col)))
            else {
                continue;
            };
            by_code.insert(code.to_string(), variable.to_string());
        }

        log::info!("Loaded {} variable mappings from {}", by_code.len(), path.display());
        Ok(Self { by_code })
    }

    /// Canonical variable of a code
    #[must_use]
    pub fn variable(&self, code: &str) -> Option<&str> {
        self.by_code.get(code).map(String::as_str)
    }

    /// Distinct canonical variables, sorted
    #[must_use]
    pub fn variables(&self) -> BTreeSet<&str> {
        self.by_code.values().map(String::as_str).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}
