//! Descriptive tables keyed by reference code
//!
//! An event category with a descriptive table is inner-joined against it:
//! events whose code is absent from the table are dropped.

use std::path::Path;

use rustc_hash::FxHashMap;

use crate::error::{PipelineError, Result};
use crate::utils::io::table::{cell, read_table};

/// Label columns carried over from descriptive tables
pub const LABEL_COLUMNS: [&str; 4] = ["CATEGORY", "LABEL", "LONG_TITLE", "SHORT_TITLE"];

/// Human-readable fields per reference code
#[derive(Debug, Clone, Default)]
pub struct DescriptiveTable {
    label_columns: Vec<String>,
    rows: FxHashMap<String, Vec<Option<String>>>,
}

impl DescriptiveTable {
    /// Build a table in memory
    #[must_use]
    pub fn new(label_columns: Vec<String>, rows: FxHashMap<String, Vec<Option<String>>>) -> Self {
        Self { label_columns, rows }
    }

    /// Load a table keyed by `ITEMID` or `ICD9_CODE`.
    ///
    /// Only the columns in [`LABEL_COLUMNS`] are retained. The first row of
    /// a duplicated code wins.
    pub fn load(path: &Path) -> Result<Self> {
        let (headers, records) = read_table(path)
            .map_err(|e| PipelineError::Reference(format!("descriptive table: {e}")))?;
        let key_col = headers
            .require(&["ITEMID", "ICD9_CODE"])
            .map_err(|e| PipelineError::Reference(e.to_string()))?;

        let label_cols: Vec<(String, usize)> = LABEL_COLUMNS
            .iter()
            .filter_map(|name| headers.find(&[*name]).map(|i| ((*name).to_string(), i)))
            .collect();

        let mut rows = FxHashMap::default();
        for record in &records {
            let Some(code) = cell(record, Some(key_col)) else {
                continue;
            };
            rows.entry(code.to_string()).or_insert_with(|| {
                label_cols
                    .iter()
                    .map(|(_, i)| cell(record, Some(*i)).map(str::to_string))
                    .collect()
            });
        }

        log::info!("Loaded {} descriptive rows from {}", rows.len(), path.display());
        Ok(Self {
            label_columns: label_cols.into_iter().map(|(name, _)| name).collect(),
            rows,
        })
    }

    /// Names of the retained label columns
    #[must_use]
    pub fn label_columns(&self) -> &[String] {
        &self.label_columns
    }

    /// Whether a code has a row
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.rows.contains_key(code)
    }

    /// Present label fields of a code as `(column, value)` pairs
    pub fn labels<'a>(
        &'a self,
        code: &str,
    ) -> Option<impl Iterator<Item = (&'a str, &'a str)> + use<'a>> {
        let values = self.rows.get(code)?;
        Some(
            self.label_columns
                .iter()
                .zip(values)
                .filter_map(|(name, value)| value.as_deref().map(|v| (name.as_str(), v))),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_keeps_label_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("D_ITEMS.csv");
        std::fs::write(
            &path,
            "ROW_ID,ITEMID,LABEL,ABBREVIATION,DBSOURCE,CATEGORY\n\
             1,211,Heart Rate,HR,carevue,Routine Vital Signs\n\
             2,211,Duplicate,HR,carevue,\n\
             3,618,Respiratory Rate,,carevue,\n",
        )
        .unwrap();

        let table = DescriptiveTable::load(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.label_columns(), ["CATEGORY", "LABEL"]);

        let labels: Vec<_> = table.labels("211").unwrap().collect();
        assert_eq!(labels, vec![("CATEGORY", "Routine Vital Signs"), ("LABEL", "Heart Rate")]);

        let labels: Vec<_> = table.labels("618").unwrap().collect();
        assert_eq!(labels, vec![("LABEL", "Respiratory Rate")]);

        assert!(table.labels("999").is_none());
    }
}
