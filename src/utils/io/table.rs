//! Column lookup over delimited text tables
//!
//! Tables from different sources name the same concept differently
//! (`CHARTTIME` or `STARTTIME`, `ITEMID` or `ICD9_CODE`). A [`HeaderIndex`]
//! resolves a list of accepted names to a column position.

use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::util::open_file;
use crate::error::{PipelineError, Result};

/// Column positions of a table header
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    table: String,
    names: Vec<String>,
}

impl HeaderIndex {
    /// Build an index from a header record; `table` is used in error messages
    #[must_use]
    pub fn new(table: impl Into<String>, headers: &StringRecord) -> Self {
        Self {
            table: table.into(),
            names: headers.iter().map(|h| h.trim().to_string()).collect(),
        }
    }

    /// Position of the first accepted name present in the header
    #[must_use]
    pub fn find(&self, accepted: &[&str]) -> Option<usize> {
        accepted
            .iter()
            .find_map(|name| self.names.iter().position(|h| h == name))
    }

    /// Like [`find`](Self::find) but fails with a schema error when absent
    pub fn require(&self, accepted: &[&str]) -> Result<usize> {
        self.find(accepted).ok_or_else(|| {
            PipelineError::Schema(format!(
                "{} has none of the columns {}",
                self.table,
                accepted.join(", ")
            ))
        })
    }
}

/// Trimmed, non-empty cell of a record
#[must_use]
pub fn cell(record: &StringRecord, index: Option<usize>) -> Option<&str> {
    index
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Owned variant of [`cell`]
#[must_use]
pub fn owned_cell(record: &StringRecord, index: Option<usize>) -> Option<String> {
    cell(record, index).map(str::to_string)
}

/// Parse an identifier cell, accepting float renderings such as `123.0`
#[must_use]
pub fn parse_id(value: Option<&str>) -> Option<u64> {
    let value = value?;
    value.parse::<u64>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
            .map(|f| f as u64)
    })
}

/// Parse a numeric cell
#[must_use]
pub fn parse_number(value: Option<&str>) -> Option<f64> {
    value.and_then(|v| v.parse::<f64>().ok()).filter(|f| f.is_finite())
}

/// Parse a 0/1 flag cell; anything non-zero is true
#[must_use]
pub fn parse_flag(value: Option<&str>) -> Option<bool> {
    parse_number(value).map(|f| f != 0.0)
}

/// Open a headed CSV file with trimmed fields
pub fn csv_reader(path: &Path) -> Result<csv::Reader<File>> {
    let file = open_file(path)?;
    Ok(ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(file))
}

/// Read all records of a headed CSV file together with its header index
pub fn read_table(path: &Path) -> Result<(HeaderIndex, Vec<StringRecord>)> {
    let mut reader = csv_reader(path)?;
    let headers = HeaderIndex::new(path.display().to_string(), reader.headers()?);
    let records = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((headers, records))
}
