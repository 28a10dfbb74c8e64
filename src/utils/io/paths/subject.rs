//! Subject directory discovery
//!
//! A subject root holds one directory per subject, named by its numeric id.
//! Event tables inside a subject directory are `events.csv` and
//! `events_<category>.csv`.

use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};

/// File holding the stays of a subject
pub const STAYS_FILE: &str = "stays.csv";
/// File holding the diagnoses of a subject
pub const DIAGNOSES_FILE: &str = "diagnoses.csv";
/// Category of the unsuffixed event table
pub const DEFAULT_EVENT_CATEGORY: &str = "events";

/// Subject directories under `root` as `(id, path)`, ascending by id.
///
/// Entries whose name is not a number, and plain files, are skipped.
pub fn find_subject_dirs(root: &Path) -> Result<Vec<(u64, PathBuf)>> {
    let entries = std::fs::read_dir(root).map_err(|e| PipelineError::io(root, e))?;

    let mut dirs: Vec<(u64, PathBuf)> = entries
        .filter_map(std::result::Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name();
            let name = name.to_str()?;
            if !name.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let id = name.parse::<u64>().ok()?;
            let path = entry.path();
            path.is_dir().then_some((id, path))
        })
        .collect();

    dirs.sort_unstable_by_key(|(id, _)| *id);
    Ok(dirs)
}

/// Category of an event table file, if `file_name` is one
#[must_use]
pub fn event_table_category(file_name: &str) -> Option<&str> {
    let stem = file_name.strip_suffix(".csv")?;
    if stem == DEFAULT_EVENT_CATEGORY {
        return Some(DEFAULT_EVENT_CATEGORY);
    }
    stem.strip_prefix("events_").filter(|c| !c.is_empty())
}

/// Event tables of a subject directory as `(category, path)`, sorted by file name
pub fn find_event_tables(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = std::fs::read_dir(dir).map_err(|e| PipelineError::io(dir, e))?;

    let mut tables: Vec<(String, PathBuf)> = entries
        .filter_map(std::result::Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name();
            let category = event_table_category(name.to_str()?)?.to_string();
            let path = entry.path();
            path.is_file().then_some((category, path))
        })
        .collect();

    tables.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(tables)
}
