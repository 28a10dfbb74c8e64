//! Shared fixtures for the pipeline integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use icu_timeseries::config::TimestampFormatConfig;
use icu_timeseries::reference::{ReferenceTables, VariableMap, VariableRanges};
use icu_timeseries::{CsvSubjectSource, DirectoryEpisodeSink, SeriesFormat};

pub const STAYS_HEADER: &str = "SUBJECT_ID,HADM_ID,ICUSTAY_ID,INTIME,OUTTIME,DEATHTIME,LOS,MORTALITY,AGE,GENDER,ETHNICITY";
pub const EVENTS_HEADER: &str = "SUBJECT_ID,HADM_ID,ICUSTAY_ID,CHARTTIME,ITEMID,VALUE,VALUEUOM";

/// Write a subject directory with a stays table and a single event table
pub fn write_subject(root: &Path, subject_id: u64, stays: &[&str], events: &[&str]) -> PathBuf {
    let dir = root.join(subject_id.to_string());
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("stays.csv"), table(STAYS_HEADER, stays)).unwrap();
    fs::write(dir.join("events.csv"), table(EVENTS_HEADER, events)).unwrap();
    dir
}

fn table(header: &str, rows: &[&str]) -> String {
    let mut text = String::from(header);
    text.push('\n');
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text
}

/// Subject 1 of the decompensation walkthrough: one two-day stay ending in
/// death 36 hours after admission, with one heart rate reading at 02:00.
pub fn write_dying_subject(root: &Path) -> PathBuf {
    write_subject(
        root,
        1,
        &["1,10,100,2100-01-01 00:00:00,2100-01-03 00:00:00,2100-01-02 12:00:00,2,1,70,M,WHITE"],
        &["1,10,100,2100-01-01 02:00:00,211,80,bpm"],
    )
}

/// Heart rate and glucose reference map, no ranges or descriptive tables
pub fn reference_tables() -> ReferenceTables {
    ReferenceTables::new(
        VariableMap::from_pairs([("211", "Heart Rate"), ("50931", "Glucose")]),
        VariableRanges::default(),
    )
}

pub fn source(root: &Path) -> CsvSubjectSource {
    CsvSubjectSource::new(root, TimestampFormatConfig::default()).unwrap()
}

pub fn sink(root: &Path, format: SeriesFormat) -> DirectoryEpisodeSink {
    DirectoryEpisodeSink::new(root, format).unwrap()
}

/// Every file under `dir` with its contents, sorted by relative path
pub fn snapshot(dir: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut files = Vec::new();
    collect(dir, dir, &mut files);
    files.sort();
    files
}

fn collect(base: &Path, dir: &Path, files: &mut Vec<(PathBuf, Vec<u8>)>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect(base, &path, files);
        } else {
            let relative = path.strip_prefix(base).unwrap().to_path_buf();
            files.push((relative, fs::read(&path).unwrap()));
        }
    }
}
