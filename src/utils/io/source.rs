//! CSV subject directories as a record source

use std::path::{Path, PathBuf};

use crate::common::traits::RecordSource;
use crate::config::TimestampFormatConfig;
use crate::error::util::validate_directory;
use crate::error::{PipelineError, Result};
use crate::models::event::RawEvent;
use crate::models::health::Diagnosis;
use crate::models::stay::Subject;
use crate::utils::io::paths::{DIAGNOSES_FILE, STAYS_FILE, find_event_tables, find_subject_dirs};
use crate::utils::io::stays::read_stays;
use crate::utils::io::table::{cell, owned_cell, parse_id, read_table};

/// Read the diagnoses of one subject; a missing file means none
pub fn read_diagnoses(path: &Path, subject_id: u64) -> Result<Vec<Diagnosis>> {
    if !path.is_file() {
        return Ok(Vec::new());
    }
    let (headers, records) = read_table(path)?;
    let code_col = headers.require(&["ICD9_CODE", "ICD_CODE"])?;
    let stay_col = headers.find(&["ICUSTAY_ID", "STAY_ID"]);
    let subject_col = headers.find(&["SUBJECT_ID"]);

    Ok(records
        .iter()
        .filter_map(|record| {
            let code = owned_cell(record, Some(code_col))?;
            Some(Diagnosis::new(
                parse_id(cell(record, subject_col)).unwrap_or(subject_id),
                parse_id(cell(record, stay_col)),
                code,
            ))
        })
        .collect())
}

/// Read one event table.
///
/// The time column is `CHARTTIME` or `STARTTIME`; everything else is
/// optional. Timestamps are kept as text and parsed during alignment. A table
/// without a time column still yields its rows, which alignment then drops
/// as malformed.
pub fn read_events(path: &Path, category: &str, subject_id: u64) -> Result<Vec<RawEvent>> {
    let (headers, records) = read_table(path)?;
    let time_col = headers.find(&["CHARTTIME", "STARTTIME"]);
    if time_col.is_none() {
        log::warn!(
            "{}: no CHARTTIME or STARTTIME column, {} {category} rows have no time",
            path.display(),
            records.len()
        );
    }
    let end_col = headers.find(&["ENDTIME"]);
    let subject_col = headers.find(&["SUBJECT_ID"]);
    let stay_col = headers.find(&["ICUSTAY_ID", "STAY_ID"]);
    let code_col = headers.find(&["ITEMID", "ICD9_CODE"]);
    let value_col = headers.find(&["VALUE", "AMOUNT"]);
    let unit_col = headers.find(&["VALUEUOM", "AMOUNTUOM"]);

    Ok(records
        .iter()
        .map(|record| RawEvent {
            category: category.to_string(),
            subject_id: parse_id(cell(record, subject_col)).unwrap_or(subject_id),
            stay_id: parse_id(cell(record, stay_col)),
            time: owned_cell(record, time_col),
            end_time: owned_cell(record, end_col),
            code: owned_cell(record, code_col),
            value: owned_cell(record, value_col),
            unit: owned_cell(record, unit_col),
        })
        .collect())
}

/// Subject directories under a common root
#[derive(Debug, Clone)]
pub struct CsvSubjectSource {
    root: PathBuf,
    formats: TimestampFormatConfig,
}

impl CsvSubjectSource {
    /// Open a subject root; fails when it is not a readable directory
    pub fn new(root: impl Into<PathBuf>, formats: TimestampFormatConfig) -> Result<Self> {
        let root = root.into();
        validate_directory(&root)?;
        Ok(Self { root, formats })
    }

    /// Directory of one subject
    #[must_use]
    pub fn subject_dir(&self, subject_id: u64) -> PathBuf {
        self.root.join(subject_id.to_string())
    }

    fn read_subject(&self, subject_id: u64) -> Result<Subject> {
        let dir = self.subject_dir(subject_id);
        if !dir.is_dir() {
            return Err(PipelineError::source_unavailable(subject_id, "no subject directory"));
        }
        let stays_path = dir.join(STAYS_FILE);
        if !stays_path.is_file() {
            return Err(PipelineError::source_unavailable(subject_id, "no stays.csv"));
        }

        let stays = read_stays(&stays_path, subject_id, &self.formats)?;
        let diagnoses = read_diagnoses(&dir.join(DIAGNOSES_FILE), subject_id)?;

        let mut events = Vec::new();
        for (category, path) in find_event_tables(&dir)? {
            let table = read_events(&path, &category, subject_id)?;
            log::debug!("Subject {subject_id}: {} {category} events", table.len());
            events.extend(table);
        }

        Ok(Subject {
            id: subject_id,
            stays,
            diagnoses,
            events,
        })
    }
}

impl RecordSource for CsvSubjectSource {
    fn subjects(&self) -> Result<Vec<u64>> {
        Ok(find_subject_dirs(&self.root)?
            .into_iter()
            .map(|(id, _)| id)
            .collect())
    }

    fn load_subject(&self, subject_id: u64) -> Result<Subject> {
        self.read_subject(subject_id).map_err(|e| match e {
            PipelineError::SourceUnavailable { .. } => e,
            other => PipelineError::source_unavailable(subject_id, other),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_subject(root: &Path) {
        let dir = root.join("42");
        fs::create_dir(&dir).unwrap();
        fs::write(
            dir.join("stays.csv"),
            "SUBJECT_ID,ICUSTAY_ID,INTIME,OUTTIME\n42,1,2100-01-01 00:00:00,2100-01-02 00:00:00\n",
        )
        .unwrap();
        fs::write(
            dir.join("diagnoses.csv"),
            "SUBJECT_ID,ICUSTAY_ID,ICD9_CODE\n42,1,4019\n42,,\n",
        )
        .unwrap();
        fs::write(
            dir.join("events.csv"),
            "SUBJECT_ID,HADM_ID,ICUSTAY_ID,CHARTTIME,ITEMID,VALUE,VALUEUOM\n\
             42,9,1,2100-01-01 02:00:00,211,80,bpm\n\
             42,9,,2100-01-01 03:00:00,211,,bpm\n",
        )
        .unwrap();
        fs::write(
            dir.join("events_procedureevents_mv.csv"),
            "SUBJECT_ID,STARTTIME,ENDTIME,ITEMID,AMOUNT,AMOUNTUOM\n\
             42,2100-01-01 04:00:00,2100-01-01 05:30:00,225792,1,ml\n",
        )
        .unwrap();
    }

    #[test]
    fn test_load_subject() {
        let root = tempfile::tempdir().unwrap();
        write_subject(root.path());
        fs::create_dir(root.path().join("scratch")).unwrap();

        let source = CsvSubjectSource::new(root.path(), TimestampFormatConfig::default()).unwrap();
        assert_eq!(source.subjects().unwrap(), vec![42]);

        let subject = source.load_subject(42).unwrap();
        assert_eq!(subject.stays.len(), 1);
        assert_eq!(subject.diagnoses, vec![Diagnosis::new(42, Some(1), "4019".to_string())]);
        assert_eq!(subject.events.len(), 3);

        let chart = &subject.events[0];
        assert_eq!(chart.category, "events");
        assert_eq!(chart.stay_id, Some(1));
        assert_eq!(chart.code.as_deref(), Some("211"));
        assert_eq!(subject.events[1].value, None);

        let procedure = &subject.events[2];
        assert_eq!(procedure.category, "procedureevents_mv");
        assert_eq!(procedure.end_time.as_deref(), Some("2100-01-01 05:30:00"));
        assert_eq!(procedure.value.as_deref(), Some("1"));
        assert_eq!(procedure.unit.as_deref(), Some("ml"));
    }

    #[test]
    fn test_missing_subject_is_unavailable() {
        let root = tempfile::tempdir().unwrap();
        let source = CsvSubjectSource::new(root.path(), TimestampFormatConfig::default()).unwrap();
        let err = source.load_subject(1).unwrap_err();
        assert!(matches!(err, PipelineError::SourceUnavailable { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_untimed_event_table_keeps_subject() {
        let root = tempfile::tempdir().unwrap();
        write_subject(root.path());
        fs::write(
            root.path().join("42").join("events_procedures_icd.csv"),
            "SUBJECT_ID,HADM_ID,ICD9_CODE\n42,9,9604\n",
        )
        .unwrap();

        let source = CsvSubjectSource::new(root.path(), TimestampFormatConfig::default()).unwrap();
        let subject = source.load_subject(42).unwrap();
        assert_eq!(subject.events.len(), 4);

        let untimed = subject
            .events
            .iter()
            .find(|e| e.category == "procedures_icd")
            .unwrap();
        assert_eq!(untimed.time, None);
        assert_eq!(untimed.code.as_deref(), Some("9604"));
    }

    #[test]
    fn test_unreadable_event_table_is_unavailable() {
        let root = tempfile::tempdir().unwrap();
        write_subject(root.path());
        fs::write(
            root.path().join("42").join("events_labevents.csv"),
            b"CHARTTIME,ITEMID,VALUE\n2100-01-01,1,\xff\n",
        )
        .unwrap();

        let source = CsvSubjectSource::new(root.path(), TimestampFormatConfig::default()).unwrap();
        let err = source.load_subject(42).unwrap_err();
        assert!(matches!(err, PipelineError::SourceUnavailable { .. }));
    }
}
