//! Episodic summary files, which double as the label files of the sampling
//! stage

use std::path::Path;

use serde::Deserialize;

use crate::algorithm::episodic::EpisodeSummary;
use crate::error::util::create_file;
use crate::error::{PipelineError, Result};
use crate::utils::io::table::{csv_reader, parse_flag, parse_id};

/// Label fields of an episode as read back from its summary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeLabel {
    pub icustay: u64,
    /// Length of stay in days
    pub length_of_stay: Option<f64>,
    pub mortality: bool,
}

/// Write a one-row summary file
pub fn write_summary(path: &Path, summary: &EpisodeSummary) -> Result<()> {
    let mut writer = csv::Writer::from_writer(create_file(path)?);
    writer.write_record(summary.header())?;
    writer.write_record(summary.record())?;
    writer.flush().map_err(|e| PipelineError::io(path, e))
}

/// Columns of a summary row the sampling stage needs
#[derive(Debug, Deserialize)]
struct LabelRow {
    #[serde(rename = "Icustay")]
    icustay: Option<String>,
    #[serde(rename = "Length of Stay", default, deserialize_with = "csv::invalid_option")]
    length_of_stay: Option<f64>,
    #[serde(rename = "Mortality", default)]
    mortality: Option<String>,
}

/// Read the label of an episode from the first row of its summary.
///
/// A missing, unreadable or empty file is a `MissingLabel`.
pub fn read_episode_label(path: &Path) -> Result<EpisodeLabel> {
    let missing = || PipelineError::MissingLabel {
        path: path.to_path_buf(),
    };
    if !path.is_file() {
        return Err(missing());
    }
    let mut reader = csv_reader(path)?;
    let row: LabelRow = match reader.deserialize().next() {
        Some(Ok(row)) => row,
        Some(Err(e)) => {
            log::debug!("Unreadable label file {}: {e}", path.display());
            return Err(missing());
        }
        None => return Err(missing()),
    };

    let icustay = parse_id(row.icustay.as_deref()).ok_or_else(|| {
        PipelineError::Schema(format!("{}: Icustay is not an id", path.display()))
    })?;

    Ok(EpisodeLabel {
        icustay,
        length_of_stay: row.length_of_stay.filter(|days| days.is_finite()),
        mortality: parse_flag(row.mortality.as_deref()).unwrap_or(false),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_write_then_read_label() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("episode1.csv");
        let summary = EpisodeSummary {
            icustay: 200,
            age: Some(55.0),
            gender: 2,
            ethnicity: 4,
            height: None,
            weight: Some(80.0),
            length_of_stay: Some(1.5),
            mortality: true,
            diagnoses: vec![("4019".to_string(), true)],
        };
        write_summary(&path, &summary).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "Icustay,Age,Gender,Ethnicity,Height,Weight,Length of Stay,Mortality,4019\n\
             200,55,2,4,,80,1.5,1,1\n"
        );

        let label = read_episode_label(&path).unwrap();
        assert_eq!(
            label,
            EpisodeLabel {
                icustay: 200,
                length_of_stay: Some(1.5),
                mortality: true
            }
        );
    }

    #[test]
    fn test_missing_or_empty_label() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("episode1.csv");
        assert!(matches!(
            read_episode_label(&path),
            Err(PipelineError::MissingLabel { .. })
        ));

        fs::write(&path, "").unwrap();
        assert!(matches!(
            read_episode_label(&path),
            Err(PipelineError::MissingLabel { .. })
        ));

        fs::write(&path, "Icustay,Length of Stay,Mortality\n").unwrap();
        assert!(matches!(
            read_episode_label(&path),
            Err(PipelineError::MissingLabel { .. })
        ));
    }

    #[test]
    fn test_blank_length_of_stay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("episode1.csv");
        fs::write(&path, "Icustay,Length of Stay,Mortality\n5,,0\n").unwrap();
        let label = read_episode_label(&path).unwrap();
        assert_eq!(label.length_of_stay, None);
        assert!(!label.mortality);
    }

    #[test]
    fn test_label_without_stay_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("episode1.csv");
        fs::write(&path, "Icustay,Length of Stay,Mortality\nabc,1.0,0\n").unwrap();
        assert!(matches!(read_episode_label(&path), Err(PipelineError::Schema(_))));
    }
}
