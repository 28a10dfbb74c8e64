//! Reading and writing `stays.csv`

use std::path::Path;

use chrono::NaiveDateTime;

use crate::algorithm::alignment::{parse_optional_timestamp, parse_timestamp};
use crate::config::TimestampFormatConfig;
use crate::error::util::create_file;
use crate::error::{PipelineError, Result};
use crate::models::stay::Stay;
use crate::utils::io::table::{cell, owned_cell, parse_flag, parse_id, parse_number, read_table};

/// Timestamp layout used for every written file
pub const OUTPUT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Columns of a written stays file
pub const STAY_COLUMNS: [&str; 11] = [
    "SUBJECT_ID",
    "HADM_ID",
    "ICUSTAY_ID",
    "INTIME",
    "OUTTIME",
    "DEATHTIME",
    "LOS",
    "MORTALITY",
    "AGE",
    "GENDER",
    "ETHNICITY",
];

/// Read the stays of one subject.
///
/// `ICUSTAY_ID`, `INTIME` and `OUTTIME` are required. Rows with a missing id
/// or unparsable bounds are skipped with a warning. Without a `MORTALITY`
/// column, a stay ends in death when it has a death time.
pub fn read_stays(path: &Path, subject_id: u64, formats: &TimestampFormatConfig) -> Result<Vec<Stay>> {
    let (headers, records) = read_table(path)?;
    let stay_col = headers.require(&["ICUSTAY_ID", "STAY_ID"])?;
    let intime_col = headers.require(&["INTIME"])?;
    let outtime_col = headers.require(&["OUTTIME"])?;
    let subject_col = headers.find(&["SUBJECT_ID"]);
    let hadm_col = headers.find(&["HADM_ID"]);
    let death_col = headers.find(&["DEATHTIME"]);
    let los_col = headers.find(&["LOS"]);
    let mortality_col = headers.find(&["MORTALITY"]);
    let age_col = headers.find(&["AGE"]);
    let gender_col = headers.find(&["GENDER"]);
    let ethnicity_col = headers.find(&["ETHNICITY"]);

    let mut stays = Vec::with_capacity(records.len());
    for (row, record) in records.iter().enumerate() {
        let Some(stay_id) = parse_id(cell(record, Some(stay_col))) else {
            log::warn!("{}: row {} has no stay id", path.display(), row + 1);
            continue;
        };
        let bounds = parse_timestamp(cell(record, Some(intime_col)), formats)
            .and_then(|intime| Ok((intime, parse_timestamp(cell(record, Some(outtime_col)), formats)?)));
        let (intime, outtime) = match bounds {
            Ok(bounds) => bounds,
            Err(e) => {
                log::warn!("{}: skipping stay {stay_id}: {e}", path.display());
                continue;
            }
        };
        let deathtime = parse_optional_timestamp(cell(record, death_col), formats).unwrap_or_else(|e| {
            log::warn!("{}: stay {stay_id} death time ignored: {e}", path.display());
            None
        });

        stays.push(Stay {
            subject_id: parse_id(cell(record, subject_col)).unwrap_or(subject_id),
            hadm_id: parse_id(cell(record, hadm_col)),
            stay_id,
            intime,
            outtime,
            deathtime,
            los_days: parse_number(cell(record, los_col)),
            mortality: parse_flag(cell(record, mortality_col)).unwrap_or(deathtime.is_some()),
            age: parse_number(cell(record, age_col)),
            gender: owned_cell(record, gender_col),
            ethnicity: owned_cell(record, ethnicity_col),
        });
    }

    Ok(stays)
}

fn format_time(time: Option<NaiveDateTime>) -> String {
    time.map(|t| t.format(OUTPUT_TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

fn format_number<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Write stays in the layout [`read_stays`] accepts
pub fn write_stays(path: &Path, stays: &[Stay]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(create_file(path)?);
    writer.write_record(STAY_COLUMNS)?;
    for stay in stays {
        writer.write_record([
            stay.subject_id.to_string(),
            format_number(stay.hadm_id),
            stay.stay_id.to_string(),
            format_time(Some(stay.intime)),
            format_time(Some(stay.outtime)),
            format_time(stay.deathtime),
            format_number(stay.los_days),
            u8::from(stay.mortality).to_string(),
            format_number(stay.age),
            stay.gender.clone().unwrap_or_default(),
            stay.ethnicity.clone().unwrap_or_default(),
        ])?;
    }
    writer.flush().map_err(|e| PipelineError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_read_stays() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stays.csv");
        fs::write(
            &path,
            "SUBJECT_ID,HADM_ID,ICUSTAY_ID,INTIME,OUTTIME,DEATHTIME,LOS,AGE,GENDER\n\
             7,70,700,2100-01-01 00:00:00,2100-01-03 00:00:00,2100-01-02 12:00:00,2.0,64.2,M\n\
             7,71,701,2100-02-01 00:00:00,2100-02-02 00:00:00,,1.0,64.3,M\n\
             7,72,,2100-03-01 00:00:00,2100-03-02 00:00:00,,1.0,64.4,M\n\
             7,73,703,not a date,2100-03-02 00:00:00,,1.0,64.4,M\n",
        )
        .unwrap();

        let stays = read_stays(&path, 7, &TimestampFormatConfig::default()).unwrap();
        assert_eq!(stays.len(), 2);
        assert_eq!(stays[0].stay_id, 700);
        assert!(stays[0].mortality);
        assert_eq!(stays[0].lived_hours(), Some(36.0));
        assert_eq!(stays[0].los_days, Some(2.0));
        assert_eq!(stays[1].hadm_id, Some(71));
        assert!(!stays[1].mortality);
        assert_eq!(stays[1].gender.as_deref(), Some("M"));
    }

    #[test]
    fn test_missing_required_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stays.csv");
        fs::write(&path, "ICUSTAY_ID,INTIME\n1,2100-01-01\n").unwrap();
        let err = read_stays(&path, 1, &TimestampFormatConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Schema(_)));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stays.csv");
        let formats = TimestampFormatConfig::default();
        let intime = parse_timestamp(Some("2100-01-01 00:00:00"), &formats).unwrap();
        let outtime = parse_timestamp(Some("2100-01-03"), &formats).unwrap();
        let death = parse_timestamp(Some("2100-01-02 12:00:00"), &formats).unwrap();
        let stays = vec![Stay::new(3, 30, intime, outtime).with_death(death).with_los_days(2.0)];

        write_stays(&path, &stays).unwrap();
        assert_eq!(read_stays(&path, 3, &formats).unwrap(), stays);
    }
}
