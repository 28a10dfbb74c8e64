//! Episodic summary of a stay
//!
//! One row per episode with demographics, outcome, and one indicator column
//! per diagnosis code seen for the subject. The sampling stage reads this row
//! back as the episode's label.

use std::collections::BTreeSet;

use crate::models::health::Diagnosis;
use crate::models::series::EpisodeTimeSeries;
use crate::models::stay::Stay;

/// Fixed leading columns of a summary file
pub const SUMMARY_COLUMNS: [&str; 8] = [
    "Icustay",
    "Age",
    "Gender",
    "Ethnicity",
    "Height",
    "Weight",
    "Length of Stay",
    "Mortality",
];

/// Code a recorded gender: F=1, M=2, anything else 3, missing 0
#[must_use]
pub fn gender_code(gender: Option<&str>) -> u8 {
    match gender.map(str::trim) {
        None | Some("") => 0,
        Some("F") => 1,
        Some("M") => 2,
        Some(_) => 3,
    }
}

/// Code the leading group of a recorded ethnicity
#[must_use]
pub fn ethnicity_code(ethnicity: Option<&str>) -> u8 {
    let Some(ethnicity) = ethnicity else {
        return 0;
    };
    let group = ethnicity
        .split(" OR ")
        .next()
        .and_then(|s| s.split(" - ").next())
        .and_then(|s| s.split('/').next())
        .unwrap_or_default()
        .trim();
    match group {
        "ASIAN" => 1,
        "BLACK" | "CARIBBEAN ISLAND" => 2,
        "HISPANIC" | "SOUTH AMERICAN" => 3,
        "WHITE" | "MIDDLE EASTERN" | "PORTUGUESE" => 4,
        _ => 0,
    }
}

/// Summary row of one episode
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
    pub icustay: u64,
    pub age: Option<f64>,
    pub gender: u8,
    pub ethnicity: u8,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    /// Length of stay in days
    pub length_of_stay: Option<f64>,
    pub mortality: bool,
    /// `(code, present)` for every diagnosis code of the subject, sorted
    pub diagnoses: Vec<(String, bool)>,
}

impl EpisodeSummary {
    /// Column names of this summary
    #[must_use]
    pub fn header(&self) -> Vec<String> {
        SUMMARY_COLUMNS
            .iter()
            .map(|c| (*c).to_string())
            .chain(self.diagnoses.iter().map(|(code, _)| code.clone()))
            .collect()
    }

    /// Cell values aligned with [`EpisodeSummary::header`]
    #[must_use]
    pub fn record(&self) -> Vec<String> {
        fn number(value: Option<f64>) -> String {
            value.map(|v| v.to_string()).unwrap_or_default()
        }

        let mut cells = vec![
            self.icustay.to_string(),
            number(self.age),
            self.gender.to_string(),
            self.ethnicity.to_string(),
            number(self.height),
            number(self.weight),
            number(self.length_of_stay),
            u8::from(self.mortality).to_string(),
        ];
        cells.extend(
            self.diagnoses
                .iter()
                .map(|(_, present)| u8::from(*present).to_string()),
        );
        cells
    }
}

/// Assemble the summary of one stay.
///
/// Height and weight are the first numeric values of those variables in the
/// episode series.
#[must_use]
pub fn assemble_summary(stay: &Stay, diagnoses: &[Diagnosis], series: &EpisodeTimeSeries) -> EpisodeSummary {
    let codes: BTreeSet<&str> = diagnoses.iter().map(|d| d.code.as_str()).collect();
    let present: BTreeSet<&str> = diagnoses
        .iter()
        .filter(|d| d.applies_to(stay.stay_id))
        .map(|d| d.code.as_str())
        .collect();

    EpisodeSummary {
        icustay: stay.stay_id,
        age: stay.age,
        gender: gender_code(stay.gender.as_deref()),
        ethnicity: ethnicity_code(stay.ethnicity.as_deref()),
        height: series.first_numeric("Height"),
        weight: series.first_numeric("Weight"),
        length_of_stay: stay.los_days,
        mortality: stay.mortality,
        diagnoses: codes
            .into_iter()
            .map(|code| (code.to_string(), present.contains(code)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::series::SeriesRow;
    use chrono::NaiveDateTime;

    fn time(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_gender_code() {
        assert_eq!(gender_code(Some("F")), 1);
        assert_eq!(gender_code(Some("M")), 2);
        assert_eq!(gender_code(Some("U")), 3);
        assert_eq!(gender_code(None), 0);
    }

    #[test]
    fn test_ethnicity_code() {
        assert_eq!(ethnicity_code(Some("WHITE")), 4);
        assert_eq!(ethnicity_code(Some("WHITE - RUSSIAN")), 4);
        assert_eq!(ethnicity_code(Some("BLACK/AFRICAN AMERICAN")), 2);
        assert_eq!(ethnicity_code(Some("HISPANIC OR LATINO")), 3);
        assert_eq!(ethnicity_code(Some("ASIAN - CHINESE")), 1);
        assert_eq!(ethnicity_code(Some("UNKNOWN/NOT SPECIFIED")), 0);
        assert_eq!(ethnicity_code(None), 0);
    }

    #[test]
    fn test_assemble_summary() {
        let mut stay = Stay::new(1, 100, time("2100-01-01 00:00:00"), time("2100-01-03 00:00:00"))
            .with_death(time("2100-01-02 12:00:00"))
            .with_los_days(2.0);
        stay.age = Some(70.5);
        stay.gender = Some("F".to_string());
        stay.ethnicity = Some("WHITE".to_string());

        let diagnoses = vec![
            Diagnosis::new(1, Some(100), "4280".to_string()),
            Diagnosis::new(1, Some(200), "41401".to_string()),
            Diagnosis::new(1, None, "2724".to_string()),
        ];
        let series = EpisodeTimeSeries::new(
            vec!["Height".to_string(), "Weight".to_string()],
            vec![
                SeriesRow {
                    hours: 1.0,
                    values: vec![None, Some("n/a".to_string())],
                },
                SeriesRow {
                    hours: 2.0,
                    values: vec![Some("165".to_string()), Some("71.5".to_string())],
                },
            ],
        )
        .unwrap();

        let summary = assemble_summary(&stay, &diagnoses, &series);
        assert_eq!(
            summary.header(),
            vec![
                "Icustay", "Age", "Gender", "Ethnicity", "Height", "Weight", "Length of Stay",
                "Mortality", "2724", "41401", "4280"
            ]
        );
        assert_eq!(
            summary.record(),
            vec!["100", "70.5", "1", "4", "165", "71.5", "2", "1", "1", "0", "1"]
        );
    }
}
