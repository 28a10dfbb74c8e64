//! ICU stay and subject models

use chrono::NaiveDateTime;

use crate::models::event::RawEvent;
use crate::models::health::Diagnosis;

/// Boundaries and outcome of one ICU stay
#[derive(Debug, Clone, PartialEq)]
pub struct Stay {
    pub subject_id: u64,
    pub hadm_id: Option<u64>,
    pub stay_id: u64,
    /// Admission time (`INTIME`)
    pub intime: NaiveDateTime,
    /// Discharge time (`OUTTIME`)
    pub outtime: NaiveDateTime,
    pub deathtime: Option<NaiveDateTime>,
    /// Length of stay in days, as recorded
    pub los_days: Option<f64>,
    pub mortality: bool,
    pub age: Option<f64>,
    pub gender: Option<String>,
    pub ethnicity: Option<String>,
}

impl Stay {
    /// Create a stay with only its identifiers and boundaries
    #[must_use]
    pub const fn new(
        subject_id: u64,
        stay_id: u64,
        intime: NaiveDateTime,
        outtime: NaiveDateTime,
    ) -> Self {
        Self {
            subject_id,
            hadm_id: None,
            stay_id,
            intime,
            outtime,
            deathtime: None,
            los_days: None,
            mortality: false,
            age: None,
            gender: None,
            ethnicity: None,
        }
    }

    /// Set the death time and mark the stay as ending in death
    #[must_use]
    pub const fn with_death(mut self, deathtime: NaiveDateTime) -> Self {
        self.deathtime = Some(deathtime);
        self.mortality = true;
        self
    }

    /// Set the recorded length of stay in days
    #[must_use]
    pub const fn with_los_days(mut self, days: f64) -> Self {
        self.los_days = Some(days);
        self
    }

    /// Hours between admission and death, if the subject died
    #[must_use]
    pub fn lived_hours(&self) -> Option<f64> {
        self.deathtime
            .map(|death| crate::algorithm::alignment::elapsed_hours(death, self.intime))
    }
}

/// Everything the record source knows about one subject
#[derive(Debug, Clone, Default)]
pub struct Subject {
    pub id: u64,
    pub stays: Vec<Stay>,
    pub diagnoses: Vec<Diagnosis>,
    /// Events from every category, in source order
    pub events: Vec<RawEvent>,
}
