//! Clinical event models
//!
//! Events move through three shapes: [`RawEvent`] as read from an event
//! table, [`Event`] once its timestamps are parsed, and [`AlignedEvent`]
//! once it belongs to an episode and carries elapsed hours.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// One event row exactly as read from an event table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEvent {
    /// Source table category (e.g. `chartevents`)
    pub category: String,
    /// Subject the event belongs to
    pub subject_id: u64,
    /// Explicit stay id, when recorded
    pub stay_id: Option<u64>,
    /// Event time, or start time for start/end events
    pub time: Option<String>,
    /// End time for start/end events
    pub end_time: Option<String>,
    /// Reference code joined against descriptive and variable tables
    pub code: Option<String>,
    /// Recorded value
    pub value: Option<String>,
    /// Unit of measure
    pub unit: Option<String>,
}

/// An event with parsed timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub category: String,
    pub subject_id: u64,
    pub stay_id: Option<u64>,
    pub time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub code: Option<String>,
    pub value: Option<String>,
    pub unit: Option<String>,
    /// Position of the event in the subject's source order
    pub order: usize,
}

/// An event assigned to an episode, on the elapsed-hours axis
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedEvent {
    pub event: Event,
    /// Hours since the episode admission
    pub hours: f64,
    /// Hours since admission of the end bound, for start/end events
    pub end_hours: Option<f64>,
    /// Descriptive label fields joined from the category's table
    pub labels: BTreeMap<String, String>,
    /// Canonical variable name after mapping
    pub variable: Option<String>,
}

impl AlignedEvent {
    /// Create an aligned event with no enrichment yet
    #[must_use]
    pub const fn new(event: Event, hours: f64, end_hours: Option<f64>) -> Self {
        Self {
            event,
            hours,
            end_hours,
            labels: BTreeMap::new(),
            variable: None,
        }
    }

    /// The event category
    #[must_use]
    pub fn category(&self) -> &str {
        &self.event.category
    }

    /// The reference code, if any
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.event.code.as_deref()
    }

    /// The recorded value, if present and non-blank
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.event
            .value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}
