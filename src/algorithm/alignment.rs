//! Time alignment
//!
//! Converts absolute timestamps into hours elapsed since an episode's
//! admission. Events recorded before admission get negative hours and are
//! kept.

use chrono::{NaiveDate, NaiveDateTime};

use crate::config::TimestampFormatConfig;
use crate::error::{PipelineError, Result};
use crate::models::event::{AlignedEvent, Event, RawEvent};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Parse a timestamp, trying every configured format in order.
///
/// Missing, blank or unrecognised values fail with `MalformedTimestamp`.
pub fn parse_timestamp(value: Option<&str>, config: &TimestampFormatConfig) -> Result<NaiveDateTime> {
    let raw = value.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(PipelineError::malformed_timestamp(raw));
    }

    for format in &config.datetime_formats {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts);
        }
    }

    for format in &config.date_formats {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            if let Some(ts) = date.and_hms_opt(0, 0, 0) {
                return Ok(ts);
            }
        }
    }

    Err(PipelineError::malformed_timestamp(raw))
}

/// Parse an optional timestamp; blank means absent, unparsable is an error
pub fn parse_optional_timestamp(
    value: Option<&str>,
    config: &TimestampFormatConfig,
) -> Result<Option<NaiveDateTime>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => parse_timestamp(Some(raw), config).map(Some),
    }
}

/// Hours from `admission` to `time`; negative when `time` precedes it
#[must_use]
pub fn elapsed_hours(time: NaiveDateTime, admission: NaiveDateTime) -> f64 {
    (time - admission).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

/// Parses raw events and places them on an admission-relative time axis
#[derive(Debug, Clone, Default)]
pub struct TimeAligner {
    formats: TimestampFormatConfig,
}

impl TimeAligner {
    #[must_use]
    pub const fn new(formats: TimestampFormatConfig) -> Self {
        Self { formats }
    }

    /// Parse the timestamps of one raw event.
    ///
    /// `order` records the event's position in the subject's source order.
    pub fn parse_event(&self, raw: RawEvent, order: usize) -> Result<Event> {
        let time = parse_timestamp(raw.time.as_deref(), &self.formats)?;
        let end_time = parse_optional_timestamp(raw.end_time.as_deref(), &self.formats)?;
        Ok(Event {
            category: raw.category,
            subject_id: raw.subject_id,
            stay_id: raw.stay_id,
            time,
            end_time,
            code: raw.code,
            value: raw.value,
            unit: raw.unit,
            order,
        })
    }

    /// Parse a batch of raw events, dropping those with malformed timestamps.
    ///
    /// Returns the parsed events and the number dropped.
    pub fn parse_events(&self, raw: Vec<RawEvent>) -> (Vec<Event>, usize) {
        let mut malformed = 0;
        let mut events = Vec::with_capacity(raw.len());
        for (order, event) in raw.into_iter().enumerate() {
            match self.parse_event(event, order) {
                Ok(event) => events.push(event),
                Err(e) => {
                    log::trace!("Dropping event {order}: {e}");
                    malformed += 1;
                }
            }
        }
        (events, malformed)
    }

    /// Place an event on the time axis of an episode admitted at `admission`
    #[must_use]
    pub fn align(&self, event: Event, admission: NaiveDateTime) -> AlignedEvent {
        let hours = elapsed_hours(event.time, admission);
        let end_hours = event.end_time.map(|end| elapsed_hours(end, admission));
        AlignedEvent::new(event, hours, end_hours)
    }
}
