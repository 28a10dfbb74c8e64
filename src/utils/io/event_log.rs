//! Long-format event log of an episode
//!
//! One row per surviving event, in series order, with the descriptive label
//! fields joined for its category.

use std::collections::BTreeSet;
use std::path::Path;

use crate::error::util::create_file;
use crate::error::{PipelineError, Result};
use crate::models::event::AlignedEvent;

/// Leading columns of an event log
pub const EVENT_LOG_COLUMNS: [&str; 7] = ["Hours", "EndHours", "table", "code", "value", "unit", "variable"];

/// Write the event log of an episode
pub fn write_event_log(path: &Path, events: &[AlignedEvent]) -> Result<()> {
    let label_columns: BTreeSet<&str> = events
        .iter()
        .flat_map(|e| e.labels.keys().map(String::as_str))
        .collect();

    let mut writer = csv::Writer::from_writer(create_file(path)?);
    writer.write_record(EVENT_LOG_COLUMNS.iter().copied().chain(label_columns.iter().copied()))?;

    for event in events {
        let mut record = vec![
            event.hours.to_string(),
            event.end_hours.map(|h| h.to_string()).unwrap_or_default(),
            event.category().to_string(),
            event.code().unwrap_or_default().to_string(),
            event.value().unwrap_or_default().to_string(),
            event.event.unit.clone().unwrap_or_default(),
            event.variable.clone().unwrap_or_default(),
        ];
        record.extend(
            label_columns
                .iter()
                .map(|c| event.labels.get(*c).cloned().unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }
    writer.flush().map_err(|e| PipelineError::io(path, e))
}
