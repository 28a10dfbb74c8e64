//! Data models for events, stays, series and samples

pub mod event;
pub mod health;
pub mod sample;
pub mod series;
pub mod stay;

pub use event::{AlignedEvent, Event, RawEvent};
pub use health::Diagnosis;
pub use sample::{Partition, SampleTriple};
pub use series::{EpisodeTimeSeries, HOURS_COLUMN, SeriesRow};
pub use stay::{Stay, Subject};
