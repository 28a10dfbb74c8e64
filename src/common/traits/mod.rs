//! Common traits used across the codebase
//!
//! The pipeline stages depend on these interfaces rather than on the CSV
//! directory layout directly.

pub mod record;

pub use record::{EpisodeSink, RecordSource};
