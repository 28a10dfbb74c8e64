//! Align hospital admission event tables into per-episode time series and
//! labeled prediction windows.
//!
//! The pipeline has two stages. Extraction reads subject directories, splits
//! each subject's events across ICU stays, and writes one pivoted series per
//! episode. Sampling reads those series back and emits labeled
//! `(series, time, label)` triples for the decompensation task.

pub mod algorithm;
pub mod common;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod reference;
pub mod utils;

// Re-export the most common types for easier use
pub use config::{ExtractionConfig, ReferencePaths, SamplingConfig, SeriesFormat};
pub use error::{PipelineError, Result};
pub use models::{EpisodeTimeSeries, Partition, SampleTriple, Stay, Subject};
pub use pipeline::{EpisodeExtractor, ExtractionSummary, PartitionSummary, create_decompensation};
pub use reference::ReferenceTables;
pub use utils::io::{CsvSubjectSource, DirectoryEpisodeSink};
