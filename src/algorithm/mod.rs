//! Algorithms of the episode pipeline
//!
//! Leaf first: time alignment, episode partitioning, event consolidation,
//! episodic summaries and sample window generation.

pub mod alignment;
pub mod consolidate;
pub mod episodic;
pub mod partition;
pub mod sampling;

pub use alignment::{TimeAligner, elapsed_hours, parse_timestamp};
pub use consolidate::{CategoryCounts, ConsolidatedEpisode, ConsolidationReport, EventConsolidator};
pub use episodic::{EpisodeSummary, assemble_summary};
pub use partition::{EpisodeEvents, EpisodePartitioner, PartitionReport};
pub use sampling::{EpisodeOutcome, SampleWindowGenerator, SampledEpisode, order_triples};
