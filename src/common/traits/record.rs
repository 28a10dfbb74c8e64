//! Record source and sink traits
//!
//! The pipeline reads subjects through a [`RecordSource`] and persists
//! episodes through an [`EpisodeSink`]. Both are shared across worker
//! threads when subjects are processed in parallel.

use std::path::PathBuf;

use crate::algorithm::episodic::EpisodeSummary;
use crate::error::Result;
use crate::models::event::AlignedEvent;
use crate::models::series::EpisodeTimeSeries;
use crate::models::stay::Subject;

/// Produces the stays, diagnoses and raw events of each subject
pub trait RecordSource: Sync {
    /// Identifiers of every available subject, ascending
    fn subjects(&self) -> Result<Vec<u64>>;

    /// Load one subject.
    ///
    /// Fails with `SourceUnavailable` when the subject's data is missing or
    /// unreadable.
    fn load_subject(&self, subject_id: u64) -> Result<Subject>;
}

/// Persists the outputs of each episode
pub trait EpisodeSink: Sync {
    /// Prepare the output location of a subject and record its stays
    fn prepare_subject(&self, subject: &Subject) -> Result<()>;

    /// Write the pivoted series of an episode, returning where it went
    fn write_series(&self, subject_id: u64, episode: usize, series: &EpisodeTimeSeries) -> Result<PathBuf>;

    /// Write the summary row of an episode
    fn write_summary(&self, subject_id: u64, episode: usize, summary: &EpisodeSummary) -> Result<()>;

    /// Write the long-format event log of an episode
    fn write_event_log(&self, subject_id: u64, episode: usize, events: &[AlignedEvent]) -> Result<()>;
}
