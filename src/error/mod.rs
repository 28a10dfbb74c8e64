//! Error handling for the episode pipeline.

pub mod util;

use std::io;
use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Specialized error type for the episode pipeline
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Error opening, reading or writing a file
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Error reading or writing delimited text
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error building columnar data
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error reading or writing Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// A timestamp was missing or matched none of the accepted formats
    #[error("Malformed timestamp: {value:?}")]
    MalformedTimestamp { value: String },

    /// The label file for an episode is absent or has no rows
    #[error("Missing label file: {}", path.display())]
    MissingLabel { path: PathBuf },

    /// The label file carries no length of stay
    #[error("Missing length of stay for {episode}")]
    MissingLengthOfStay { episode: String },

    /// No events survived for an episode
    #[error("No qualifying events in {episode}")]
    EmptyEpisode { episode: String },

    /// Subject data could not be read
    #[error("Subject {subject} unavailable: {reason}")]
    SourceUnavailable { subject: String, reason: String },

    /// A reference table is missing or invalid
    #[error("Reference table error: {0}")]
    Reference(String),

    /// A required column is absent from a table
    #[error("Schema error: {0}")]
    Schema(String),

    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PipelineError {
    /// Attach a path to an IO error
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a malformed timestamp error
    pub fn malformed_timestamp(value: impl Into<String>) -> Self {
        Self::MalformedTimestamp {
            value: value.into(),
        }
    }

    /// Create a source unavailable error for a subject
    pub fn source_unavailable(subject: impl ToString, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            subject: subject.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error only affects a single subject or episode.
    ///
    /// Recoverable errors are logged and the unit is skipped; everything else
    /// aborts the run.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MalformedTimestamp { .. }
                | Self::MissingLabel { .. }
                | Self::MissingLengthOfStay { .. }
                | Self::EmptyEpisode { .. }
                | Self::SourceUnavailable { .. }
                | Self::Csv(_)
                | Self::Schema(_)
        )
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
