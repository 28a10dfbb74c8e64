//! Labeled sample triples and data partitions

use std::fmt;

/// A labeled prediction point: which series, at what time, with what label
#[derive(Debug, Clone, PartialEq)]
pub struct SampleTriple {
    /// Output file name of the series the sample refers to
    pub stay: String,
    /// Sampled elapsed time in hours
    pub period_length: f64,
    /// 1 if the outcome occurs within the horizon after `period_length`
    pub y_true: u8,
}

impl SampleTriple {
    #[must_use]
    pub fn new(stay: impl Into<String>, period_length: f64, y_true: u8) -> Self {
        Self {
            stay: stay.into(),
            period_length,
            y_true,
        }
    }
}

/// A named data split governing output ordering
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Partition {
    /// Shuffled with a fixed seed
    Train,
    /// Sorted by (series, time)
    Test,
    /// Left in discovery order
    Other(String),
}

impl Partition {
    /// Directory name of the partition
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Train => "train",
            Self::Test => "test",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for Partition {
    fn from(name: &str) -> Self {
        match name {
            "train" => Self::Train,
            "test" => Self::Test,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
