//! Configuration for episode extraction and sample generation.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};

/// Output format of per-episode time series files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeriesFormat {
    /// Comma separated text with a `Hours` column first
    #[default]
    Csv,
    /// Parquet file with the same columns
    Parquet,
}

impl SeriesFormat {
    /// File extension used for this format
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
        }
    }

    /// Detect the format from a file path
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "csv" => Some(Self::Csv),
            "parquet" => Some(Self::Parquet),
            _ => None,
        }
    }
}

/// Configuration for timestamp parsing
#[derive(Debug, Clone)]
pub struct TimestampFormatConfig {
    /// Datetime formats tried in order
    pub datetime_formats: Vec<String>,
    /// Date-only formats tried after the datetime formats; parsed as midnight
    pub date_formats: Vec<String>,
}

impl Default for TimestampFormatConfig {
    fn default() -> Self {
        Self {
            datetime_formats: vec![
                "%Y-%m-%d %H:%M:%S".to_string(),    // 2100-01-01 12:00:00
                "%Y-%m-%dT%H:%M:%S".to_string(),    // 2100-01-01T12:00:00
                "%Y-%m-%d %H:%M:%S%.f".to_string(), // 2100-01-01 12:00:00.000
                "%Y-%m-%d %H:%M".to_string(),       // 2100-01-01 12:00
            ],
            date_formats: vec!["%Y-%m-%d".to_string()],
        }
    }
}

/// Largest accepted boundary tolerance, one week
pub const MAX_BOUNDARY_TOLERANCE_HOURS: f64 = 168.0;

/// Configuration for the episode extraction stage
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Tolerance in hours applied to both stay boundaries
    pub boundary_tolerance_hours: f64,
    /// Write the long-format event log next to each series
    pub write_event_log: bool,
    /// Format of the pivoted series files
    pub series_format: SeriesFormat,
    /// Process subjects on the rayon thread pool
    pub parallel: bool,
    /// Accepted timestamp formats
    pub timestamps: TimestampFormatConfig,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            boundary_tolerance_hours: 1.0,
            write_event_log: false,
            series_format: SeriesFormat::Csv,
            parallel: false,
            timestamps: TimestampFormatConfig::default(),
        }
    }
}

impl ExtractionConfig {
    /// Create a new extraction configuration with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the boundary tolerance in hours
    #[must_use]
    pub const fn with_boundary_tolerance(mut self, hours: f64) -> Self {
        self.boundary_tolerance_hours = hours;
        self
    }

    /// Enable or disable the long-format event log
    #[must_use]
    pub const fn with_event_log(mut self, enabled: bool) -> Self {
        self.write_event_log = enabled;
        self
    }

    /// Set the series output format
    #[must_use]
    pub const fn with_series_format(mut self, format: SeriesFormat) -> Self {
        self.series_format = format;
        self
    }

    /// Enable or disable parallel subject processing
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the accepted timestamp formats
    #[must_use]
    pub fn with_timestamps(mut self, timestamps: TimestampFormatConfig) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Reject a tolerance that is negative, non-finite or beyond one week
    pub fn validate(&self) -> Result<()> {
        let hours = self.boundary_tolerance_hours;
        if !(hours.is_finite() && (0.0..=MAX_BOUNDARY_TOLERANCE_HOURS).contains(&hours)) {
            return Err(PipelineError::InvalidConfig(format!(
                "boundary tolerance must be between 0 and {MAX_BOUNDARY_TOLERANCE_HOURS} hours, got {hours}"
            )));
        }
        Ok(())
    }
}

/// Configuration for the sample window generator
#[derive(Debug, Clone)]
pub struct SamplingConfig {
    /// Hours between candidate sample times
    pub sample_rate: f64,
    /// Samples at or before this many hours are discarded
    pub shortest_length: f64,
    /// Look-ahead horizon in hours for a positive label
    pub future_time_interval: f64,
    /// Floating point tolerance on boundaries
    pub eps: f64,
    /// Seed for the train partition shuffle
    pub seed: u64,
    /// Process subjects on the rayon thread pool
    pub parallel: bool,
    /// Accepted timestamp formats of `stays.csv`
    pub timestamps: TimestampFormatConfig,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_rate: 1.0,
            shortest_length: 4.0,
            future_time_interval: 24.0,
            eps: 1e-6,
            seed: 49297,
            parallel: false,
            timestamps: TimestampFormatConfig::default(),
        }
    }
}

impl SamplingConfig {
    /// Create a new sampling configuration with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sample rate in hours
    #[must_use]
    pub const fn with_sample_rate(mut self, hours: f64) -> Self {
        self.sample_rate = hours;
        self
    }

    /// Set the minimum episode length before the first sample
    #[must_use]
    pub const fn with_shortest_length(mut self, hours: f64) -> Self {
        self.shortest_length = hours;
        self
    }

    /// Set the future horizon
    #[must_use]
    pub const fn with_future_time_interval(mut self, hours: f64) -> Self {
        self.future_time_interval = hours;
        self
    }

    /// Set the shuffle seed
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable parallel subject processing
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the accepted timestamp formats
    #[must_use]
    pub fn with_timestamps(mut self, timestamps: TimestampFormatConfig) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Reject settings that cannot produce a finite sample grid
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "sample rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if !self.shortest_length.is_finite() || !self.future_time_interval.is_finite() {
            return Err(PipelineError::InvalidConfig(
                "shortest length and future horizon must be finite".to_string(),
            ));
        }
        if !(self.eps.is_finite() && self.eps >= 0.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "epsilon must be non-negative, got {}",
                self.eps
            )));
        }
        Ok(())
    }
}

impl fmt::Display for SamplingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sampling Configuration:")?;
        writeln!(f, "  Sample Rate: {}h", self.sample_rate)?;
        writeln!(f, "  Shortest Length: {}h", self.shortest_length)?;
        writeln!(f, "  Future Horizon: {}h", self.future_time_interval)?;
        writeln!(f, "  Seed: {}", self.seed)
    }
}

/// Locations of the reference tables loaded before any subject is processed
#[derive(Debug, Clone)]
pub struct ReferencePaths {
    /// CSV mapping reference codes to canonical variable names
    pub variable_map: PathBuf,
    /// CSV of per-variable plausible ranges
    pub variable_ranges: Option<PathBuf>,
    /// Directory containing the descriptive tables
    pub descriptive_dir: Option<PathBuf>,
    /// Event category -> descriptive table file name
    pub descriptive_tables: BTreeMap<String, String>,
}

impl ReferencePaths {
    /// Create reference paths with the default category table layout
    #[must_use]
    pub fn new(variable_map: impl Into<PathBuf>) -> Self {
        let mut descriptive_tables = BTreeMap::new();
        for category in [
            "chartevents",
            "datetimeevents",
            "inputevents_cv",
            "inputevents_mv",
            "outputevents",
            "procedureevents_mv",
        ] {
            descriptive_tables.insert(category.to_string(), "D_ITEMS.csv".to_string());
        }
        descriptive_tables.insert("labevents".to_string(), "D_LABITEMS.csv".to_string());
        descriptive_tables.insert("diagnoses_icd".to_string(), "D_ICD_DIAGNOSES.csv".to_string());
        descriptive_tables.insert("procedures_icd".to_string(), "D_ICD_PROCEDURES.csv".to_string());

        Self {
            variable_map: variable_map.into(),
            variable_ranges: None,
            descriptive_dir: None,
            descriptive_tables,
        }
    }

    /// Set the variable range file
    #[must_use]
    pub fn with_variable_ranges(mut self, path: impl Into<PathBuf>) -> Self {
        self.variable_ranges = Some(path.into());
        self
    }

    /// Set the descriptive table directory
    #[must_use]
    pub fn with_descriptive_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.descriptive_dir = Some(path.into());
        self
    }

    /// Add or override the descriptive table used for a category
    pub fn add_descriptive_table(&mut self, category: &str, file_name: &str) {
        self.descriptive_tables
            .insert(category.to_string(), file_name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampling_defaults() {
        let config = SamplingConfig::default();
        assert_eq!(config.sample_rate, 1.0);
        assert_eq!(config.shortest_length, 4.0);
        assert_eq!(config.future_time_interval, 24.0);
        assert_eq!(config.seed, 49297);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sampling_validate_rejects_bad_rate() {
        assert!(SamplingConfig::new().with_sample_rate(0.0).validate().is_err());
        assert!(SamplingConfig::new().with_sample_rate(-1.0).validate().is_err());
        assert!(SamplingConfig::new().with_sample_rate(f64::NAN).validate().is_err());
        assert!(SamplingConfig::new().with_sample_rate(0.5).validate().is_ok());
    }

    #[test]
    fn test_extraction_validate_rejects_bad_tolerance() {
        assert!(ExtractionConfig::new().validate().is_ok());
        assert!(ExtractionConfig::new().with_boundary_tolerance(0.0).validate().is_ok());
        assert!(ExtractionConfig::new().with_boundary_tolerance(168.0).validate().is_ok());
        for hours in [-1.0, 1e12, f64::INFINITY, f64::NAN] {
            let err = ExtractionConfig::new()
                .with_boundary_tolerance(hours)
                .validate()
                .unwrap_err();
            assert!(matches!(err, PipelineError::InvalidConfig(_)));
        }
    }

    #[test]
    fn test_series_format_from_path() {
        assert_eq!(
            SeriesFormat::from_path(Path::new("episode1_timeseries.csv")),
            Some(SeriesFormat::Csv)
        );
        assert_eq!(
            SeriesFormat::from_path(Path::new("episode1_timeseries.parquet")),
            Some(SeriesFormat::Parquet)
        );
        assert_eq!(SeriesFormat::from_path(Path::new("stays.txt")), None);
    }

    #[test]
    fn test_default_descriptive_tables() {
        let paths = ReferencePaths::new("map.csv");
        assert_eq!(paths.descriptive_tables["labevents"], "D_LABITEMS.csv");
        assert_eq!(paths.descriptive_tables["chartevents"], "D_ITEMS.csv");
        assert_eq!(paths.descriptive_tables["diagnoses_icd"], "D_ICD_DIAGNOSES.csv");
        assert_eq!(paths.descriptive_tables["procedures_icd"], "D_ICD_PROCEDURES.csv");
        assert!(!paths.descriptive_tables.contains_key("events"));
    }
}
