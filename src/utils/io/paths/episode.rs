//! Episode file naming
//!
//! Every output of an episode carries its 1-based index in the file name:
//!
//! - `episode{N}_timeseries.csv` or `episode{N}_timeseries.parquet`
//! - `episode{N}.csv` (summary, read back as the label file)
//! - `episode{N}_timeseries_all.csv` (long-format event log)

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::SeriesFormat;
use crate::error::{PipelineError, Result};

const PREFIX: &str = "episode";
const SERIES_MARKER: &str = "_timeseries";
const EVENT_LOG_SUFFIX: &str = "_timeseries_all.csv";

/// A recognised per-episode file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeFile {
    Series { episode: usize, format: SeriesFormat },
    Summary { episode: usize },
    EventLog { episode: usize },
}

impl EpisodeFile {
    /// Episode index encoded in the name
    #[must_use]
    pub const fn episode(&self) -> usize {
        match self {
            Self::Series { episode, .. } | Self::Summary { episode } | Self::EventLog { episode } => {
                *episode
            }
        }
    }

    /// Summary file belonging to the same episode
    #[must_use]
    pub const fn summary(&self) -> Self {
        Self::Summary {
            episode: self.episode(),
        }
    }
}

fn parse_index(digits: &str) -> Option<usize> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|n| *n > 0)
}

impl FromStr for EpisodeFile {
    type Err = String;

    /// Parse a bare file name such as `episode3_timeseries.csv`
    fn from_str(name: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || format!("Not an episode file: {name}");
        let rest = name.strip_prefix(PREFIX).ok_or_else(invalid)?;

        if let Some(digits) = rest.strip_suffix(EVENT_LOG_SUFFIX) {
            return parse_index(digits)
                .map(|episode| Self::EventLog { episode })
                .ok_or_else(invalid);
        }
        if let Some((digits, tail)) = rest.split_once(SERIES_MARKER) {
            let format = match tail {
                ".csv" => SeriesFormat::Csv,
                ".parquet" => SeriesFormat::Parquet,
                _ => return Err(invalid()),
            };
            return parse_index(digits)
                .map(|episode| Self::Series { episode, format })
                .ok_or_else(invalid);
        }
        rest.strip_suffix(".csv")
            .and_then(parse_index)
            .map(|episode| Self::Summary { episode })
            .ok_or_else(invalid)
    }
}

impl fmt::Display for EpisodeFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Series { episode, format } => {
                write!(f, "{PREFIX}{episode}{SERIES_MARKER}.{}", format.extension())
            }
            Self::Summary { episode } => write!(f, "{PREFIX}{episode}.csv"),
            Self::EventLog { episode } => write!(f, "{PREFIX}{episode}{EVENT_LOG_SUFFIX}"),
        }
    }
}

/// Find the series files of a subject directory, ordered by episode index
pub fn find_series_files(dir: &Path) -> Result<Vec<(PathBuf, EpisodeFile)>> {
    let entries = std::fs::read_dir(dir).map_err(|e| PipelineError::io(dir, e))?;

    let mut files: Vec<(PathBuf, EpisodeFile)> = entries
        .filter_map(std::result::Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name();
            let file = name.to_str()?.parse::<EpisodeFile>().ok()?;
            matches!(file, EpisodeFile::Series { .. }).then(|| (entry.path(), file))
        })
        .filter(|(path, _)| path.is_file())
        .collect();

    files.sort_by(|a, b| a.1.episode().cmp(&b.1.episode()).then_with(|| a.0.cmp(&b.0)));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_episode_files() {
        assert_eq!(
            "episode1_timeseries.csv".parse::<EpisodeFile>(),
            Ok(EpisodeFile::Series {
                episode: 1,
                format: SeriesFormat::Csv
            })
        );
        assert_eq!(
            "episode12_timeseries.parquet".parse::<EpisodeFile>(),
            Ok(EpisodeFile::Series {
                episode: 12,
                format: SeriesFormat::Parquet
            })
        );
        assert_eq!(
            "episode2.csv".parse::<EpisodeFile>(),
            Ok(EpisodeFile::Summary { episode: 2 })
        );
        assert_eq!(
            "episode3_timeseries_all.csv".parse::<EpisodeFile>(),
            Ok(EpisodeFile::EventLog { episode: 3 })
        );

        assert!("episode1_timeseries_chartevents.csv".parse::<EpisodeFile>().is_err());
        assert!("episode0.csv".parse::<EpisodeFile>().is_err());
        assert!("episodeX.csv".parse::<EpisodeFile>().is_err());
        assert!("stays.csv".parse::<EpisodeFile>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for file in [
            EpisodeFile::Series {
                episode: 4,
                format: SeriesFormat::Parquet,
            },
            EpisodeFile::Summary { episode: 4 },
            EpisodeFile::EventLog { episode: 4 },
        ] {
            assert_eq!(file.to_string().parse::<EpisodeFile>(), Ok(file));
        }
        let series = EpisodeFile::Series {
            episode: 7,
            format: SeriesFormat::Csv,
        };
        assert_eq!(series.summary().to_string(), "episode7.csv");
    }

    #[test]
    fn test_find_series_files_orders_by_index() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "episode10_timeseries.csv",
            "episode2_timeseries.csv",
            "episode2.csv",
            "episode2_timeseries_all.csv",
            "stays.csv",
        ] {
            std::fs::write(dir.path().join(name), "Hours\n").unwrap();
        }

        let files = find_series_files(dir.path()).unwrap();
        let names: Vec<String> = files.iter().map(|(_, f)| f.to_string()).collect();
        assert_eq!(names, vec!["episode2_timeseries.csv", "episode10_timeseries.csv"]);
    }
}
