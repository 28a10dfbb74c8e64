//! Per-subject output directories as an episode sink

use std::path::PathBuf;

use crate::algorithm::episodic::EpisodeSummary;
use crate::common::traits::EpisodeSink;
use crate::config::SeriesFormat;
use crate::error::Result;
use crate::error::util::ensure_directory;
use crate::models::event::AlignedEvent;
use crate::models::series::EpisodeTimeSeries;
use crate::models::stay::Subject;
use crate::utils::io::event_log::write_event_log;
use crate::utils::io::paths::{EpisodeFile, STAYS_FILE};
use crate::utils::io::series::write_series;
use crate::utils::io::stays::write_stays;
use crate::utils::io::summary::write_summary;

/// Writes each subject's episodes under `<root>/<subject_id>/`
#[derive(Debug, Clone)]
pub struct DirectoryEpisodeSink {
    root: PathBuf,
    format: SeriesFormat,
}

impl DirectoryEpisodeSink {
    /// Create the sink, creating `root` if needed
    pub fn new(root: impl Into<PathBuf>, format: SeriesFormat) -> Result<Self> {
        let root = root.into();
        ensure_directory(&root)?;
        Ok(Self { root, format })
    }

    /// Output directory of one subject
    #[must_use]
    pub fn subject_dir(&self, subject_id: u64) -> PathBuf {
        self.root.join(subject_id.to_string())
    }

    fn episode_path(&self, subject_id: u64, file: EpisodeFile) -> PathBuf {
        self.subject_dir(subject_id).join(file.to_string())
    }
}

impl EpisodeSink for DirectoryEpisodeSink {
    /// Creates the subject directory and writes `stays.csv` unless one is
    /// already there, so extracting in place keeps the source file.
    fn prepare_subject(&self, subject: &Subject) -> Result<()> {
        let dir = self.subject_dir(subject.id);
        ensure_directory(&dir)?;
        let stays = dir.join(STAYS_FILE);
        if !stays.exists() {
            write_stays(&stays, &subject.stays)?;
        }
        Ok(())
    }

    fn write_series(&self, subject_id: u64, episode: usize, series: &EpisodeTimeSeries) -> Result<PathBuf> {
        let path = self.episode_path(
            subject_id,
            EpisodeFile::Series {
                episode,
                format: self.format,
            },
        );
        write_series(&path, series, self.format)?;
        Ok(path)
    }

    fn write_summary(&self, subject_id: u64, episode: usize, summary: &EpisodeSummary) -> Result<()> {
        write_summary(&self.episode_path(subject_id, EpisodeFile::Summary { episode }), summary)
    }

    fn write_event_log(&self, subject_id: u64, episode: usize, events: &[AlignedEvent]) -> Result<()> {
        write_event_log(&self.episode_path(subject_id, EpisodeFile::EventLog { episode }), events)
    }
}
