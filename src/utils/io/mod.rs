//! IO utilities for subject directories and episode files
//!
//! CSV goes through the `csv` crate; series may also be stored as Parquet.

pub mod event_log;
pub mod parquet;
pub mod paths;
pub mod series;
pub mod sink;
pub mod source;
pub mod stays;
pub mod summary;
pub mod table;

pub use paths::{EpisodeFile, find_series_files, find_subject_dirs};
pub use series::{read_series, write_series};
pub use sink::DirectoryEpisodeSink;
pub use source::CsvSubjectSource;
pub use stays::{read_stays, write_stays};
pub use summary::{EpisodeLabel, read_episode_label};
