//! Path utilities for subject directories and episode files

pub mod episode;
pub mod subject;

pub use episode::{EpisodeFile, find_series_files};
pub use subject::{
    DIAGNOSES_FILE, STAYS_FILE, event_table_category, find_event_tables, find_subject_dirs,
};
