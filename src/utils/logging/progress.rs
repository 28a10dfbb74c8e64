//! Progress reporting for subject loops
//!
//! Uses indicatif bars; when stderr is not a terminal indicatif hides them,
//! and the periodic `info` lines carry the progress instead.

use indicatif::{ProgressBar, ProgressStyle};

/// Default style for a main progress bar
pub const DEFAULT_MAIN_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({per_sec}) {msg}";

/// Subjects between two progress log lines
pub const PROGRESS_LOG_INTERVAL: usize = 100;

/// Create a main progress bar with a standardized style
///
/// # Arguments
/// * `length` - Total length for the progress bar
/// * `description` - Optional description to display as the initial message
#[must_use]
pub fn create_main_progress_bar(length: u64, description: Option<&str>) -> ProgressBar {
    let pb = ProgressBar::new(length);
    let style = ProgressStyle::default_bar()
        .template(DEFAULT_MAIN_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);

    if let Some(desc) = description {
        pb.set_message(desc.to_string());
    }

    pb
}

/// Finish a progress bar with a completion message
pub fn finish_progress_bar(pb: &ProgressBar, message: Option<&str>) {
    if let Some(msg) = message {
        pb.finish_with_message(msg.to_string());
    } else {
        pb.finish();
    }
}

/// Log a running count every [`PROGRESS_LOG_INTERVAL`] units
pub fn log_progress(label: &str, done: usize, total: usize) {
    if done % PROGRESS_LOG_INTERVAL == 0 || done == total {
        log::info!("{label}: processed {done} / {total} subjects");
    }
}
