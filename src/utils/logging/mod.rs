//! Logging utilities for output and progress tracking

pub mod log;
pub mod progress;

// Re-export commonly used functions for convenience
pub use self::log::{
    log_episode_drops, log_operation_complete, log_operation_start, log_run_drops, log_warning,
};
pub use self::progress::{create_main_progress_bar, finish_progress_bar, log_progress};
