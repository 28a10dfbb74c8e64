//! Logging utilities
//!
//! Standardized messages for long-running operations and drop accounting.

use std::path::Path;
use std::time::Duration;

use crate::algorithm::consolidate::ConsolidationReport;
use crate::algorithm::partition::PartitionReport;

/// Log an operation start with consistent format
pub fn log_operation_start(operation: &str, path: &Path) {
    log::info!("{} {}", operation, path.display());
}

/// Log an operation completion with consistent format
///
/// # Arguments
/// * `operation` - Past-tense description, e.g. "extracted"
/// * `path` - Path the operation worked on
/// * `items` - Number of items processed
/// * `elapsed` - Optional elapsed time
pub fn log_operation_complete(operation: &str, path: &Path, items: usize, elapsed: Option<Duration>) {
    if let Some(duration) = elapsed {
        log::info!(
            "Successfully {} {} items from {} in {:?}",
            operation,
            items,
            path.display(),
            duration
        );
    } else {
        log::info!("Successfully {} {} items from {}", operation, items, path.display());
    }
}

/// Log an operation warning with consistent format
pub fn log_warning(message: &str, path: Option<&Path>) {
    if let Some(path) = path {
        log::warn!("{}: {}", message, path.display());
    } else {
        log::warn!("{message}");
    }
}

/// Log event drops of one episode at debug level
pub fn log_episode_drops(subject_id: u64, episode: usize, report: &ConsolidationReport) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    for (category, counts) in &report.categories {
        if counts.dropped() > 0 || counts.clipped > 0 {
            log::debug!(
                "Subject {subject_id} episode {episode} {category}: kept {}/{} \
                 (descriptive {}, unmapped {}, missing value {}, outliers {}, clipped {})",
                counts.kept,
                counts.seen,
                counts.unmatched_descriptive,
                counts.unmapped,
                counts.missing_value,
                counts.outliers,
                counts.clipped
            );
        }
    }
}

/// Log run-level totals of event assignment and consolidation
pub fn log_run_drops(partition: &PartitionReport, consolidation: &ConsolidationReport) {
    log::info!(
        "Event assignment: {} by stay id, {} in overlapping stays, {} unassigned, {} malformed timestamps",
        partition.direct,
        partition.overlapping,
        partition.unassigned,
        partition.malformed_timestamps
    );
    for (category, counts) in &consolidation.categories {
        log::info!(
            "{category}: kept {} of {} events, dropped {} (descriptive {}, unmapped {}, \
             missing value {}, outliers {}), clipped {}",
            counts.kept,
            counts.seen,
            counts.dropped(),
            counts.unmatched_descriptive,
            counts.unmapped,
            counts.missing_value,
            counts.outliers,
            counts.clipped
        );
    }
}
