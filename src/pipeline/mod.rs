//! Pipeline stages
//!
//! [`extract`] turns subject directories into per-episode series, summaries
//! and event logs. [`decompensation`] samples labeled prediction windows from
//! those outputs. Both visit subjects in ascending id order and, when asked,
//! spread them over the rayon thread pool without changing the result order.

pub mod decompensation;
pub mod extract;

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::utils::logging::{create_main_progress_bar, finish_progress_bar, log_progress};

pub use decompensation::{PartitionSummary, create_decompensation, process_partition};
pub use extract::{EpisodeExtractor, ExtractionSummary};

/// Apply `f` to every subject, returning results in input order
pub(crate) fn map_subjects<T, F>(label: &str, subjects: &[u64], parallel: bool, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(u64) -> T + Sync,
{
    let total = subjects.len();
    let pb = create_main_progress_bar(total as u64, Some(label));
    let done = AtomicUsize::new(0);

    let step = |id: u64| {
        let result = f(id);
        pb.inc(1);
        let count = done.fetch_add(1, Ordering::Relaxed) + 1;
        log_progress(label, count, total);
        result
    };

    let results = if parallel {
        log::info!(
            "{label}: {total} subjects on {} threads",
            rayon::current_num_threads()
        );
        subjects.par_iter().map(|&id| step(id)).collect()
    } else {
        subjects.iter().map(|&id| step(id)).collect()
    };

    finish_progress_bar(&pb, Some(&format!("{label} complete")));
    results
}
