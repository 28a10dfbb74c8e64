//! Episode extraction
//!
//! For every subject: read stays and events, partition the events across
//! stays, consolidate each episode into a pivoted series, and write the
//! series, its summary and (optionally) its event log.

use std::time::Instant;

use crate::algorithm::alignment::TimeAligner;
use crate::algorithm::consolidate::{ConsolidationReport, EventConsolidator};
use crate::algorithm::episodic::assemble_summary;
use crate::algorithm::partition::{EpisodeEvents, EpisodePartitioner, PartitionReport};
use crate::common::traits::{EpisodeSink, RecordSource};
use crate::config::ExtractionConfig;
use crate::error::{PipelineError, Result};
use crate::models::health::Diagnosis;
use crate::pipeline::map_subjects;
use crate::reference::ReferenceTables;
use crate::utils::logging::{log_episode_drops, log_run_drops};

/// Totals of an extraction run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub subjects_seen: usize,
    pub subjects_processed: usize,
    pub subjects_skipped: usize,
    pub episodes_written: usize,
    pub episodes_skipped: usize,
    pub partition: PartitionReport,
    pub consolidation: ConsolidationReport,
}

/// What came out of one subject
#[derive(Debug, Clone, Default)]
struct SubjectExtraction {
    episodes_written: usize,
    episodes_skipped: usize,
    partition: PartitionReport,
    consolidation: ConsolidationReport,
}

/// Drives extraction from a record source into an episode sink
pub struct EpisodeExtractor<'a, S, K> {
    source: &'a S,
    sink: &'a K,
    reference: &'a ReferenceTables,
    config: ExtractionConfig,
    partitioner: EpisodePartitioner,
}

impl<'a, S: RecordSource, K: EpisodeSink> EpisodeExtractor<'a, S, K> {
    #[must_use]
    pub fn new(source: &'a S, sink: &'a K, reference: &'a ReferenceTables, config: ExtractionConfig) -> Self {
        let aligner = TimeAligner::new(config.timestamps.clone());
        let partitioner = EpisodePartitioner::new(aligner, config.boundary_tolerance_hours);
        Self {
            source,
            sink,
            reference,
            config,
            partitioner,
        }
    }

    /// Extract every subject of the source.
    ///
    /// Fails with `InvalidConfig` before touching any subject when the
    /// configuration is out of range. Subjects failing with a recoverable error are logged and skipped;
    /// any other error aborts the run.
    pub fn run(&self) -> Result<ExtractionSummary> {
        self.config.validate()?;
        let start = Instant::now();
        let subjects = self.source.subjects()?;
        log::info!("Extracting episodes for {} subjects", subjects.len());

        let results = map_subjects("Extracting", &subjects, self.config.parallel, |id| {
            (id, self.extract_subject(id))
        });

        let mut summary = ExtractionSummary {
            subjects_seen: subjects.len(),
            ..ExtractionSummary::default()
        };
        for (id, result) in results {
            match result {
                Ok(subject) => {
                    summary.subjects_processed += 1;
                    summary.episodes_written += subject.episodes_written;
                    summary.episodes_skipped += subject.episodes_skipped;
                    summary.partition.merge(&subject.partition);
                    summary.consolidation.merge(&subject.consolidation);
                }
                Err(e) if e.is_recoverable() => {
                    log::warn!("Skipping subject {id}: {e}");
                    summary.subjects_skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        log_run_drops(&summary.partition, &summary.consolidation);
        log::info!(
            "Extracted {} episodes from {} subjects ({} subjects skipped) in {:?}",
            summary.episodes_written,
            summary.subjects_processed,
            summary.subjects_skipped,
            start.elapsed()
        );
        Ok(summary)
    }

    fn extract_subject(&self, subject_id: u64) -> Result<SubjectExtraction> {
        let subject = self.source.load_subject(subject_id)?;
        log::debug!(
            "Subject {subject_id}: {} stays, {} diagnoses, {} events",
            subject.stays.len(),
            subject.diagnoses.len(),
            subject.events.len()
        );
        self.sink.prepare_subject(&subject)?;

        let (episodes, partition) = self.partitioner.partition(&subject.stays, subject.events);
        let mut outcome = SubjectExtraction {
            partition,
            ..SubjectExtraction::default()
        };
        if partition.malformed_timestamps > 0 {
            log::warn!(
                "Subject {subject_id}: dropped {} events with malformed timestamps",
                partition.malformed_timestamps
            );
        }

        for episode in episodes {
            let index = episode.index;
            match self.write_episode(subject_id, episode, &subject.diagnoses, &mut outcome.consolidation) {
                Ok(()) => outcome.episodes_written += 1,
                Err(e) if e.is_recoverable() => {
                    log::warn!("Subject {subject_id} episode {index}: {e}");
                    outcome.episodes_skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(outcome)
    }

    fn write_episode(
        &self,
        subject_id: u64,
        episode: EpisodeEvents<'_>,
        diagnoses: &[Diagnosis],
        report: &mut ConsolidationReport,
    ) -> Result<()> {
        let EpisodeEvents { index, stay, events } = episode;
        let consolidated = EventConsolidator::new(self.reference).consolidate(events)?;
        log_episode_drops(subject_id, index, &consolidated.report);
        report.merge(&consolidated.report);

        if consolidated.series.is_empty() {
            return Err(PipelineError::EmptyEpisode {
                episode: format!("{subject_id}/episode{index}"),
            });
        }

        self.sink.write_series(subject_id, index, &consolidated.series)?;
        let summary = assemble_summary(stay, diagnoses, &consolidated.series);
        self.sink.write_summary(subject_id, index, &summary)?;
        if self.config.write_event_log {
            self.sink.write_event_log(subject_id, index, &consolidated.events)?;
        }
        Ok(())
    }
}
