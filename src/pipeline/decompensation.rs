//! Decompensation task generation
//!
//! Reads the extracted episodes of each data partition, restricts every
//! series to its stay, and writes the restricted series plus a `listfile.csv`
//! of labeled sample triples per partition.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::algorithm::sampling::{EpisodeOutcome, SampleWindowGenerator, order_triples};
use crate::config::{SamplingConfig, SeriesFormat};
use crate::error::util::{create_file, ensure_directory};
use crate::error::{PipelineError, Result};
use crate::models::sample::{Partition, SampleTriple};
use crate::models::stay::Stay;
use crate::pipeline::map_subjects;
use crate::utils::io::paths::{EpisodeFile, STAYS_FILE, find_series_files, find_subject_dirs};
use crate::utils::io::series::{read_series, write_series};
use crate::utils::io::stays::read_stays;
use crate::utils::io::summary::read_episode_label;
use crate::utils::logging::{log_operation_complete, log_operation_start, log_warning};

/// Name of the per-partition sample listing
pub const LISTFILE_NAME: &str = "listfile.csv";

/// Partitions processed by [`create_decompensation`], in order
pub const PARTITIONS: [Partition; 2] = [Partition::Test, Partition::Train];

/// Totals of one processed partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSummary {
    pub partition: Partition,
    pub subjects: usize,
    pub subjects_skipped: usize,
    pub episodes_sampled: usize,
    pub episodes_skipped: usize,
    pub triples: usize,
    pub positive: usize,
}

impl PartitionSummary {
    fn new(partition: Partition) -> Self {
        Self {
            partition,
            subjects: 0,
            subjects_skipped: 0,
            episodes_sampled: 0,
            episodes_skipped: 0,
            triples: 0,
            positive: 0,
        }
    }
}

#[derive(Debug, Default)]
struct SubjectSamples {
    triples: Vec<SampleTriple>,
    sampled: usize,
    skipped: usize,
}

/// Write a sample listing: header `stay,period_length,y_true`, times with
/// six decimals
pub fn write_listfile(path: &Path, triples: &[SampleTriple]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(create_file(path)?);
    writer.write_record(["stay", "period_length", "y_true"])?;
    for triple in triples {
        writer.write_record([
            triple.stay.as_str(),
            format!("{:.6}", triple.period_length).as_str(),
            triple.y_true.to_string().as_str(),
        ])?;
    }
    writer.flush().map_err(|e| PipelineError::io(path, e))
}

fn episode_name(subject_id: u64, file: &EpisodeFile) -> String {
    format!("{subject_id}/{file}")
}

/// Sample one episode and write its restricted series to `output_dir`
fn sample_episode(
    generator: &SampleWindowGenerator,
    subject_id: u64,
    subject_dir: &Path,
    stays: &[Stay],
    series_path: &Path,
    file: &EpisodeFile,
    output_dir: &Path,
) -> Result<Vec<SampleTriple>> {
    let label = read_episode_label(&subject_dir.join(file.summary().to_string()))?;
    let length_of_stay = label
        .length_of_stay
        .map(|days| 24.0 * days)
        .ok_or_else(|| PipelineError::MissingLengthOfStay {
            episode: episode_name(subject_id, file),
        })?;

    let stay = stays
        .iter()
        .find(|s| s.stay_id == label.icustay)
        .ok_or_else(|| {
            PipelineError::source_unavailable(
                subject_id,
                format!("stay {} of {file} is not in {STAYS_FILE}", label.icustay),
            )
        })?;
    let outcome = EpisodeOutcome::new(length_of_stay, label.mortality, stay.lived_hours());

    let series = read_series(series_path)?;
    let output_name = format!("{subject_id}_{file}");
    let sampled = generator.sample_episode(&output_name, &series, &outcome)?;

    let format = SeriesFormat::from_path(series_path).unwrap_or_default();
    write_series(&output_dir.join(&output_name), &sampled.series, format)?;
    Ok(sampled.triples)
}

fn sample_subject(
    generator: &SampleWindowGenerator,
    subject_id: u64,
    subject_dir: &Path,
    output_dir: &Path,
) -> Result<SubjectSamples> {
    let stays_path = subject_dir.join(STAYS_FILE);
    if !stays_path.is_file() {
        return Err(PipelineError::source_unavailable(subject_id, "no stays.csv"));
    }
    let stays = read_stays(&stays_path, subject_id, &generator.config().timestamps)?;

    let mut samples = SubjectSamples::default();
    for (path, file) in find_series_files(subject_dir)? {
        match sample_episode(generator, subject_id, subject_dir, &stays, &path, &file, output_dir) {
            Ok(triples) => {
                samples.sampled += 1;
                samples.triples.extend(triples);
            }
            Err(e) if e.is_recoverable() => {
                log::warn!("Skipping {}: {e}", episode_name(subject_id, &file));
                samples.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(samples)
}

/// Process one partition directory under `root_path`.
///
/// A missing partition directory is skipped with a warning and produces no
/// listing.
pub fn process_partition(
    root_path: &Path,
    output_path: &Path,
    partition: &Partition,
    generator: &SampleWindowGenerator,
) -> Result<PartitionSummary> {
    let start = Instant::now();
    let mut summary = PartitionSummary::new(partition.clone());

    let input_dir = root_path.join(partition.name());
    if !input_dir.is_dir() {
        log_warning(&format!("Partition {partition} not found"), Some(&input_dir));
        return Ok(summary);
    }
    log_operation_start(&format!("Sampling {partition} partition"), &input_dir);
    let output_dir: PathBuf = output_path.join(partition.name());
    ensure_directory(&output_dir)?;

    let subject_dirs = find_subject_dirs(&input_dir)?;
    let ids: Vec<u64> = subject_dirs.iter().map(|(id, _)| *id).collect();
    summary.subjects = ids.len();

    let label = format!("Sampling {partition}");
    let results = map_subjects(&label, &ids, generator.config().parallel, |id| {
        sample_subject(generator, id, &input_dir.join(id.to_string()), &output_dir)
    });

    let mut triples = Vec::new();
    for (id, result) in ids.iter().zip(results) {
        match result {
            Ok(samples) => {
                summary.episodes_sampled += samples.sampled;
                summary.episodes_skipped += samples.skipped;
                triples.extend(samples.triples);
            }
            Err(e) if e.is_recoverable() => {
                log::warn!("Skipping subject {id} in {partition}: {e}");
                summary.subjects_skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    let triples = order_triples(triples, partition, generator.config().seed);
    summary.triples = triples.len();
    summary.positive = triples.iter().filter(|t| t.y_true == 1).count();
    write_listfile(&output_dir.join(LISTFILE_NAME), &triples)?;

    log::info!(
        "{partition}: {} samples ({} positive) from {} episodes",
        summary.triples,
        summary.positive,
        summary.episodes_sampled
    );
    log_operation_complete("sampled", &input_dir, summary.triples, Some(start.elapsed()));
    Ok(summary)
}

/// Build the decompensation task: the test partition, then train
pub fn create_decompensation(
    root_path: &Path,
    output_path: &Path,
    config: SamplingConfig,
) -> Result<Vec<PartitionSummary>> {
    let generator = SampleWindowGenerator::new(config)?;
    ensure_directory(output_path)?;
    log::info!("{}", generator.config());

    PARTITIONS
        .iter()
        .map(|partition| process_partition(root_path, output_path, partition, &generator))
        .collect()
}
