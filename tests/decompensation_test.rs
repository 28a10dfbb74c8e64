//! Decompensation sampling over freshly extracted episodes

mod common;

use std::fs;
use std::path::Path;

use icu_timeseries::utils::io::read_series;
use icu_timeseries::{
    EpisodeExtractor, ExtractionConfig, Partition, PartitionSummary, SamplingConfig, SeriesFormat,
    create_decompensation,
};

use common::{reference_tables, sink, snapshot, source, write_dying_subject, write_subject};

/// Extract the subjects under `input` into `root/<partition>`
fn extract_into(input: &Path, root: &Path, partition: &str) {
    let reference = reference_tables();
    EpisodeExtractor::new(
        &source(input),
        &sink(&root.join(partition), SeriesFormat::Csv),
        &reference,
        ExtractionConfig::new(),
    )
    .run()
    .unwrap();
}

fn listfile_rows(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .skip(1)
        .map(str::to_string)
        .collect()
}

/// Listing of the dying subject: hourly from 5h to 36h, positive once death
/// is less than a day away.
fn expected_rows() -> Vec<String> {
    (5..=36)
        .map(|t| format!("1_episode1_timeseries.csv,{t}.000000,{}", u8::from(t > 12)))
        .collect()
}

#[test]
fn test_decompensation_listing() {
    let input = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_dying_subject(input.path());
    extract_into(input.path(), root.path(), "test");
    extract_into(input.path(), root.path(), "train");

    let summaries = create_decompensation(root.path(), output.path(), SamplingConfig::default()).unwrap();
    assert_eq!(
        summaries,
        vec![
            PartitionSummary {
                partition: Partition::Test,
                subjects: 1,
                subjects_skipped: 0,
                episodes_sampled: 1,
                episodes_skipped: 0,
                triples: 32,
                positive: 24,
            },
            PartitionSummary {
                partition: Partition::Train,
                subjects: 1,
                subjects_skipped: 0,
                episodes_sampled: 1,
                episodes_skipped: 0,
                triples: 32,
                positive: 24,
            },
        ]
    );

    let test_listfile = output.path().join("test").join("listfile.csv");
    let header = fs::read_to_string(&test_listfile).unwrap();
    assert!(header.starts_with("stay,period_length,y_true\n"));
    assert_eq!(listfile_rows(&test_listfile), expected_rows());

    let mut train = listfile_rows(&output.path().join("train").join("listfile.csv"));
    train.sort_by_key(|row| {
        let hours: String = row.split(',').nth(1).unwrap().to_string();
        hours.parse::<f64>().unwrap() as u64
    });
    assert_eq!(train, expected_rows());

    let restricted = output.path().join("test").join("1_episode1_timeseries.csv");
    assert_eq!(fs::read_to_string(&restricted).unwrap(), "Hours,Heart Rate\n2,80\n");
    assert_eq!(
        read_series(&restricted).unwrap(),
        read_series(&root.path().join("test").join("1").join("episode1_timeseries.csv")).unwrap()
    );
}

#[test]
fn test_survivor_has_only_negative_labels() {
    let input = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_subject(
        input.path(),
        5,
        &["5,50,500,2100-01-01 00:00:00,2100-01-02 00:00:00,,1,0,40,F,BLACK"],
        &["5,50,500,2100-01-01 01:00:00,211,90,bpm"],
    );
    extract_into(input.path(), root.path(), "test");

    let summaries = create_decompensation(root.path(), output.path(), SamplingConfig::default()).unwrap();
    assert_eq!(summaries[0].triples, 20);
    assert_eq!(summaries[0].positive, 0);
    // No train partition on disk
    assert_eq!(summaries[1].subjects, 0);
    assert!(!output.path().join("train").join("listfile.csv").exists());

    let rows = listfile_rows(&output.path().join("test").join("listfile.csv"));
    assert_eq!(rows.first().map(String::as_str), Some("5_episode1_timeseries.csv,5.000000,0"));
    assert_eq!(rows.last().map(String::as_str), Some("5_episode1_timeseries.csv,24.000000,0"));
}

#[test]
fn test_missing_label_skips_episode() {
    let input = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_dying_subject(input.path());
    extract_into(input.path(), root.path(), "test");
    fs::remove_file(root.path().join("test").join("1").join("episode1.csv")).unwrap();

    let summaries = create_decompensation(root.path(), output.path(), SamplingConfig::default()).unwrap();
    assert_eq!(summaries[0].episodes_sampled, 0);
    assert_eq!(summaries[0].episodes_skipped, 1);
    assert_eq!(
        fs::read_to_string(output.path().join("test").join("listfile.csv")).unwrap(),
        "stay,period_length,y_true\n"
    );
}

/// Replace the summary row of the dying subject's first episode
fn rewrite_label(root: &Path, row: &str) {
    fs::write(
        root.join("test").join("1").join("episode1.csv"),
        format!("Icustay,Age,Gender,Ethnicity,Height,Weight,Length of Stay,Mortality\n{row}\n"),
    )
    .unwrap();
}

#[test]
fn test_missing_length_of_stay_skips_episode() {
    let input = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_dying_subject(input.path());
    extract_into(input.path(), root.path(), "test");
    rewrite_label(root.path(), "100,70,2,4,,,,1");

    let summaries = create_decompensation(root.path(), output.path(), SamplingConfig::default()).unwrap();
    assert_eq!(summaries[0].subjects_skipped, 0);
    assert_eq!(summaries[0].episodes_sampled, 0);
    assert_eq!(summaries[0].episodes_skipped, 1);
    assert_eq!(summaries[0].triples, 0);
    assert_eq!(
        fs::read_to_string(output.path().join("test").join("listfile.csv")).unwrap(),
        "stay,period_length,y_true\n"
    );
    assert!(!output.path().join("test").join("1_episode1_timeseries.csv").exists());
}

#[test]
fn test_unknown_label_stay_skips_episode() {
    let input = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_dying_subject(input.path());
    extract_into(input.path(), root.path(), "test");
    rewrite_label(root.path(), "999,70,2,4,,,2,1");

    let summaries = create_decompensation(root.path(), output.path(), SamplingConfig::default()).unwrap();
    assert_eq!(summaries[0].subjects_skipped, 0);
    assert_eq!(summaries[0].episodes_sampled, 0);
    assert_eq!(summaries[0].episodes_skipped, 1);
    assert_eq!(
        fs::read_to_string(output.path().join("test").join("listfile.csv")).unwrap(),
        "stay,period_length,y_true\n"
    );
}

#[test]
fn test_sampling_is_reproducible() {
    let input = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    write_dying_subject(input.path());
    write_subject(
        input.path(),
        5,
        &["5,50,500,2100-01-01 00:00:00,2100-01-02 00:00:00,,1,0,40,F,BLACK"],
        &["5,50,500,2100-01-01 01:00:00,211,90,bpm"],
    );
    extract_into(input.path(), root.path(), "train");

    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    create_decompensation(root.path(), first.path(), SamplingConfig::default()).unwrap();
    create_decompensation(
        root.path(),
        second.path(),
        SamplingConfig::default().with_parallel(true),
    )
    .unwrap();

    assert_eq!(snapshot(first.path()), snapshot(second.path()));
}

#[test]
fn test_invalid_sample_rate_is_rejected() {
    let root = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let err = create_decompensation(
        root.path(),
        output.path(),
        SamplingConfig::default().with_sample_rate(0.0),
    )
    .unwrap_err();
    assert!(!err.is_recoverable());
}
