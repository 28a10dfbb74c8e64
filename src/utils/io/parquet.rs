//! Parquet persistence of episode series

use std::path::Path;

use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::Result;
use crate::error::util::{create_file, open_file};
use crate::models::series::EpisodeTimeSeries;

/// Default batch size for Parquet reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// Helper function to get batch size from environment
#[must_use]
pub fn get_batch_size() -> Option<usize> {
    std::env::var("PARQUET_BATCH_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
}

/// Write a series as a single-row-group Parquet file
pub fn write_series_parquet(path: &Path, series: &EpisodeTimeSeries) -> Result<()> {
    let batch = series.to_record_batch()?;
    let file = create_file(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Read a series written by [`write_series_parquet`]
pub fn read_series_parquet(path: &Path) -> Result<EpisodeTimeSeries> {
    let file = open_file(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let reader = builder
        .with_batch_size(get_batch_size().unwrap_or(DEFAULT_BATCH_SIZE))
        .build()?;

    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    EpisodeTimeSeries::from_record_batches(&schema, &batches)
}
