//! Reading and writing episode series
//!
//! CSV files carry `Hours` first and one column per variable, empty cells for
//! missing values. The format of an existing file is chosen by extension.

use std::path::Path;

use crate::config::SeriesFormat;
use crate::error::util::create_file;
use crate::error::{PipelineError, Result};
use crate::models::series::{EpisodeTimeSeries, HOURS_COLUMN, SeriesRow};
use crate::utils::io::parquet::{read_series_parquet, write_series_parquet};
use crate::utils::io::table::csv_reader;

/// Write a series as CSV
pub fn write_series_csv(path: &Path, series: &EpisodeTimeSeries) -> Result<()> {
    let mut writer = csv::Writer::from_writer(create_file(path)?);

    let mut header = Vec::with_capacity(series.variables().len() + 1);
    header.push(HOURS_COLUMN);
    header.extend(series.variables().iter().map(String::as_str));
    writer.write_record(&header)?;

    for row in series.rows() {
        let mut record = Vec::with_capacity(row.values.len() + 1);
        record.push(row.hours.to_string());
        record.extend(row.values.iter().map(|v| v.clone().unwrap_or_default()));
        writer.write_record(&record)?;
    }
    writer.flush().map_err(|e| PipelineError::io(path, e))
}

/// Read a CSV series; `Hours` must be the first column
pub fn read_series_csv(path: &Path) -> Result<EpisodeTimeSeries> {
    let mut reader = csv_reader(path)?;
    let headers = reader.headers()?.clone();
    if headers.get(0).map(str::trim) != Some(HOURS_COLUMN) {
        return Err(PipelineError::Schema(format!(
            "{}: first column must be {HOURS_COLUMN}",
            path.display()
        )));
    }
    let variables: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let hours = record
            .get(0)
            .and_then(|h| h.parse::<f64>().ok())
            .ok_or_else(|| {
                PipelineError::Schema(format!(
                    "{}: invalid {HOURS_COLUMN} on row {}",
                    path.display(),
                    line + 1
                ))
            })?;
        let values = (1..=variables.len())
            .map(|i| record.get(i).filter(|v| !v.is_empty()).map(str::to_string))
            .collect();
        rows.push(SeriesRow { hours, values });
    }

    EpisodeTimeSeries::new(variables, rows)
}

/// Write a series in the given format
pub fn write_series(path: &Path, series: &EpisodeTimeSeries, format: SeriesFormat) -> Result<()> {
    match format {
        SeriesFormat::Csv => write_series_csv(path, series),
        SeriesFormat::Parquet => write_series_parquet(path, series),
    }
}

/// Read a series, picking the format from the file extension
pub fn read_series(path: &Path) -> Result<EpisodeTimeSeries> {
    match SeriesFormat::from_path(path) {
        Some(SeriesFormat::Csv) => read_series_csv(path),
        Some(SeriesFormat::Parquet) => read_series_parquet(path),
        None => Err(PipelineError::Schema(format!(
            "unrecognised series file {}",
            path.display()
        ))),
    }
}
