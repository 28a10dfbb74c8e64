//! Per-episode time series
//!
//! A series is a fixed-width table: one `Hours` key followed by one column per
//! canonical variable, sorted alphabetically. Rows are ascending by `Hours`
//! and each `Hours` value appears once.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;

use crate::error::{PipelineError, Result};

/// Name of the elapsed-time column
pub const HOURS_COLUMN: &str = "Hours";

/// One row of a series
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRow {
    pub hours: f64,
    /// One cell per variable, aligned with [`EpisodeTimeSeries::variables`]
    pub values: Vec<Option<String>>,
}

/// The pivoted time series of one episode
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EpisodeTimeSeries {
    variables: Vec<String>,
    rows: Vec<SeriesRow>,
}

impl EpisodeTimeSeries {
    /// Create a series from variables and rows.
    ///
    /// Every row must have exactly one cell per variable.
    pub fn new(variables: Vec<String>, rows: Vec<SeriesRow>) -> Result<Self> {
        if let Some(row) = rows.iter().find(|r| r.values.len() != variables.len()) {
            return Err(PipelineError::Schema(format!(
                "row at {} hours has {} cells, expected {}",
                row.hours,
                row.values.len(),
                variables.len()
            )));
        }
        Ok(Self { variables, rows })
    }

    /// Variable columns in output order
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Rows in ascending hour order
    #[must_use]
    pub fn rows(&self) -> &[SeriesRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Elapsed time of the first row
    #[must_use]
    pub fn first_hours(&self) -> Option<f64> {
        self.rows.first().map(|r| r.hours)
    }

    /// Column position of a variable
    #[must_use]
    pub fn column(&self, variable: &str) -> Option<usize> {
        self.variables.iter().position(|v| v == variable)
    }

    /// Value of a variable in a given row
    #[must_use]
    pub fn value(&self, row: usize, variable: &str) -> Option<&str> {
        let col = self.column(variable)?;
        self.rows.get(row)?.values[col].as_deref()
    }

    /// First numeric value recorded for a variable
    #[must_use]
    pub fn first_numeric(&self, variable: &str) -> Option<f64> {
        let col = self.column(variable)?;
        self.rows
            .iter()
            .filter_map(|r| r.values[col].as_deref())
            .find_map(|v| v.trim().parse::<f64>().ok())
    }

    /// Keep only rows with `lower < hours < upper`
    #[must_use]
    pub fn filter_hours(&self, lower: f64, upper: f64) -> Self {
        Self {
            variables: self.variables.clone(),
            rows: self
                .rows
                .iter()
                .filter(|r| lower < r.hours && r.hours < upper)
                .cloned()
                .collect(),
        }
    }

    /// Arrow schema of this series
    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        let mut fields = Vec::with_capacity(self.variables.len() + 1);
        fields.push(Field::new(HOURS_COLUMN, DataType::Float64, false));
        fields.extend(
            self.variables
                .iter()
                .map(|v| Field::new(v, DataType::Utf8, true)),
        );
        Arc::new(Schema::new(fields))
    }

    /// Convert to a single record batch
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(self.variables.len() + 1);
        columns.push(Arc::new(Float64Array::from(
            self.rows.iter().map(|r| r.hours).collect::<Vec<_>>(),
        )));
        for col in 0..self.variables.len() {
            let values: Vec<Option<&str>> = self
                .rows
                .iter()
                .map(|r| r.values[col].as_deref())
                .collect();
            columns.push(Arc::new(StringArray::from(values)));
        }
        Ok(RecordBatch::try_new(self.schema(), columns)?)
    }

    /// Rebuild a series from record batches sharing `schema`.
    ///
    /// The first field must be `Hours`; other columns are cast to strings.
    pub fn from_record_batches(schema: &Schema, batches: &[RecordBatch]) -> Result<Self> {
        let fields = schema.fields();
        match fields.first() {
            Some(field) if field.name() == HOURS_COLUMN => {}
            _ => {
                return Err(PipelineError::Schema(format!(
                    "first column must be {HOURS_COLUMN}"
                )));
            }
        }
        let variables: Vec<String> = fields.iter().skip(1).map(|f| f.name().clone()).collect();

        let mut rows = Vec::new();
        for batch in batches {
            let hours_col = cast(batch.column(0), &DataType::Float64)?;
            let hours = hours_col
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| PipelineError::Schema(format!("{HOURS_COLUMN} is not numeric")))?;

            let value_cols = (1..batch.num_columns())
                .map(|i| cast(batch.column(i), &DataType::Utf8))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            let value_arrays = value_cols
                .iter()
                .map(|c| {
                    c.as_any()
                        .downcast_ref::<StringArray>()
                        .ok_or_else(|| PipelineError::Schema("value column is not text".into()))
                })
                .collect::<Result<Vec<_>>>()?;

            for i in 0..batch.num_rows() {
                if hours.is_null(i) {
                    return Err(PipelineError::Schema(format!(
                        "null {HOURS_COLUMN} at row {i}"
                    )));
                }
                let values = value_arrays
                    .iter()
                    .map(|a| (!a.is_null(i)).then(|| a.value(i).to_string()))
                    .collect();
                rows.push(SeriesRow {
                    hours: hours.value(i),
                    values,
                });
            }
        }

        Self::new(variables, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_series() -> EpisodeTimeSeries {
        EpisodeTimeSeries::new(
            vec!["Heart Rate".to_string(), "Weight".to_string()],
            vec![
                SeriesRow {
                    hours: 0.5,
                    values: vec![Some("80".to_string()), None],
                },
                SeriesRow {
                    hours: 2.0,
                    values: vec![Some("85".to_string()), Some("70.5".to_string())],
                },
                SeriesRow {
                    hours: 30.0,
                    values: vec![None, Some("71".to_string())],
                },
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let err = EpisodeTimeSeries::new(
            vec!["A".to_string()],
            vec![SeriesRow {
                hours: 1.0,
                values: vec![],
            }],
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Schema(_)));
    }

    #[test]
    fn test_record_batch_conversion() {
        let series = sample_series();
        let batch = series.to_record_batch().unwrap();
        assert_eq!(batch.num_rows(), 3);
        assert_eq!(batch.num_columns(), 3);
        assert_eq!(batch.schema().field(0).name(), HOURS_COLUMN);

        let rebuilt =
            EpisodeTimeSeries::from_record_batches(&batch.schema(), &[batch.clone()]).unwrap();
        assert_eq!(rebuilt, series);
    }

    #[test]
    fn test_first_numeric_and_filter() {
        let series = sample_series();
        assert_eq!(series.first_numeric("Weight"), Some(70.5));
        assert_eq!(series.first_numeric("Height"), None);
        assert_eq!(series.value(0, "Heart Rate"), Some("80"));

        let filtered = series.filter_hours(1.0, 24.0);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.first_hours(), Some(2.0));
    }
}
