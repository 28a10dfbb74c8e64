//! Plausible value ranges per canonical variable
//!
//! Values outside the outlier bounds are discarded. Values between an outlier
//! bound and the matching valid bound are clipped to the valid bound.

use std::path::Path;

use rustc_hash::FxHashMap;

use crate::error::{PipelineError, Result};
use crate::utils::io::table::{cell, parse_number, read_table};

/// Outcome of checking a value against a range
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeCheck {
    Keep,
    Clip(f64),
    Discard,
}

/// Bounds for one variable; any bound may be absent
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VariableRange {
    pub outlier_low: Option<f64>,
    pub valid_low: Option<f64>,
    pub valid_high: Option<f64>,
    pub outlier_high: Option<f64>,
}

impl VariableRange {
    #[must_use]
    pub const fn new(
        outlier_low: Option<f64>,
        valid_low: Option<f64>,
        valid_high: Option<f64>,
        outlier_high: Option<f64>,
    ) -> Self {
        Self {
            outlier_low,
            valid_low,
            valid_high,
            outlier_high,
        }
    }

    /// Check a numeric value against the bounds
    #[must_use]
    pub fn check(&self, value: f64) -> RangeCheck {
        if self.outlier_low.is_some_and(|lo| value < lo)
            || self.outlier_high.is_some_and(|hi| value > hi)
        {
            return RangeCheck::Discard;
        }
        if let Some(lo) = self.valid_low {
            if value < lo {
                return RangeCheck::Clip(lo);
            }
        }
        if let Some(hi) = self.valid_high {
            if value > hi {
                return RangeCheck::Clip(hi);
            }
        }
        RangeCheck::Keep
    }
}

/// Ranges keyed by canonical variable
#[derive(Debug, Clone, Default)]
pub struct VariableRanges {
    by_variable: FxHashMap<String, VariableRange>,
}

impl VariableRanges {
    pub fn from_pairs<I, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (V, VariableRange)>,
        V: Into<String>,
    {
        Self {
            by_variable: pairs.into_iter().map(|(v, r)| (v.into(), r)).collect(),
        }
    }

    /// Load ranges from a CSV with `LEVEL2` (or `VARIABLE`) and the columns
    /// `OUTLIER LOW`, `VALID LOW`, `VALID HIGH`, `OUTLIER HIGH`
    pub fn load(path: &Path) -> Result<Self> {
        let (headers, records) = read_table(path)
            .map_err(|e| PipelineError::Reference(format!("variable ranges: {e}")))?;
        let var_col = headers
            .require(&["LEVEL2", "VARIABLE"])
            .map_err(|e| PipelineError::Reference(e.to_string()))?;
        let outlier_low = headers.find(&["OUTLIER LOW"]);
        let valid_low = headers.find(&["VALID LOW"]);
        let valid_high = headers.find(&["VALID HIGH"]);
        let outlier_high = headers.find(&["OUTLIER HIGH"]);

        let mut by_variable = FxHashMap::default();
        for record in &records {
            let Some(variable) = cell(record, Some(var_col)) else {
                continue;
            };
            by_variable.insert(
                variable.to_string(),
                VariableRange::new(
                    parse_number(cell(record, outlier_low)),
                    parse_number(cell(record, valid_low)),
                    parse_number(cell(record, valid_high)),
                    parse_number(cell(record, outlier_high)),
                ),
            );
        }

        log::info!("Loaded {} variable ranges from {}", by_variable.len(), path.display());
        Ok(Self { by_variable })
    }

    #[must_use]
    pub fn get(&self, variable: &str) -> Option<&VariableRange> {
        self.by_variable.get(variable)
    }

    /// Check a raw value of `variable`; non-numeric values are kept as-is
    #[must_use]
    pub fn check(&self, variable: &str, value: &str) -> RangeCheck {
        match (self.get(variable), value.trim().parse::<f64>()) {
            (Some(range), Ok(number)) if number.is_finite() => range.check(number),
            _ => RangeCheck::Keep,
        }
    }
}
