//! Event consolidation
//!
//! Turns the raw events of one episode into a fixed-width time series:
//!
//! 1. inner-join each event against its category's descriptive table
//! 2. map the reference code to a canonical variable
//! 3. drop blank values and range-check numeric ones
//! 4. sort by (hours, source order) and pivot on hours
//!
//! Cells are first-valid-wins: for a given hour and variable the earliest
//! event in source order fills the cell and later ones are ignored.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;

use crate::error::Result;
use crate::models::event::AlignedEvent;
use crate::models::series::{EpisodeTimeSeries, SeriesRow};
use crate::reference::{RangeCheck, ReferenceTables};

/// What happened to the events of one category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub seen: usize,
    /// Code absent from the category's descriptive table
    pub unmatched_descriptive: usize,
    /// Code with no canonical variable
    pub unmapped: usize,
    /// Missing or blank value
    pub missing_value: usize,
    /// Value outside the outlier bounds
    pub outliers: usize,
    /// Value clipped to a valid bound (still kept)
    pub clipped: usize,
    pub kept: usize,
}

impl CategoryCounts {
    /// Events removed for any reason
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.unmatched_descriptive + self.unmapped + self.missing_value + self.outliers
    }

    pub fn merge(&mut self, other: &Self) {
        self.seen += other.seen;
        self.unmatched_descriptive += other.unmatched_descriptive;
        self.unmapped += other.unmapped;
        self.missing_value += other.missing_value;
        self.outliers += other.outliers;
        self.clipped += other.clipped;
        self.kept += other.kept;
    }
}

/// Per-category event accounting for one or more episodes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsolidationReport {
    pub categories: BTreeMap<String, CategoryCounts>,
}

impl ConsolidationReport {
    fn entry(&mut self, category: &str) -> &mut CategoryCounts {
        self.categories.entry(category.to_string()).or_default()
    }

    /// Counts of a single category
    #[must_use]
    pub fn category(&self, category: &str) -> CategoryCounts {
        self.categories.get(category).copied().unwrap_or_default()
    }

    /// Counts summed over every category
    #[must_use]
    pub fn totals(&self) -> CategoryCounts {
        let mut totals = CategoryCounts::default();
        for counts in self.categories.values() {
            totals.merge(counts);
        }
        totals
    }

    pub fn merge(&mut self, other: &Self) {
        for (category, counts) in &other.categories {
            self.entry(category).merge(counts);
        }
    }
}

/// Result of consolidating one episode
#[derive(Debug, Clone)]
pub struct ConsolidatedEpisode {
    pub series: EpisodeTimeSeries,
    /// Surviving events, enriched and sorted by (hours, source order)
    pub events: Vec<AlignedEvent>,
    pub report: ConsolidationReport,
}

/// Merges, cleans and pivots episode events against the reference tables
#[derive(Debug, Clone, Copy)]
pub struct EventConsolidator<'a> {
    reference: &'a ReferenceTables,
}

impl<'a> EventConsolidator<'a> {
    #[must_use]
    pub const fn new(reference: &'a ReferenceTables) -> Self {
        Self { reference }
    }

    /// Consolidate the events of one episode
    pub fn consolidate(&self, events: Vec<AlignedEvent>) -> Result<ConsolidatedEpisode> {
        let mut report = ConsolidationReport::default();
        let mut kept: Vec<AlignedEvent> = events
            .into_iter()
            .filter_map(|event| self.prepare(event, &mut report))
            .collect();

        kept.sort_by(|a, b| {
            a.hours
                .total_cmp(&b.hours)
                .then_with(|| a.event.order.cmp(&b.event.order))
        });

        let series = pivot(&kept)?;
        Ok(ConsolidatedEpisode {
            series,
            events: kept,
            report,
        })
    }

    /// Enrich, map and clean one event; `None` when it is dropped
    fn prepare(&self, mut event: AlignedEvent, report: &mut ConsolidationReport) -> Option<AlignedEvent> {
        let counts = report.entry(event.category());
        counts.seen += 1;

        if let Some(table) = self.reference.descriptive_for(event.category()) {
            let labels = event.code().and_then(|code| {
                table.labels(code).map(|fields| {
                    fields
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect::<BTreeMap<_, _>>()
                })
            });
            match labels {
                Some(labels) => event.labels = labels,
                None => {
                    counts.unmatched_descriptive += 1;
                    return None;
                }
            }
        }

        let Some(variable) = event.code().and_then(|c| self.reference.variables.variable(c)) else {
            counts.unmapped += 1;
            return None;
        };
        let variable = variable.to_string();

        let Some(value) = event.value() else {
            counts.missing_value += 1;
            return None;
        };
        match self.reference.ranges.check(&variable, value) {
            RangeCheck::Keep => {}
            RangeCheck::Clip(bound) => {
                counts.clipped += 1;
                event.event.value = Some(bound.to_string());
            }
            RangeCheck::Discard => {
                counts.outliers += 1;
                return None;
            }
        }

        counts.kept += 1;
        event.variable = Some(variable);
        Some(event)
    }
}

/// Pivot sorted events into one row per distinct hour.
///
/// The first pass collects the variable set, the second fills fixed-width
/// rows.
fn pivot(events: &[AlignedEvent]) -> Result<EpisodeTimeSeries> {
    let variables: Vec<String> = events
        .iter()
        .filter_map(|e| e.variable.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let column: BTreeMap<&str, usize> = variables
        .iter()
        .enumerate()
        .map(|(i, v)| (v.as_str(), i))
        .collect();

    let mut rows = Vec::new();
    for (_, group) in &events.iter().chunk_by(|e| e.hours.to_bits()) {
        let mut row: Option<SeriesRow> = None;
        for event in group {
            let row = row.get_or_insert_with(|| SeriesRow {
                hours: event.hours,
                values: vec![None; variables.len()],
            });
            let (Some(variable), Some(value)) = (event.variable.as_deref(), event.value()) else {
                continue;
            };
            let cell = &mut row.values[column[variable]];
            if cell.is_none() {
                *cell = Some(value.to_string());
            }
        }
        rows.extend(row);
    }

    EpisodeTimeSeries::new(variables, rows)
}
