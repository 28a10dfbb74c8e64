//! Sample window generation for the decompensation task
//!
//! Candidate times are laid on a regular grid from admission up to the end of
//! the stay (or death, if earlier). A candidate survives when it is strictly
//! past the minimum length and strictly past the first recorded measurement.
//! Its label is positive when death follows within the future horizon.

use std::cmp::Ordering;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::config::SamplingConfig;
use crate::error::{PipelineError, Result};
use crate::models::sample::{Partition, SampleTriple};
use crate::models::series::EpisodeTimeSeries;

/// Time-until-event used when the patient does not die
pub const LIVED_TIME_SENTINEL: f64 = 1e18;

/// Outcome of one episode as read from its label file and stay record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeOutcome {
    /// Length of stay in hours
    pub length_of_stay: f64,
    pub mortality: bool,
    /// Hours from admission to death, if the patient died
    pub lived_time: Option<f64>,
}

impl EpisodeOutcome {
    #[must_use]
    pub const fn new(length_of_stay: f64, mortality: bool, lived_time: Option<f64>) -> Self {
        Self {
            length_of_stay,
            mortality,
            lived_time,
        }
    }

    /// Hours until death, or [`LIVED_TIME_SENTINEL`]
    #[must_use]
    pub fn time_until_event(&self) -> f64 {
        self.lived_time.unwrap_or(LIVED_TIME_SENTINEL)
    }

    /// Last admissible sample time
    #[must_use]
    pub fn cutoff(&self) -> f64 {
        self.length_of_stay.min(self.time_until_event())
    }
}

/// A series restricted to the stay plus the samples drawn from it
#[derive(Debug, Clone)]
pub struct SampledEpisode {
    pub series: EpisodeTimeSeries,
    pub triples: Vec<SampleTriple>,
}

/// Draws labeled sample triples from episode series
#[derive(Debug, Clone)]
pub struct SampleWindowGenerator {
    config: SamplingConfig,
}

impl SampleWindowGenerator {
    /// Create a generator; fails on a non-positive sample rate
    pub fn new(config: SamplingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &SamplingConfig {
        &self.config
    }

    /// Grid times `k * sample_rate` in `[0, cutoff + eps)`
    #[must_use]
    pub fn candidate_times(&self, cutoff: f64) -> Vec<f64> {
        let limit = cutoff + self.config.eps;
        if limit.is_nan() || limit <= 0.0 {
            return Vec::new();
        }
        // Same count as a half-open arange over [0, limit)
        let count = (limit / self.config.sample_rate).ceil() as usize;
        (0..count)
            .map(|k| k as f64 * self.config.sample_rate)
            .collect()
    }

    /// Candidate times that pass the minimum length and first measurement cuts
    #[must_use]
    pub fn sample_times(&self, outcome: &EpisodeOutcome, first_event_hours: f64) -> Vec<f64> {
        self.candidate_times(outcome.cutoff())
            .into_iter()
            .filter(|&t| t > self.config.shortest_length)
            .filter(|&t| t > first_event_hours)
            .collect()
    }

    /// Label of a sample taken at `t`
    #[must_use]
    pub fn label_at(&self, outcome: &EpisodeOutcome, t: f64) -> u8 {
        if !outcome.mortality {
            return 0;
        }
        u8::from(outcome.time_until_event() - t < self.config.future_time_interval)
    }

    /// Restrict a series to the stay and draw its samples.
    ///
    /// Rows are kept when `-eps < Hours < length_of_stay + eps`. A series with
    /// no rows left is an [`PipelineError::EmptyEpisode`].
    pub fn sample_episode(
        &self,
        series_id: &str,
        series: &EpisodeTimeSeries,
        outcome: &EpisodeOutcome,
    ) -> Result<SampledEpisode> {
        let eps = self.config.eps;
        let restricted = series.filter_hours(-eps, outcome.length_of_stay + eps);
        let Some(first) = restricted.first_hours() else {
            return Err(PipelineError::EmptyEpisode {
                episode: series_id.to_string(),
            });
        };

        let triples = self
            .sample_times(outcome, first)
            .into_iter()
            .map(|t| SampleTriple::new(series_id, t, self.label_at(outcome, t)))
            .collect();

        Ok(SampledEpisode {
            series: restricted,
            triples,
        })
    }
}

fn compare_triples(a: &SampleTriple, b: &SampleTriple) -> Ordering {
    a.stay
        .cmp(&b.stay)
        .then_with(|| a.period_length.total_cmp(&b.period_length))
        .then_with(|| a.y_true.cmp(&b.y_true))
}

/// Apply the ordering policy of a partition.
///
/// Train is shuffled with a seeded generator, test is sorted by
/// (series, time), anything else keeps its order.
#[must_use]
pub fn order_triples(mut triples: Vec<SampleTriple>, partition: &Partition, seed: u64) -> Vec<SampleTriple> {
    match partition {
        Partition::Train => {
            let mut rng = StdRng::seed_from_u64(seed);
            triples.shuffle(&mut rng);
        }
        Partition::Test => triples.sort_by(compare_triples),
        Partition::Other(_) => {}
    }
    triples
}
