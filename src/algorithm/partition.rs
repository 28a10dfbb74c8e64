//! Episode partitioning
//!
//! Splits a subject's events into one group per ICU stay. An event carrying
//! the id of one of the subject's stays goes to that stay. Any other event
//! goes to a stay whose window `[INTIME - tolerance, OUTTIME + tolerance]`
//! contains it; when several windows do, the stay with the latest admission
//! at or before the event wins, then the lowest stay id. Events only inside
//! tolerance before every candidate go to the earliest such admission.

use chrono::{Duration, NaiveDateTime};

use crate::algorithm::alignment::TimeAligner;
use crate::models::event::{AlignedEvent, Event, RawEvent};
use crate::models::stay::Stay;

/// Events of one stay, on that stay's time axis
#[derive(Debug, Clone)]
pub struct EpisodeEvents<'a> {
    /// 1-based position of the stay in admission order
    pub index: usize,
    pub stay: &'a Stay,
    pub events: Vec<AlignedEvent>,
}

/// Counts of what happened to a subject's events during partitioning
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionReport {
    /// Events dropped for a missing or unparsable timestamp
    pub malformed_timestamps: usize,
    /// Events outside every stay window
    pub unassigned: usize,
    /// Events assigned through an explicit stay id
    pub direct: usize,
    /// Events whose timestamp fell in more than one stay window
    pub overlapping: usize,
}

impl PartitionReport {
    pub fn merge(&mut self, other: &Self) {
        self.malformed_timestamps += other.malformed_timestamps;
        self.unassigned += other.unassigned;
        self.direct += other.direct;
        self.overlapping += other.overlapping;
    }
}

/// Assigns events to stays and aligns them to each stay's admission
#[derive(Debug, Clone)]
pub struct EpisodePartitioner {
    aligner: TimeAligner,
    tolerance: Duration,
}

impl EpisodePartitioner {
    /// Create a partitioner with a boundary tolerance in hours
    #[must_use]
    pub fn new(aligner: TimeAligner, tolerance_hours: f64) -> Self {
        let millis = (tolerance_hours.max(0.0) * 3_600_000.0).round() as i64;
        Self {
            aligner,
            tolerance: Duration::try_milliseconds(millis).unwrap_or(Duration::MAX),
        }
    }

    /// Stays in episode order: by admission time, then stay id
    #[must_use]
    pub fn order_stays(stays: &[Stay]) -> Vec<&Stay> {
        let mut ordered: Vec<&Stay> = stays.iter().collect();
        ordered.sort_by_key(|s| (s.intime, s.stay_id));
        ordered
    }

    /// Partition a subject's events across its stays.
    ///
    /// Only stays with at least one event are returned; indices still count
    /// every stay so episode numbering does not depend on the events.
    pub fn partition<'a>(
        &self,
        stays: &'a [Stay],
        events: Vec<RawEvent>,
    ) -> (Vec<EpisodeEvents<'a>>, PartitionReport) {
        let mut report = PartitionReport::default();
        let ordered = Self::order_stays(stays);

        let (events, malformed) = self.aligner.parse_events(events);
        report.malformed_timestamps = malformed;

        let mut buckets: Vec<Vec<Event>> = vec![Vec::new(); ordered.len()];
        for event in events {
            match self.assign(&event, &ordered, &mut report) {
                Some(slot) => buckets[slot].push(event),
                None => report.unassigned += 1,
            }
        }

        let episodes = ordered
            .into_iter()
            .zip(buckets)
            .enumerate()
            .filter(|(_, (_, bucket))| !bucket.is_empty())
            .map(|(i, (stay, bucket))| EpisodeEvents {
                index: i + 1,
                stay,
                events: bucket
                    .into_iter()
                    .map(|e| self.aligner.align(e, stay.intime))
                    .collect(),
            })
            .collect();

        (episodes, report)
    }

    /// Position in `ordered` of the stay an event belongs to
    fn assign(&self, event: &Event, ordered: &[&Stay], report: &mut PartitionReport) -> Option<usize> {
        if let Some(id) = event.stay_id {
            if let Some(slot) = ordered.iter().position(|s| s.stay_id == id) {
                report.direct += 1;
                return Some(slot);
            }
        }

        let candidates: Vec<usize> = (0..ordered.len())
            .filter(|&i| self.contains(ordered[i], event.time))
            .collect();
        if candidates.len() > 1 {
            report.overlapping += 1;
        }
        select_stay(&candidates, ordered, event.time)
    }

    /// Window bounds saturate at the representable range
    fn contains(&self, stay: &Stay, time: NaiveDateTime) -> bool {
        let start = stay
            .intime
            .checked_sub_signed(self.tolerance)
            .unwrap_or(NaiveDateTime::MIN);
        let end = stay
            .outtime
            .checked_add_signed(self.tolerance)
            .unwrap_or(NaiveDateTime::MAX);
        start <= time && time <= end
    }
}

fn select_stay(candidates: &[usize], ordered: &[&Stay], time: NaiveDateTime) -> Option<usize> {
    let admitted_before = candidates
        .iter()
        .copied()
        .filter(|&i| ordered[i].intime <= time)
        .max_by(|&a, &b| {
            ordered[a]
                .intime
                .cmp(&ordered[b].intime)
                .then_with(|| ordered[b].stay_id.cmp(&ordered[a].stay_id))
        });

    admitted_before.or_else(|| {
        candidates
            .iter()
            .copied()
            .min_by_key(|&i| (ordered[i].intime, ordered[i].stay_id))
    })
}
