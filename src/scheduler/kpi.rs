//! Schedule quality metrics (KPIs).
//!
//! Computes tournament-day indicators from a completed schedule.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan | Latest end, in global slots |
//! | Consecutive pairs | Same-participant match pairs starting closer than the run threshold |
//! | Long runs | Participant runs of three or more consecutive matches |
//! | Shortest rest | Smallest idle gap between two matches of one participant, overnight included |
//! | Utilization | Busy share of each court's open slots over all days |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use std::collections::{BTreeMap, HashMap};

use crate::cp::pair_count;
use crate::models::{Match, Resource, Schedule};
use crate::time::SlotGrid;

/// Schedule performance indicators.
///
/// Slot values are grid slots; multiply by `slot_minutes` for minutes.
#[derive(Debug, Clone)]
pub struct ScheduleKpi {
    /// Matches requested.
    pub requested: usize,
    /// Requested matches that were placed.
    pub scheduled: usize,
    /// Latest end (global slot).
    pub makespan: usize,
    /// Consecutive pairs summed over participants.
    pub consecutive_pairs: usize,
    /// Runs of three or more consecutive matches.
    pub long_runs: usize,
    /// Shortest rest between two successive matches of a participant
    /// (slots, on the real timeline), if any participant plays twice.
    pub shortest_rest: Option<usize>,
    /// Average court utilization (0.0..1.0).
    pub avg_utilization: f64,
    /// Per-court utilization.
    pub utilization_by_resource: HashMap<String, f64>,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule.
    ///
    /// # Arguments
    /// * `schedule` - The completed schedule.
    /// * `grid` - The grid it was built on.
    /// * `resources` - Courts, for their open slots.
    /// * `requested` - Matches the caller asked for.
    pub fn calculate(
        schedule: &Schedule,
        grid: &SlotGrid,
        resources: &[Resource],
        requested: &[Match],
    ) -> Self {
        let scheduled = requested
            .iter()
            .filter(|m| schedule.contains_match(&m.id))
            .count();
        let threshold = grid.run_threshold();

        let mut per_participant: BTreeMap<&str, Vec<(usize, usize)>> = BTreeMap::new();
        for a in schedule.assignments() {
            for p in &a.participants {
                per_participant.entry(p.as_str()).or_default().push((
                    grid.timeline(a.day, a.start_slot),
                    grid.timeline(a.day, a.end_slot),
                ));
            }
        }

        let mut consecutive_pairs = 0;
        let mut long_runs = 0;
        let mut shortest_rest: Option<usize> = None;
        for spans in per_participant.values_mut() {
            spans.sort_unstable();
            let starts: Vec<usize> = spans.iter().map(|&(start, _)| start).collect();
            consecutive_pairs += pair_count(&starts, threshold);
            long_runs += count_long_runs(&starts, threshold);

            for w in spans.windows(2) {
                let rest = w[1].0.saturating_sub(w[0].1);
                shortest_rest = Some(shortest_rest.map_or(rest, |r| r.min(rest)));
            }
        }

        let mut utilization_by_resource = HashMap::new();
        for r in resources {
            let (open, close) = grid.resource_hours(r);
            let capacity = close.saturating_sub(open) * grid.days;
            let busy: usize = schedule
                .assignments_for_resource(&r.id)
                .iter()
                .map(|a| a.duration_slots())
                .sum();
            let util = if capacity == 0 {
                0.0
            } else {
                busy as f64 / capacity as f64
            };
            utilization_by_resource.insert(r.id.clone(), util);
        }
        let avg_utilization = if utilization_by_resource.is_empty() {
            0.0
        } else {
            let sum: f64 = utilization_by_resource.values().sum();
            sum / utilization_by_resource.len() as f64
        };

        Self {
            requested: requested.len(),
            scheduled,
            makespan: schedule.makespan(grid),
            consecutive_pairs,
            long_runs,
            shortest_rest,
            avg_utilization,
            utilization_by_resource,
        }
    }

    /// Fraction of requested matches that were placed.
    pub fn completion_rate(&self) -> f64 {
        if self.requested == 0 {
            1.0
        } else {
            self.scheduled as f64 / self.requested as f64
        }
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_long_runs: usize, min_completion: f64) -> bool {
        self.long_runs <= max_long_runs && self.completion_rate() >= min_completion
    }
}

/// Maximal runs (sorted starts, neighbours closer than `threshold`) of
/// length three or more.
fn count_long_runs(starts: &[usize], threshold: usize) -> usize {
    let mut runs = 0;
    let mut len = 1;
    for w in starts.windows(2) {
        if w[1] - w[0] < threshold {
            len += 1;
        } else {
            if len >= 3 {
                runs += 1;
            }
            len = 1;
        }
    }
    if len >= 3 {
        runs += 1;
    }
    runs
}
