//! Greedy fallback scheduler.
//!
//! # Algorithm
//!
//! 1. Take matches in input order.
//! 2. For each match, enumerate every (day, slot, court) candidate and
//!    drop those the constraint checker rejects.
//! 3. Score each survivor by the longest consecutive run it would give
//!    either participant, then by global start; commit the smallest.
//! 4. If the match's group is pinned to a court and nothing fits there,
//!    retry once with the candidate's rest buffer waived (soft break).
//!    The waiver names the matches it sits too close to and covers those
//!    pairs only.
//! 5. Otherwise leave the match unscheduled and move on. Earlier
//!    commitments are never revisited.
//!
//! # Complexity
//! O(n * d * s * c * k) where n=matches, d=days, s=slots per day,
//! c=courts, k=assignments checked per candidate.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::constraints::ConstraintChecker;
use crate::models::{Assignment, Match, Resource, Schedule};

/// Length of the run a match starting at `start` would join.
///
/// `starts` are the participant's other starts on the timeline, sorted.
/// Neighbours closer than `threshold` extend the run, across midnight too.
pub fn run_length(starts: &[usize], start: usize, threshold: usize) -> usize {
    let idx = starts.partition_point(|&s| s < start);
    let mut run = 1;

    let mut prev = start;
    for &s in starts[..idx].iter().rev() {
        if prev - s >= threshold {
            break;
        }
        run += 1;
        prev = s;
    }

    let mut prev = start;
    for &s in &starts[idx..] {
        if s - prev >= threshold {
            break;
        }
        run += 1;
        prev = s;
    }

    run
}

/// Greedy single-pass scheduler.
///
/// # Example
///
/// ```
/// use court_scheduler::config::SchedulerConfig;
/// use court_scheduler::constraints::ConstraintChecker;
/// use court_scheduler::models::{Match, Participant, Resource, Schedule};
/// use court_scheduler::scheduler::GreedyScheduler;
/// use court_scheduler::time::{parse_time, SlotGrid};
///
/// let resources = vec![Resource::new("C1", parse_time("08:00").unwrap())];
/// let participants = vec![Participant::new("A"), Participant::new("B")];
/// let matches = vec![Match::new("M1", "A", "B")];
/// let grid = SlotGrid::new(&resources, &SchedulerConfig::default()).unwrap();
/// let checker = ConstraintChecker::new(&grid, &resources, &participants);
///
/// let mut schedule = Schedule::for_resources(&resources);
/// let mut warnings = Vec::new();
/// let unscheduled = GreedyScheduler::new(&checker, &resources)
///     .schedule(&matches, &mut schedule, &mut warnings);
/// assert!(unscheduled.is_empty());
/// assert_eq!(schedule.assignment_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct GreedyScheduler<'a> {
    checker: &'a ConstraintChecker<'a>,
    resources: &'a [Resource],
    confine_groups: bool,
    allow_soft_break: bool,
}

impl<'a> GreedyScheduler<'a> {
    /// Creates a new scheduler over the given courts.
    pub fn new(checker: &'a ConstraintChecker<'a>, resources: &'a [Resource]) -> Self {
        Self {
            checker,
            resources,
            confine_groups: false,
            allow_soft_break: true,
        }
    }

    /// Keeps every match of a (non-empty) group on the court its first
    /// match landed on.
    pub fn with_group_confinement(mut self, confine: bool) -> Self {
        self.confine_groups = confine;
        self
    }

    /// Allows the rest-buffer retry for pinned groups.
    pub fn with_soft_break(mut self, allow: bool) -> Self {
        self.allow_soft_break = allow;
        self
    }

    /// Places `matches` into `schedule`.
    ///
    /// Returns the IDs of matches left unscheduled; each also gets a
    /// warning. Soft breaks are reported as warnings too.
    pub fn schedule(
        &self,
        matches: &[Match],
        schedule: &mut Schedule,
        warnings: &mut Vec<String>,
    ) -> Vec<String> {
        let grid = self.checker.grid();
        let mut pinned: HashMap<String, String> = HashMap::new();
        if self.confine_groups {
            for a in schedule.assignments().filter(|a| !a.group.is_empty()) {
                pinned
                    .entry(a.group.clone())
                    .or_insert_with(|| a.resource_id.clone());
            }
        }
        let mut unscheduled = Vec::new();

        for m in matches {
            let court = pinned.get(&m.group).map(String::as_str);

            let mut chosen = self.best_candidate(m, schedule, court, false);
            if chosen.is_none() && court.is_some() && grid.rest_slots > 0 && self.allow_soft_break {
                chosen = self.best_candidate(m, schedule, court, true).map(|cand| {
                    let neighbours = self.checker.rest_neighbours(schedule, &cand);
                    let message = self.soft_break_message(&cand, &neighbours);
                    warn!(match_id = %m.id, resource = %cand.resource_id, "{}", message);
                    warnings.push(message);
                    let waived = neighbours.iter().map(|a| a.match_id.clone()).collect();
                    cand.with_rest_waived(waived)
                });
            }

            match chosen {
                Some(assignment) => {
                    debug!(
                        match_id = %m.id,
                        resource = %assignment.resource_id,
                        day = assignment.day,
                        start = %grid.label(assignment.start_slot),
                        "placed match"
                    );
                    if self.confine_groups && !m.group.is_empty() {
                        pinned
                            .entry(m.group.clone())
                            .or_insert_with(|| assignment.resource_id.clone());
                    }
                    schedule.add_assignment(assignment);
                }
                None => {
                    debug!(match_id = %m.id, "no feasible slot");
                    warnings.push(format!(
                        "Match {} ({} vs {}) could not be scheduled",
                        m.id, m.participant_a, m.participant_b
                    ));
                    unscheduled.push(m.id.clone());
                }
            }
        }

        unscheduled
    }

    /// Lowest-scoring feasible candidate, first one on ties.
    fn best_candidate(
        &self,
        m: &Match,
        schedule: &Schedule,
        court: Option<&str>,
        waive_rest: bool,
    ) -> Option<Assignment> {
        let grid = self.checker.grid();
        let last_start = grid.slots_per_day.checked_sub(grid.match_slots)?;
        let threshold = grid.run_threshold();

        let timeline_starts = |participant: &str| -> Vec<usize> {
            let mut starts: Vec<usize> = schedule
                .assignments_for_participant(participant)
                .into_iter()
                .map(|a| grid.timeline(a.day, a.start_slot))
                .collect();
            starts.sort_unstable();
            starts
        };
        let starts_a = timeline_starts(&m.participant_a);
        let starts_b = timeline_starts(&m.participant_b);

        let mut best: Option<((usize, usize), Assignment)> = None;
        for day in 0..grid.days {
            for start in 0..=last_start {
                for resource in self
                    .resources
                    .iter()
                    .filter(|r| court.map_or(true, |c| c == r.id))
                {
                    let cand = Assignment::new(m, &resource.id, day, start, start + grid.match_slots);
                    let feasible = if waive_rest {
                        self.checker.is_feasible_waiving_rest(schedule, &cand)
                    } else {
                        self.checker.is_feasible(schedule, &cand)
                    };
                    if !feasible {
                        continue;
                    }
                    let at = grid.timeline(day, start);
                    let run = run_length(&starts_a, at, threshold)
                        .max(run_length(&starts_b, at, threshold));
                    let score = (run, at);
                    if best.as_ref().map_or(true, |(s, _)| score < *s) {
                        best = Some((score, cand));
                    }
                }
            }
        }

        best.map(|(_, cand)| cand)
    }

    fn soft_break_message(&self, cand: &Assignment, neighbours: &[&Assignment]) -> String {
        let grid = self.checker.grid();
        let (start, end) = self.checker.span(cand);
        let shortest = neighbours
            .iter()
            .map(|a| {
                let (s, e) = self.checker.span(a);
                s.saturating_sub(end).max(start.saturating_sub(e))
            })
            .min()
            .unwrap_or(0);
        let ids: Vec<&str> = neighbours.iter().map(|a| a.match_id.as_str()).collect();

        format!(
            "Match {} on {} placed with rest relaxed next to {}: shortest rest {} min (minimum {} min)",
            cand.match_id,
            cand.resource_id,
            ids.join(", "),
            shortest as u32 * grid.slot_minutes,
            grid.rest_slots as u32 * grid.slot_minutes
        )
    }
}
