//! Hard-feasibility predicates.
//!
//! Three checks decide whether a candidate [`Assignment`] may join a
//! [`Schedule`]:
//! - **Court availability**: inside opening hours and clear of every other
//!   match on the court, including the rest buffer after each.
//! - **Participant availability**: neither participant already plays at
//!   that time, and both keep the minimum rest on either side.
//! - **Participant windows**: the match starts and ends inside each
//!   participant's window.
//!
//! The optimizer, the fallback and the verifier all decide feasibility
//! through this module. Distances are measured on the grid's timeline, so
//! the rest buffer carries across midnight when play runs round the clock.
//! A soft break waives the buffer only between the pairs it recorded.

use std::collections::HashMap;

use crate::models::{Assignment, Participant, Resource, Schedule};
use crate::time::SlotGrid;

/// Whether `[a.0, a.1)` and `[b.0, b.1)` are at least `gap` slots apart.
///
/// With `gap == 0` this is plain non-overlap.
#[inline]
pub fn separated(a: (usize, usize), b: (usize, usize), gap: usize) -> bool {
    a.0 >= b.1 + gap || b.0 >= a.1 + gap
}

/// Why a participant cannot take a candidate slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantClash {
    /// Two matches at the same time.
    Overlap,
    /// Matches too close together.
    Rest,
}

/// Feasibility checker bound to one call's grid, courts and roster.
#[derive(Debug, Clone)]
pub struct ConstraintChecker<'a> {
    grid: &'a SlotGrid,
    hours: HashMap<&'a str, (usize, usize)>,
    windows: HashMap<&'a str, (usize, usize)>,
}

impl<'a> ConstraintChecker<'a> {
    /// Precomputes court hours and participant windows in slots.
    pub fn new(
        grid: &'a SlotGrid,
        resources: &'a [Resource],
        participants: &'a [Participant],
    ) -> Self {
        let hours = resources
            .iter()
            .map(|r| (r.id.as_str(), grid.resource_hours(r)))
            .collect();
        let windows = participants
            .iter()
            .filter(|p| p.has_window())
            .map(|p| (p.id.as_str(), grid.participant_window(p)))
            .collect();
        Self {
            grid,
            hours,
            windows,
        }
    }

    /// The grid this checker works on.
    pub fn grid(&self) -> &SlotGrid {
        self.grid
    }

    /// Local `[open, close)` of a court, `None` if unknown.
    pub fn resource_hours(&self, resource_id: &str) -> Option<(usize, usize)> {
        self.hours.get(resource_id).copied()
    }

    /// Local `[earliest_start, latest_end]` of a participant.
    pub fn participant_window(&self, participant: &str) -> (usize, usize) {
        self.windows
            .get(participant)
            .copied()
            .unwrap_or((0, self.grid.slots_per_day))
    }

    /// `[start, end)` of an assignment on the timeline.
    #[inline]
    pub fn span(&self, a: &Assignment) -> (usize, usize) {
        (
            self.grid.timeline(a.day, a.start_slot),
            self.grid.timeline(a.day, a.end_slot),
        )
    }

    /// Rest buffer owed between two assignments.
    #[inline]
    fn rest_between(&self, a: &Assignment, b: &Assignment) -> usize {
        if a.waives_rest_with(&b.match_id) || b.waives_rest_with(&a.match_id) {
            0
        } else {
            self.grid.rest_slots
        }
    }

    /// Gap a candidate must keep from `existing`; zero when its rest is waived.
    #[inline]
    fn required_gap(&self, candidate: &Assignment, existing: &Assignment, waive_rest: bool) -> usize {
        if waive_rest {
            0
        } else {
            self.rest_between(candidate, existing)
        }
    }

    /// Whether the candidate lies inside its court's opening hours.
    pub fn within_hours(&self, candidate: &Assignment) -> bool {
        match self.resource_hours(&candidate.resource_id) {
            Some((open, close)) => candidate.start_slot >= open && candidate.end_slot <= close,
            None => false,
        }
    }

    fn resource_conflict_with<'s>(
        &self,
        schedule: &'s Schedule,
        candidate: &Assignment,
        waive_rest: bool,
    ) -> Option<&'s Assignment> {
        let span = self.span(candidate);
        schedule
            .assignments_for_resource(&candidate.resource_id)
            .iter()
            .filter(|a| a.match_id != candidate.match_id)
            .find(|a| {
                !separated(span, self.span(a), self.required_gap(candidate, a, waive_rest))
            })
    }

    /// First assignment on the candidate's court that it collides with.
    pub fn resource_conflict<'s>(
        &self,
        schedule: &'s Schedule,
        candidate: &Assignment,
    ) -> Option<&'s Assignment> {
        self.resource_conflict_with(schedule, candidate, false)
    }

    /// Court open and free (with rest buffer) for the candidate.
    pub fn resource_available(&self, schedule: &Schedule, candidate: &Assignment) -> bool {
        self.within_hours(candidate) && self.resource_conflict(schedule, candidate).is_none()
    }

    fn participant_conflict_with<'s>(
        &self,
        schedule: &'s Schedule,
        candidate: &'s Assignment,
        waive_rest: bool,
    ) -> Option<(&'s str, &'s Assignment, ParticipantClash)> {
        let span = self.span(candidate);
        for participant in &candidate.participants {
            for existing in schedule
                .assignments()
                .filter(|a| a.match_id != candidate.match_id && a.involves(participant))
            {
                let other = self.span(existing);
                if !separated(span, other, 0) {
                    return Some((participant.as_str(), existing, ParticipantClash::Overlap));
                }
                if !separated(span, other, self.required_gap(candidate, existing, waive_rest)) {
                    return Some((participant.as_str(), existing, ParticipantClash::Rest));
                }
            }
        }
        None
    }

    /// First participant clash for the candidate: who, with which match, and why.
    pub fn participant_conflict<'s>(
        &self,
        schedule: &'s Schedule,
        candidate: &'s Assignment,
    ) -> Option<(&'s str, &'s Assignment, ParticipantClash)> {
        self.participant_conflict_with(schedule, candidate, false)
    }

    /// Neither participant is busy or short of rest around the candidate.
    pub fn participants_free(&self, schedule: &Schedule, candidate: &Assignment) -> bool {
        self.participant_conflict(schedule, candidate).is_none()
    }

    /// First participant whose window the candidate violates.
    pub fn window_conflict<'s>(&self, candidate: &'s Assignment) -> Option<&'s str> {
        candidate
            .participants
            .iter()
            .find(|p| {
                let (earliest, latest) = self.participant_window(p);
                candidate.start_slot < earliest || candidate.end_slot > latest
            })
            .map(String::as_str)
    }

    /// The candidate respects every participant window.
    pub fn within_windows(&self, candidate: &Assignment) -> bool {
        self.window_conflict(candidate).is_none()
    }

    /// All three predicates combined.
    pub fn is_feasible(&self, schedule: &Schedule, candidate: &Assignment) -> bool {
        self.within_windows(candidate)
            && self.resource_available(schedule, candidate)
            && self.participants_free(schedule, candidate)
    }

    /// Like [`is_feasible`](Self::is_feasible) with the candidate's rest
    /// buffer waived: overlaps, hours and windows stay hard.
    pub fn is_feasible_waiving_rest(&self, schedule: &Schedule, candidate: &Assignment) -> bool {
        self.within_windows(candidate)
            && self.within_hours(candidate)
            && self.resource_conflict_with(schedule, candidate, true).is_none()
            && self.participant_conflict_with(schedule, candidate, true).is_none()
    }

    /// Matches on the candidate's court or of its participants that sit
    /// inside the rest buffer without overlapping it, in schedule order.
    pub fn rest_neighbours<'s>(
        &self,
        schedule: &'s Schedule,
        candidate: &Assignment,
    ) -> Vec<&'s Assignment> {
        let span = self.span(candidate);
        schedule
            .assignments()
            .filter(|a| a.match_id != candidate.match_id)
            .filter(|a| a.resource_id == candidate.resource_id || a.shares_participant(candidate))
            .filter(|a| {
                let other = self.span(a);
                separated(span, other, 0) && !separated(span, other, self.grid.rest_slots)
            })
            .collect()
    }
}
