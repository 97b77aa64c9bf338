//! Schedule (solution) model.
//!
//! A schedule holds one lane per court with that court's assignments in
//! time order. It is the only state mutated during a scheduling call and
//! assignments are never removed once added.

use serde::{Deserialize, Serialize};

use super::{Match, Resource};
use crate::time::SlotGrid;

/// A match placed on a court at a slot range.
///
/// Slots are local to `day`; `[start_slot, end_slot)` is the match itself,
/// the rest buffer after it is not included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Assigned match ID.
    pub match_id: String,
    /// Both participants (denormalized for conflict checks).
    pub participants: [String; 2],
    /// Group label of the match.
    pub group: String,
    /// Assigned court ID.
    pub resource_id: String,
    /// Day index.
    pub day: usize,
    /// First occupied local slot.
    pub start_slot: usize,
    /// Local slot right after the match.
    pub end_slot: usize,
    /// Placed with the rest buffer waived.
    pub rest_relaxed: bool,
    /// Matches this placement sits inside the rest buffer of. Rest is waived
    /// for these pairs only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rest_waived_with: Vec<String>,
}

impl Assignment {
    /// Creates an assignment for `m`.
    pub fn new(
        m: &Match,
        resource_id: impl Into<String>,
        day: usize,
        start_slot: usize,
        end_slot: usize,
    ) -> Self {
        Self {
            match_id: m.id.clone(),
            participants: [m.participant_a.clone(), m.participant_b.clone()],
            group: m.group.clone(),
            resource_id: resource_id.into(),
            day,
            start_slot,
            end_slot,
            rest_relaxed: false,
            rest_waived_with: Vec::new(),
        }
    }

    /// Marks the assignment as placed without rest buffer next to `others`.
    pub fn with_rest_waived(mut self, others: Vec<String>) -> Self {
        self.rest_relaxed = !others.is_empty();
        self.rest_waived_with = others;
        self
    }

    /// Whether this placement waived the rest buffer towards `match_id`.
    #[inline]
    pub fn waives_rest_with(&self, match_id: &str) -> bool {
        self.rest_waived_with.iter().any(|id| id == match_id)
    }

    /// Whether `participant` plays in this assignment.
    #[inline]
    pub fn involves(&self, participant: &str) -> bool {
        self.participants.iter().any(|p| p == participant)
    }

    /// Whether the two assignments share a participant.
    pub fn shares_participant(&self, other: &Assignment) -> bool {
        self.participants.iter().any(|p| other.involves(p))
    }

    /// Length in slots.
    #[inline]
    pub fn duration_slots(&self) -> usize {
        self.end_slot - self.start_slot
    }
}

/// The assignments of one court, sorted by `(day, start_slot)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lane {
    /// Court ID.
    pub resource_id: String,
    /// Assignments in time order.
    pub assignments: Vec<Assignment>,
}

/// Court-indexed schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    lanes: Vec<Lane>,
}

/// One row of the rendered timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub day: usize,
    /// `"HH:MM"`.
    pub start_time: String,
    /// `"HH:MM"`.
    pub end_time: String,
    pub participants: [String; 2],
    pub match_id: String,
    pub group: String,
}

/// Rendered timetable of one court.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTimetable {
    pub resource_id: String,
    pub entries: Vec<TimetableEntry>,
}

/// An invariant violation found by the verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule that was broken.
    pub violation_type: ViolationType,
    /// Match being audited.
    pub match_id: String,
    /// Conflicting match, if the rule involves two.
    pub other_match_id: Option<String>,
    /// Court or participant concerned.
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
}

/// Classification of verifier findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationType {
    /// Match lies outside its court's opening hours.
    ResourceHours,
    /// Two matches (with rest buffer) overlap on one court.
    ResourceConflict,
    /// A participant plays two overlapping matches.
    ParticipantConflict,
    /// A participant gets less than the minimum rest between matches.
    RestTooShort,
    /// Match lies outside a participant's window.
    WindowViolation,
    /// A match id appears more than once.
    DuplicateMatch,
}

impl Violation {
    pub fn new(
        violation_type: ViolationType,
        match_id: impl Into<String>,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            match_id: match_id.into(),
            other_match_id: None,
            entity_id: entity_id.into(),
            message: message.into(),
        }
    }

    /// Sets the conflicting match.
    pub fn with_other(mut self, other_match_id: impl Into<String>) -> Self {
        self.other_match_id = Some(other_match_id.into());
        self
    }
}

impl Schedule {
    /// Creates an empty schedule without lanes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty schedule with one lane per court, in input order.
    pub fn for_resources(resources: &[Resource]) -> Self {
        Self {
            lanes: resources
                .iter()
                .map(|r| Lane {
                    resource_id: r.id.clone(),
                    assignments: Vec::new(),
                })
                .collect(),
        }
    }

    /// Adds an assignment, keeping its lane sorted by `(day, start_slot)`.
    pub fn add_assignment(&mut self, assignment: Assignment) {
        let idx = match self
            .lanes
            .iter()
            .position(|l| l.resource_id == assignment.resource_id)
        {
            Some(idx) => idx,
            None => {
                self.lanes.push(Lane {
                    resource_id: assignment.resource_id.clone(),
                    assignments: Vec::new(),
                });
                self.lanes.len() - 1
            }
        };
        let lane = &mut self.lanes[idx].assignments;
        let key = (assignment.day, assignment.start_slot);
        let pos = lane.partition_point(|a| (a.day, a.start_slot) <= key);
        lane.insert(pos, assignment);
    }

    /// All lanes in court order.
    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    /// Assignments of one court (empty if unknown).
    pub fn assignments_for_resource(&self, resource_id: &str) -> &[Assignment] {
        self.lanes
            .iter()
            .find(|l| l.resource_id == resource_id)
            .map(|l| l.assignments.as_slice())
            .unwrap_or(&[])
    }

    /// Every assignment, lane by lane.
    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.lanes.iter().flat_map(|l| l.assignments.iter())
    }

    /// Assignments involving `participant`, sorted by `(day, start_slot)`.
    pub fn assignments_for_participant(&self, participant: &str) -> Vec<&Assignment> {
        let mut found: Vec<&Assignment> = self
            .assignments()
            .filter(|a| a.involves(participant))
            .collect();
        found.sort_by_key(|a| (a.day, a.start_slot));
        found
    }

    /// Finds the assignment for a given match.
    pub fn assignment_for_match(&self, match_id: &str) -> Option<&Assignment> {
        self.assignments().find(|a| a.match_id == match_id)
    }

    /// Whether the match has been placed.
    pub fn contains_match(&self, match_id: &str) -> bool {
        self.assignment_for_match(match_id).is_some()
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.lanes.iter().map(|l| l.assignments.len()).sum()
    }

    /// Latest end across all assignments, as a global slot.
    pub fn makespan(&self, grid: &SlotGrid) -> usize {
        self.assignments()
            .map(|a| grid.global(a.day, a.end_slot))
            .max()
            .unwrap_or(0)
    }

    /// Read-only projection for the presentation layer.
    pub fn timetable(&self, grid: &SlotGrid) -> Vec<ResourceTimetable> {
        self.lanes
            .iter()
            .map(|lane| ResourceTimetable {
                resource_id: lane.resource_id.clone(),
                entries: lane
                    .assignments
                    .iter()
                    .map(|a| TimetableEntry {
                        day: a.day,
                        start_time: grid.label(a.start_slot),
                        end_time: grid.label(a.end_slot),
                        participants: a.participants.clone(),
                        match_id: a.match_id.clone(),
                        group: a.group.clone(),
                    })
                    .collect(),
            })
            .collect()
    }
}
