//! Domain rules carried next to the interval model.
//!
//! The interval model holds what any CP solver understands: one optional
//! interval per (match, court, day) with the rest buffer folded into its
//! length, an `Alternative` per match, and `NoOverlap` per court and per
//! participant. The run penalty and group confinement cannot be written in
//! those terms, so they travel alongside as [`ScheduleRules`].

use std::collections::HashMap;

/// Integer variable holding the run penalty of a solution.
pub const RUN_PENALTY_VAR: &str = "run_penalty";

/// Integer variable holding the smallest start-to-start gap of a solution.
pub const MIN_GAP_VAR: &str = "min_gap";

/// Name of the interval that stands for match `m` wherever it is played.
pub fn main_name(m: usize) -> String {
    format!("match:{m}")
}

/// Name of the optional interval placing match `m` on court `resource` on `day`.
pub fn alternative_name(m: usize, resource: usize, day: usize) -> String {
    format!("match:{m}@{resource}:{day}")
}

/// Run penalty and group confinement, keyed by interval name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleRules {
    /// Start distance below which two matches of a participant are consecutive.
    pub run_threshold: usize,
    /// Slots per match; one penalty point weighs as much.
    pub match_slots: usize,
    /// Main interval names per participant.
    pub participants: Vec<Vec<String>>,
    /// Main interval names per confined group.
    pub groups: Vec<Vec<String>>,
    /// Court index of every alternative interval.
    pub resource_of: HashMap<String, usize>,
}

impl ScheduleRules {
    /// Rules for matches of `match_slots` followed by `rest_slots` of rest.
    pub fn for_grid(match_slots: usize, rest_slots: usize) -> Self {
        Self {
            run_threshold: 2 * (match_slots + rest_slots),
            match_slots,
            ..Self::default()
        }
    }

    /// Adds a participant playing the given matches.
    pub fn add_participant(&mut self, mains: Vec<String>) {
        self.participants.push(mains);
    }

    /// Adds a group whose matches must share one court.
    pub fn add_group(&mut self, mains: Vec<String>) {
        self.groups.push(mains);
    }

    /// Records the court of an alternative.
    pub fn set_resource(&mut self, alternative: impl Into<String>, resource: usize) {
        self.resource_of.insert(alternative.into(), resource);
    }
}
