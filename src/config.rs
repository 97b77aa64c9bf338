//! Global scheduling configuration.
//!
//! Everything the engine needs besides the roster itself: match length,
//! minimum rest, slot granularity, day horizon and the optimizer budget.
//! Deserializable so the administration layer can keep it next to the
//! tournament data.

use std::thread;

use serde::{Deserialize, Serialize};

use crate::cp::SolverConfig;
use crate::error::{Result, ScheduleError};
use crate::time::parse_time;

/// Parameters shared by both schedulers for one call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Length of one match (minutes).
    pub match_minutes: u32,
    /// Minimum idle time after a match, for its court and its participants (minutes).
    pub rest_minutes: u32,
    /// Width of one slot (minutes).
    pub slot_minutes: u32,
    /// Number of playing days.
    pub days: usize,
    /// Latest end of play per day (`"HH:MM"`). `None` = derived from court hours.
    pub day_end: Option<String>,
    /// Keep every match of a group on one court.
    pub confine_groups: bool,
    /// Let the fallback drop the rest buffer for a confined group when
    /// nothing else fits.
    pub allow_soft_break: bool,
    /// Optimizer budget and parallelism. Given in full when present.
    pub solver: SolverConfig,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            match_minutes: 30,
            rest_minutes: 0,
            slot_minutes: 5,
            days: 1,
            day_end: None,
            confine_groups: false,
            allow_soft_break: true,
            solver: default_solver(),
        }
    }
}

/// One minute of search on up to eight workers.
fn default_solver() -> SolverConfig {
    SolverConfig {
        num_workers: thread::available_parallelism()
            .map(|n| n.get().min(8))
            .unwrap_or(1),
        ..SolverConfig::default()
    }
}

impl SchedulerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the match length.
    pub fn with_match_minutes(mut self, minutes: u32) -> Self {
        self.match_minutes = minutes;
        self
    }

    /// Sets the minimum rest.
    pub fn with_rest_minutes(mut self, minutes: u32) -> Self {
        self.rest_minutes = minutes;
        self
    }

    /// Sets the slot width.
    pub fn with_slot_minutes(mut self, minutes: u32) -> Self {
        self.slot_minutes = minutes;
        self
    }

    /// Sets the number of days.
    pub fn with_days(mut self, days: usize) -> Self {
        self.days = days;
        self
    }

    /// Sets the per-day end limit.
    pub fn with_day_end(mut self, day_end: impl Into<String>) -> Self {
        self.day_end = Some(day_end.into());
        self
    }

    /// Enables or disables group confinement.
    pub fn with_confine_groups(mut self, confine: bool) -> Self {
        self.confine_groups = confine;
        self
    }

    /// Enables or disables the soft rest break in the fallback.
    pub fn with_soft_break(mut self, allow: bool) -> Self {
        self.allow_soft_break = allow;
        self
    }

    /// Sets the optimizer configuration.
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Checks that every duration is positive and the day limit parses.
    pub fn validate(&self) -> Result<()> {
        if self.match_minutes == 0 {
            return Err(ScheduleError::config("match duration must be positive"));
        }
        if self.slot_minutes == 0 {
            return Err(ScheduleError::config("slot duration must be positive"));
        }
        if self.days == 0 {
            return Err(ScheduleError::config("at least one day is required"));
        }
        if let Some(day_end) = &self.day_end {
            parse_time(day_end)?;
        }
        Ok(())
    }
}
