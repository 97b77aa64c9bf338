//! The discrete slot grid for one scheduling call.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::{day_window, end_minutes_after, minutes_after, parse_time, time_of, MINUTES_PER_DAY};
use crate::config::SchedulerConfig;
use crate::error::Result;
use crate::models::{Participant, Resource};

/// Uniform slot grid anchored at the earliest court opening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotGrid {
    /// Wall-clock time of local slot 0.
    pub day_start: NaiveTime,
    /// Length of one playing day (minutes).
    pub day_minutes: u32,
    /// Width of one slot (minutes).
    pub slot_minutes: u32,
    /// Number of playing days.
    pub days: usize,
    /// Whole slots per day.
    pub slots_per_day: usize,
    /// Slots occupied by one match.
    pub match_slots: usize,
    /// Slots of rest reserved after a match.
    pub rest_slots: usize,
}

impl SlotGrid {
    /// Builds the grid from the courts and the configuration.
    pub fn new(resources: &[Resource], config: &SchedulerConfig) -> Result<Self> {
        config.validate()?;
        let day_end = config.day_end.as_deref().map(parse_time).transpose()?;
        let (day_start, day_minutes, slots_per_day) =
            day_window(resources, day_end, config.slot_minutes)?;

        Ok(Self {
            day_start,
            day_minutes,
            slot_minutes: config.slot_minutes,
            days: config.days,
            slots_per_day,
            match_slots: config.match_minutes.div_ceil(config.slot_minutes) as usize,
            rest_slots: config.rest_minutes.div_ceil(config.slot_minutes) as usize,
        })
    }

    /// Total slots across all days.
    #[inline]
    pub fn horizon(&self) -> usize {
        self.days * self.slots_per_day
    }

    /// Global slot index of a local slot on a given day.
    #[inline]
    pub fn global(&self, day: usize, local: usize) -> usize {
        day * self.slots_per_day + local
    }

    /// Splits a global slot into `(day, local)`.
    #[inline]
    pub fn split(&self, global: usize) -> (usize, usize) {
        if self.slots_per_day == 0 {
            return (0, global);
        }
        (global / self.slots_per_day, global % self.slots_per_day)
    }

    /// Slots in 24 hours: the distance between local slot 0 of two
    /// successive days.
    #[inline]
    pub fn day_stride(&self) -> usize {
        (MINUTES_PER_DAY / self.slot_minutes) as usize
    }

    /// Position of a local slot on the continuous timeline.
    ///
    /// Unlike [`global`](Self::global), the overnight break between two
    /// playing days keeps its real length, so rest and run distances can be
    /// measured across midnight.
    #[inline]
    pub fn timeline(&self, day: usize, local: usize) -> usize {
        day * self.day_stride() + local
    }

    /// Timeline position right after the last slot of the last day.
    pub fn timeline_horizon(&self) -> usize {
        self.timeline(self.days.saturating_sub(1), self.slots_per_day)
    }

    /// Start-to-start distance below which two matches count as consecutive:
    /// no third match (with its rest) fits between them.
    #[inline]
    pub fn run_threshold(&self) -> usize {
        2 * (self.match_slots + self.rest_slots)
    }

    /// Wall-clock time at the beginning of a local slot.
    pub fn time_of(&self, local: usize) -> NaiveTime {
        time_of(local, self.day_start, self.slot_minutes)
    }

    /// `"HH:MM"` label for a local slot.
    pub fn label(&self, local: usize) -> String {
        self.time_of(local).format("%H:%M").to_string()
    }

    /// First local slot starting at or after `t`.
    pub fn start_bound(&self, t: NaiveTime) -> usize {
        minutes_after(self.day_start, t).div_ceil(self.slot_minutes) as usize
    }

    /// Last local slot boundary at or before `t`, read as an end time.
    pub fn end_bound(&self, t: NaiveTime) -> usize {
        (end_minutes_after(self.day_start, t) / self.slot_minutes) as usize
    }

    /// Local `[open, close)` slot range of a court, clipped to the day.
    pub fn resource_hours(&self, resource: &Resource) -> (usize, usize) {
        let open = self.start_bound(resource.opens_at);
        let close = match resource.closes_at {
            Some(close) => {
                let minutes = minutes_after(self.day_start, resource.opens_at)
                    + end_minutes_after(resource.opens_at, close);
                (minutes / self.slot_minutes) as usize
            }
            None => self.slots_per_day,
        };
        (open, close.min(self.slots_per_day))
    }

    /// Local `[earliest_start, latest_end]` slot window of a participant.
    pub fn participant_window(&self, participant: &Participant) -> (usize, usize) {
        let earliest = participant
            .earliest_start
            .map(|t| self.start_bound(t))
            .unwrap_or(0);
        let latest = participant
            .latest_end
            .map(|t| self.end_bound(t))
            .unwrap_or(self.slots_per_day)
            .min(self.slots_per_day);
        (earliest, latest)
    }
}
