//! Wall-clock to slot conversion.
//!
//! # Time Model
//! Every wall-clock value is read as minutes after the grid's `day_start`
//! (the earliest court opening), modulo 24 h. A closing or end time at or
//! before the start therefore lands on the next calendar day, which is how
//! courts that close after midnight are expressed.
//!
//! Days are laid end to end on a single axis: the global slot of
//! `(day, local)` is `day * slots_per_day + local`.

mod grid;

pub use grid::SlotGrid;

use chrono::{NaiveTime, TimeDelta, Timelike};

use crate::error::{Result, ScheduleError};
use crate::models::Resource;

/// Minutes in one calendar day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Parses `"HH:MM"` (or `"HH:MM:SS"`).
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    let trimmed = s.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| ScheduleError::Format(s.to_string()))
}

/// Minutes since midnight, seconds dropped.
#[inline]
pub fn minutes_of(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

/// Minutes from `day_start` forward to `t`, in `0..1440`.
#[inline]
pub fn minutes_after(day_start: NaiveTime, t: NaiveTime) -> u32 {
    (minutes_of(t) + MINUTES_PER_DAY - minutes_of(day_start)) % MINUTES_PER_DAY
}

/// Like [`minutes_after`] but for the end of an interval: an end equal to
/// the start means a full day later, never zero.
#[inline]
pub fn end_minutes_after(start: NaiveTime, end: NaiveTime) -> u32 {
    match minutes_after(start, end) {
        0 => MINUTES_PER_DAY,
        m => m,
    }
}

/// Local slot containing `t`.
pub fn slot_of(t: NaiveTime, day_start: NaiveTime, slot_minutes: u32) -> usize {
    (minutes_after(day_start, t) / slot_minutes) as usize
}

/// Wall-clock time at the beginning of a local slot. Wraps past midnight.
pub fn time_of(slot: usize, day_start: NaiveTime, slot_minutes: u32) -> NaiveTime {
    let offset = (slot as i64) * i64::from(slot_minutes);
    day_start + TimeDelta::minutes(offset)
}

/// Derives the daily playing window from the courts.
///
/// Returns `(day_start, day_minutes, slots_per_day)`: the earliest
/// opening, the length of the day in minutes (configured end if given,
/// otherwise the latest closing, otherwise 24 h) and how many whole slots
/// fit in it.
pub fn day_window(
    resources: &[Resource],
    day_end: Option<NaiveTime>,
    slot_minutes: u32,
) -> Result<(NaiveTime, u32, usize)> {
    if slot_minutes == 0 {
        return Err(ScheduleError::config("slot duration must be positive"));
    }
    let day_start = resources
        .iter()
        .map(|r| r.opens_at)
        .min_by_key(|t| minutes_of(*t))
        .ok_or_else(|| ScheduleError::config("at least one resource is required"))?;

    let day_minutes = match day_end {
        Some(end) => end_minutes_after(day_start, end),
        None => resources
            .iter()
            .map(|r| match r.closes_at {
                Some(close) => {
                    minutes_after(day_start, r.opens_at) + end_minutes_after(r.opens_at, close)
                }
                None => MINUTES_PER_DAY,
            })
            .max()
            .unwrap_or(MINUTES_PER_DAY),
    }
    .min(MINUTES_PER_DAY);

    Ok((day_start, day_minutes, (day_minutes / slot_minutes) as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> NaiveTime {
        parse_time(s).unwrap()
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(t("08:00"), NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(t(" 17:45 "), NaiveTime::from_hms_opt(17, 45, 0).unwrap());
        assert_eq!(t("09:30:00"), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_time_rejects_garbage() {
        for bad in ["", "8h", "25:00", "12:61", "noon"] {
            assert_eq!(parse_time(bad), Err(ScheduleError::Format(bad.to_string())));
        }
    }

    #[test]
    fn test_slot_round_trip() {
        let start = t("08:00");
        assert_eq!(slot_of(t("08:00"), start, 5), 0);
        assert_eq!(slot_of(t("09:47"), start, 5), 21);
        assert_eq!(time_of(21, start, 5), t("09:45"));
    }

    #[test]
    fn test_slots_wrap_midnight() {
        let start = t("20:00");
        assert_eq!(slot_of(t("01:00"), start, 15), 20);
        assert_eq!(time_of(20, start, 15), t("01:00"));
    }

    #[test]
    fn test_end_minutes_after() {
        assert_eq!(end_minutes_after(t("08:00"), t("10:00")), 120);
        assert_eq!(end_minutes_after(t("18:00"), t("02:00")), 480);
        assert_eq!(end_minutes_after(t("08:00"), t("08:00")), MINUTES_PER_DAY);
    }

    #[test]
    fn test_day_window_from_closings() {
        let resources = vec![
            Resource::new("C1", t("09:00")).with_closes_at(t("18:00")),
            Resource::new("C2", t("08:00")).with_closes_at(t("12:00")),
        ];
        let (start, minutes, slots) = day_window(&resources, None, 5).unwrap();
        assert_eq!(start, t("08:00"));
        assert_eq!(minutes, 600);
        assert_eq!(slots, 120);
    }

    #[test]
    fn test_day_window_overnight() {
        let resources = vec![Resource::new("C1", t("18:00")).with_closes_at(t("01:00"))];
        let (_, minutes, slots) = day_window(&resources, None, 30).unwrap();
        assert_eq!(minutes, 7 * 60);
        assert_eq!(slots, 14);
    }

    #[test]
    fn test_day_window_configured_end() {
        let resources = vec![Resource::new("C1", t("08:00"))];
        let (_, minutes, slots) = day_window(&resources, Some(t("20:00")), 5).unwrap();
        assert_eq!(minutes, 720);
        assert_eq!(slots, 144);

        let (_, minutes, _) = day_window(&resources, None, 5).unwrap();
        assert_eq!(minutes, MINUTES_PER_DAY);
    }

    #[test]
    fn test_day_window_requires_resources() {
        assert!(matches!(
            day_window(&[], None, 5),
            Err(ScheduleError::Configuration(_))
        ));
    }
}
