//! Post-allocation audit.
//!
//! Re-runs every feasibility predicate against each committed assignment,
//! with the rest of the schedule as context. Findings indicate an engine
//! defect: they are logged and returned, never corrected or raised.

use std::collections::HashSet;

use tracing::{error, warn};

use crate::constraints::{ConstraintChecker, ParticipantClash};
use crate::models::{Match, Schedule, Violation, ViolationType};

/// Audits `schedule` and appends a shortfall warning when matches from
/// `requested` are missing.
pub fn verify(
    schedule: &Schedule,
    checker: &ConstraintChecker<'_>,
    requested: &[Match],
    warnings: &mut Vec<String>,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut seen = HashSet::new();
    let mut reported_pairs = HashSet::new();

    for a in schedule.assignments() {
        if !seen.insert(a.match_id.as_str()) {
            violations.push(Violation::new(
                ViolationType::DuplicateMatch,
                &a.match_id,
                &a.resource_id,
                format!("match {} is scheduled more than once", a.match_id),
            ));
            continue;
        }

        if !checker.within_hours(a) {
            violations.push(Violation::new(
                ViolationType::ResourceHours,
                &a.match_id,
                &a.resource_id,
                format!(
                    "match {} on {} at slot {}-{} is outside opening hours",
                    a.match_id, a.resource_id, a.start_slot, a.end_slot
                ),
            ));
        }

        if let Some(other) = checker.resource_conflict(schedule, a) {
            let key = pair_key(ViolationType::ResourceConflict, &a.match_id, &other.match_id);
            if reported_pairs.insert(key) {
                violations.push(
                    Violation::new(
                        ViolationType::ResourceConflict,
                        &a.match_id,
                        &a.resource_id,
                        format!(
                            "matches {} and {} collide on {} (day {})",
                            a.match_id, other.match_id, a.resource_id, a.day
                        ),
                    )
                    .with_other(&other.match_id),
                );
            }
        }

        if let Some((participant, other, clash)) = checker.participant_conflict(schedule, a) {
            let (rule, what) = match clash {
                ParticipantClash::Overlap => (ViolationType::ParticipantConflict, "overlap"),
                ParticipantClash::Rest => (ViolationType::RestTooShort, "leave too little rest"),
            };
            if reported_pairs.insert(pair_key(rule, &a.match_id, &other.match_id)) {
                violations.push(
                    Violation::new(
                        rule,
                        &a.match_id,
                        participant,
                        format!(
                            "matches {} and {} of {} {} (day {})",
                            a.match_id, other.match_id, participant, what, a.day
                        ),
                    )
                    .with_other(&other.match_id),
                );
            }
        }

        if let Some(participant) = checker.window_conflict(a) {
            violations.push(Violation::new(
                ViolationType::WindowViolation,
                &a.match_id,
                participant,
                format!(
                    "match {} at slot {}-{} is outside the window of {}",
                    a.match_id, a.start_slot, a.end_slot, participant
                ),
            ));
        }
    }

    for v in &violations {
        error!(
            rule = ?v.violation_type,
            match_id = %v.match_id,
            entity = %v.entity_id,
            "{}",
            v.message
        );
    }

    let missing = requested
        .iter()
        .filter(|m| !schedule.contains_match(&m.id))
        .count();
    if missing > 0 {
        warn!(missing, requested = requested.len(), "schedule is incomplete");
        warnings.push(format!(
            "{missing} of {} matches could not be scheduled",
            requested.len()
        ));
    }

    violations
}

fn pair_key(rule: ViolationType, a: &str, b: &str) -> (ViolationType, String, String) {
    if a <= b {
        (rule, a.to_string(), b.to_string())
    } else {
        (rule, b.to_string(), a.to_string())
    }
}
