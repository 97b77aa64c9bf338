//! Input validation for scheduling requests.
//!
//! Checks structural integrity of participants, courts and matches
//! before scheduling. Detects:
//! - Duplicate IDs
//! - Matches referring to participants not on the roster
//! - Matches of a participant against themselves
//! - Participant windows that leave no time at all

use crate::models::{Match, Participant, Resource};
use crate::time::{end_minutes_after, minutes_after};
use std::collections::HashSet;
use std::fmt;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A match references a participant that doesn't exist.
    UnknownParticipant,
    /// Both sides of a match are the same participant.
    SelfMatch,
    /// A participant's latest end is not after their earliest start.
    EmptyWindow,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates the input data for a scheduling request.
///
/// Checks:
/// 1. No duplicate participant, court or match IDs
/// 2. Every match side is a known participant
/// 3. No match pairs a participant with themselves
/// 4. Every participant window is non-empty, read relative to the
///    earliest court opening like the slot grid does
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    participants: &[Participant],
    resources: &[Resource],
    matches: &[Match],
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut resource_ids = HashSet::new();
    for r in resources {
        if !resource_ids.insert(r.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate resource ID: {}", r.id),
            ));
        }
    }

    let mut participant_ids = HashSet::new();
    for p in participants {
        if !participant_ids.insert(p.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate participant ID: {}", p.id),
            ));
        }
    }

    let mut match_ids = HashSet::new();
    for m in matches {
        if !match_ids.insert(m.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate match ID: {}", m.id),
            ));
        }

        for side in m.participants() {
            if !participant_ids.contains(side) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownParticipant,
                    format!("Match '{}' references unknown participant '{}'", m.id, side),
                ));
            }
        }

        if m.participant_a == m.participant_b {
            errors.push(ValidationError::new(
                ValidationErrorKind::SelfMatch,
                format!("Match '{}' pairs '{}' with themselves", m.id, m.participant_a),
            ));
        }
    }

    if let Some(day_start) = resources.iter().map(|r| r.opens_at).min() {
        for p in participants {
            if let (Some(earliest), Some(latest)) = (p.earliest_start, p.latest_end) {
                if minutes_after(day_start, earliest) >= end_minutes_after(day_start, latest) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::EmptyWindow,
                        format!(
                            "Participant '{}' window {} - {} is empty",
                            p.id,
                            earliest.format("%H:%M"),
                            latest.format("%H:%M")
                        ),
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_time;

    fn sample_resources() -> Vec<Resource> {
        vec![
            Resource::new("C1", parse_time("08:00").unwrap()).with_name("Court 1"),
            Resource::new("C2", parse_time("09:00").unwrap()).with_name("Court 2"),
        ]
    }

    fn sample_participants() -> Vec<Participant> {
        ["A", "B", "C"].into_iter().map(Participant::new).collect()
    }

    fn sample_matches() -> Vec<Match> {
        vec![
            Match::new("M1", "A", "B").with_group("P1"),
            Match::new("M2", "B", "C").with_group("P1"),
        ]
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_input(&sample_participants(), &sample_resources(), &sample_matches()).is_ok());
    }

    #[test]
    fn test_duplicate_match_id() {
        let matches = vec![Match::new("M1", "A", "B"), Match::new("M1", "B", "C")];
        let errors =
            validate_input(&sample_participants(), &sample_resources(), &matches).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("match")));
    }

    #[test]
    fn test_duplicate_resource_id() {
        let resources = vec![
            Resource::new("C1", parse_time("08:00").unwrap()),
            Resource::new("C1", parse_time("09:00").unwrap()),
        ];
        let errors =
            validate_input(&sample_participants(), &resources, &sample_matches()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("resource")));
    }

    #[test]
    fn test_unknown_participant() {
        let matches = vec![Match::new("M1", "A", "Z")];
        let errors =
            validate_input(&sample_participants(), &sample_resources(), &matches).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::UnknownParticipant);
        assert!(errors[0].message.contains("'Z'"));
    }

    #[test]
    fn test_self_match() {
        let matches = vec![Match::new("M1", "A", "A")];
        let errors =
            validate_input(&sample_participants(), &sample_resources(), &matches).unwrap_err();
        assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::SelfMatch));
    }

    #[test]
    fn test_empty_window() {
        let participants = vec![
            Participant::new("A")
                .with_earliest_start(parse_time("12:00").unwrap())
                .with_latest_end(parse_time("11:00").unwrap()),
            Participant::new("B"),
        ];
        let matches = vec![Match::new("M1", "A", "B")];
        let errors = validate_input(&participants, &sample_resources(), &matches).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::EmptyWindow);
    }

    #[test]
    fn test_window_past_midnight_is_valid() {
        let resources = vec![Resource::new("C1", parse_time("18:00").unwrap())];
        let participants = vec![
            Participant::new("A")
                .with_earliest_start(parse_time("22:00").unwrap())
                .with_latest_end(parse_time("01:00").unwrap()),
            Participant::new("B"),
        ];
        let matches = vec![Match::new("M1", "A", "B")];
        assert!(validate_input(&participants, &resources, &matches).is_ok());
    }

    #[test]
    fn test_multiple_errors() {
        let participants = vec![Participant::new("A"), Participant::new("A")];
        let matches = vec![Match::new("M1", "A", "A"), Match::new("M2", "A", "X")];
        let errors = validate_input(&participants, &sample_resources(), &matches).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
