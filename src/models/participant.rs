//! Participant model.
//!
//! A participant is one side of a match: a player, a pair, a team. Its
//! only scheduling-relevant property is an optional availability window.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// A team or player taking part in matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Unique participant identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// No match may start before this time.
    #[serde(default)]
    pub earliest_start: Option<NaiveTime>,
    /// No match may end after this time.
    #[serde(default)]
    pub latest_end: Option<NaiveTime>,
}

impl Participant {
    /// Creates a participant without a time window.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            earliest_start: None,
            latest_end: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the earliest start.
    pub fn with_earliest_start(mut self, t: NaiveTime) -> Self {
        self.earliest_start = Some(t);
        self
    }

    /// Sets the latest end.
    pub fn with_latest_end(mut self, t: NaiveTime) -> Self {
        self.latest_end = Some(t);
        self
    }

    /// Whether a window restricts this participant.
    pub fn has_window(&self) -> bool {
        self.earliest_start.is_some() || self.latest_end.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_builder() {
        let ten = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        let p = Participant::new("T1")
            .with_name("Smash Bros")
            .with_earliest_start(ten);
        assert_eq!(p.id, "T1");
        assert_eq!(p.name, "Smash Bros");
        assert_eq!(p.earliest_start, Some(ten));
        assert!(p.latest_end.is_none());
        assert!(p.has_window());
        assert!(!Participant::new("T2").has_window());
    }

    #[test]
    fn test_participant_deserialize() {
        let p: Participant =
            serde_json::from_str(r#"{"id": "T1", "latest_end": "18:30:00"}"#).unwrap();
        assert_eq!(p.latest_end, NaiveTime::from_hms_opt(18, 30, 0));
        assert!(p.earliest_start.is_none());
    }
}
