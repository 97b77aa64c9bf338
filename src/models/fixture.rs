//! Match model.
//!
//! A match pairs two participants and carries the label of the group
//! (pool or bracket round) it was generated for. Matches are produced
//! outside the engine and handed in as a list.

use serde::{Deserialize, Serialize};

/// A two-party match to be placed on a court.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Stable identifier, unique within one scheduling call. Rematches
    /// between the same two participants get distinct ids.
    pub id: String,
    /// First participant.
    pub participant_a: String,
    /// Second participant.
    pub participant_b: String,
    /// Pool or round label.
    #[serde(default)]
    pub group: String,
}

impl Match {
    /// Creates a match outside any group.
    pub fn new(
        id: impl Into<String>,
        participant_a: impl Into<String>,
        participant_b: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            participant_a: participant_a.into(),
            participant_b: participant_b.into(),
            group: String::new(),
        }
    }

    /// Sets the group label.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Both participants.
    #[inline]
    pub fn participants(&self) -> [&str; 2] {
        [&self.participant_a, &self.participant_b]
    }

    /// Whether `participant` plays in this match.
    #[inline]
    pub fn involves(&self, participant: &str) -> bool {
        self.participant_a == participant || self.participant_b == participant
    }
}
