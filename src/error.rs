//! Error types.
//!
//! Only caller mistakes are errors. An optimizer that runs out of time and
//! matches the fallback cannot place are scheduling outcomes, reported
//! through [`ScheduleOutcome`](crate::scheduler::ScheduleOutcome) and warnings.

use thiserror::Error;

/// Hard failures that terminate a scheduling call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// A wall-clock string could not be parsed.
    #[error("invalid time format: '{0}' (expected HH:MM)")]
    Format(String),

    /// The request itself is unusable (no resources, no participants,
    /// non-positive durations, dangling references).
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl ScheduleError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
