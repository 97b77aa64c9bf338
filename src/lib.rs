//! Court and time-slot scheduling for two-party matches.
//!
//! Assigns matches to courts over one or more days so that no court or
//! participant is double-booked, rest and availability windows hold, and
//! the day ends as early as possible with as little back-to-back play as
//! possible. An optimizer searches for the best schedule under a time
//! budget; a greedy heuristic takes over when it has none.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Participant`, `Resource`, `Match`,
//!   `Assignment`, `Schedule`, `Violation`
//! - **`time`**: Wall-clock parsing and the discrete `SlotGrid`
//! - **`constraints`**: Hard-feasibility predicates shared by every stage
//! - **`cp`**: `u-metaheur` interval model, objective and parallel branch-and-bound
//! - **`scheduler`**: Entry point, greedy fallback, KPIs
//! - **`validation`**: Input integrity checks (duplicate IDs, dangling refs)
//! - **`verify`**: Post-allocation audit
//! - **`config`** / **`error`**: Settings and the error type
//!
//! # Example
//!
//! ```
//! use court_scheduler::config::SchedulerConfig;
//! use court_scheduler::models::{Match, Participant, Resource};
//! use court_scheduler::scheduler::{schedule_matches, ScheduleRequest};
//! use court_scheduler::time::parse_time;
//!
//! let participants = ["A", "B", "C"].map(Participant::new).to_vec();
//! let courts = vec![Resource::new("C1", parse_time("09:00").unwrap())
//!     .with_closes_at(parse_time("12:00").unwrap())];
//! let matches = vec![
//!     Match::new("M1", "A", "B"),
//!     Match::new("M2", "B", "C"),
//!     Match::new("M3", "A", "C"),
//! ];
//! let request = ScheduleRequest::new(participants, courts, matches)
//!     .with_config(SchedulerConfig::new().with_rest_minutes(10));
//!
//! let report = schedule_matches(&request).unwrap();
//! assert!(report.is_complete());
//! assert!(report.violations.is_empty());
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Laborie et al. (2018), "IBM ILOG CP Optimizer for Scheduling"
//! - Kendall et al. (2010), "Scheduling in sports: An annotated bibliography"

pub mod config;
pub mod constraints;
pub mod cp;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod time;
pub mod validation;
pub mod verify;

pub use config::SchedulerConfig;
pub use error::{Result, ScheduleError};
pub use scheduler::{schedule_matches, ScheduleOutcome, ScheduleReport, ScheduleRequest};
