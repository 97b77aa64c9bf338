//! Scheduling entry point, greedy fallback and KPI evaluation.
//!
//! # Flow
//!
//! [`schedule_matches`] validates a [`ScheduleRequest`], builds the slot
//! grid and runs the optimizer. When the optimizer has no complete
//! schedule within its budget, [`GreedyScheduler`] places what it can.
//! The verifier audits the result either way.
//!
//! # Algorithm
//!
//! `GreedyScheduler` is a single-pass, input-order heuristic that picks
//! the earliest candidate giving the shortest consecutive run. It never
//! backtracks, so it is fast but not optimal.
//!
//! # KPI
//!
//! `ScheduleKpi` computes tournament metrics: completion, makespan,
//! consecutive play, shortest rest and court utilization.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3-4
//! - Baker & Trietsch (2019), "Principles of Sequencing and Scheduling"

mod engine;
mod greedy;
mod kpi;

pub use engine::{schedule_matches, schedule_with, ScheduleOutcome, ScheduleReport, ScheduleRequest};
pub use greedy::{run_length, GreedyScheduler};
pub use kpi::ScheduleKpi;
