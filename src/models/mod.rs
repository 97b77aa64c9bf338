//! Scheduling domain models.
//!
//! Input types (participants, courts, matches) are immutable for the
//! duration of a call; the [`Schedule`] is the only value that grows.
//!
//! # Domain Mappings
//!
//! | court-scheduler | Tennis / padel | Esports | Chess |
//! |-----------------|----------------|---------|-------|
//! | Participant | Player / pair | Team | Player |
//! | Resource | Court | Station | Board |
//! | Match | Match | Series | Game |
//! | Group | Pool / round | Group stage | Round |

mod fixture;
mod participant;
mod resource;
mod schedule;

pub use fixture::Match;
pub use participant::Participant;
pub use resource::Resource;
pub use schedule::{
    Assignment, Lane, ResourceTimetable, Schedule, TimetableEntry, Violation, ViolationType,
};
