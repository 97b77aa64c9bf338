//! Optimizing court assignment.
//!
//! Translates matches, courts and participant windows into a
//! [`u_metaheur::cp::CpModel`]: one optional interval per (match, court,
//! day) on the real-time timeline, an `Alternative` per match and a
//! `NoOverlap` per court and per participant. Every interval is a match
//! followed by its rest buffer, so plain non-overlap already keeps the
//! minimum rest. The run penalty and group confinement travel as
//! [`ScheduleRules`] to the [`BranchAndBoundSolver`].
//!
//! A solve that runs out of time or proves infeasibility returns no
//! assignments; the caller falls back to the greedy scheduler.
//!
//! # Reference
//! - Laborie et al. (2018), "IBM ILOG CP Optimizer for Scheduling"
//! - Baptiste et al. (2001), "Constraint-Based Scheduling"

mod objective;
mod rules;
mod solver;

pub use objective::{
    consecutive, evaluate, min_gap, pair_count, run_penalty, triple_count, ObjectiveValue,
    ObjectiveWeights, TRIPLE_WEIGHT,
};
pub use rules::{alternative_name, main_name, ScheduleRules, MIN_GAP_VAR, RUN_PENALTY_VAR};
pub use solver::{status_label, BranchAndBoundSolver};
pub use u_metaheur::cp::{CpModel, CpSolution, CpSolver, SolverConfig, SolverStatus};

use std::collections::HashMap;

use u_metaheur::cp::{Constraint, IntVar, IntervalVar, Objective};

use crate::constraints::ConstraintChecker;
use crate::models::{Assignment, Match, Resource};

/// Where one match may be played: court, day and local start range.
#[derive(Debug, Clone, Copy)]
struct Slotting {
    resource: usize,
    day: usize,
    start_min: usize,
    start_max: usize,
}

/// Builds a CP model from scheduling domain objects.
///
/// # Example
/// ```
/// use court_scheduler::config::SchedulerConfig;
/// use court_scheduler::constraints::ConstraintChecker;
/// use court_scheduler::cp::{ScheduleCpBuilder, SolverConfig};
/// use court_scheduler::models::{Match, Participant, Resource};
/// use court_scheduler::time::{parse_time, SlotGrid};
///
/// let resources = vec![Resource::new("C1", parse_time("08:00").unwrap())];
/// let participants = vec![Participant::new("A"), Participant::new("B")];
/// let matches = vec![Match::new("M1", "A", "B")];
/// let grid = SlotGrid::new(&resources, &SchedulerConfig::default()).unwrap();
/// let checker = ConstraintChecker::new(&grid, &resources, &participants);
///
/// let builder = ScheduleCpBuilder::new(&checker, &resources, &matches);
/// let (assignments, solution) = builder.solve(&builder.solver(), &SolverConfig::default());
/// assert!(solution.is_solution_found());
/// assert_eq!(assignments[0].start_slot, 0);
/// ```
pub struct ScheduleCpBuilder<'a> {
    checker: &'a ConstraintChecker<'a>,
    resources: &'a [Resource],
    matches: &'a [Match],
    confine_groups: bool,
}

impl<'a> ScheduleCpBuilder<'a> {
    /// Creates a new CP builder.
    pub fn new(
        checker: &'a ConstraintChecker<'a>,
        resources: &'a [Resource],
        matches: &'a [Match],
    ) -> Self {
        Self {
            checker,
            resources,
            matches,
            confine_groups: false,
        }
    }

    /// Keeps every match of a (non-empty) group on one court.
    pub fn with_group_confinement(mut self, confine: bool) -> Self {
        self.confine_groups = confine;
        self
    }

    /// Model horizon: the end of the last day plus one rest buffer.
    fn horizon(&self) -> usize {
        let grid = self.checker.grid();
        grid.timeline_horizon() + grid.rest_slots
    }

    /// Feasible (court, day, start range) triples per match, court-major.
    fn slottings(&self) -> Vec<Vec<Slotting>> {
        let grid = self.checker.grid();
        let hours: Vec<(usize, usize)> = self
            .resources
            .iter()
            .map(|r| self.checker.resource_hours(&r.id).unwrap_or((0, 0)))
            .collect();

        self.matches
            .iter()
            .map(|m| {
                let (earliest_a, latest_a) = self.checker.participant_window(&m.participant_a);
                let (earliest_b, latest_b) = self.checker.participant_window(&m.participant_b);
                let mut out = Vec::new();
                for (resource, &(open, close)) in hours.iter().enumerate() {
                    let start_min = open.max(earliest_a).max(earliest_b);
                    let end_max = close.min(latest_a).min(latest_b);
                    let Some(start_max) = end_max
                        .checked_sub(grid.match_slots)
                        .filter(|&s| s >= start_min)
                    else {
                        continue;
                    };
                    for day in 0..grid.days {
                        out.push(Slotting {
                            resource,
                            day,
                            start_min,
                            start_max,
                        });
                    }
                }
                out
            })
            .collect()
    }

    /// Main interval names per key, keyed in order of first appearance.
    fn lanes(&self, key: impl Fn(&'a Match) -> Vec<&'a str>) -> Vec<Vec<String>> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut lanes: Vec<Vec<String>> = Vec::new();
        for (i, m) in self.matches.iter().enumerate() {
            for k in key(m) {
                let next = lanes.len();
                let lane = *index.entry(k).or_insert(next);
                if lane == next {
                    lanes.push(Vec::new());
                }
                lanes[lane].push(main_name(i));
            }
        }
        lanes
    }

    fn participant_lanes(&self) -> Vec<Vec<String>> {
        self.lanes(|m| m.participants().to_vec())
    }

    fn group_lanes(&self) -> Vec<Vec<String>> {
        if !self.confine_groups {
            return Vec::new();
        }
        self.lanes(|m| {
            if m.group.is_empty() {
                Vec::new()
            } else {
                vec![m.group.as_str()]
            }
        })
    }

    /// Builds the model.
    ///
    /// Creates:
    /// - A main `IntervalVar` per match, tied by an `Alternative` to one
    ///   optional interval per (court, day) whose start domain already
    ///   respects court hours and both participants' windows
    /// - `NoOverlap` over each court's alternatives, across all days
    /// - `NoOverlap` over each participant's main intervals (if plays > 1)
    /// - Objective: makespan, then run penalty, then rest headroom
    pub fn build(&self) -> CpModel {
        let grid = self.checker.grid();
        let duration = (grid.match_slots + grid.rest_slots) as i64;
        let rest = grid.rest_slots as i64;
        let horizon = self.horizon() as i64;
        let mut model = CpModel::new("court-schedule", horizon);
        let mut court_lanes: Vec<Vec<String>> = vec![Vec::new(); self.resources.len()];

        for (m, slottings) in self.slottings().into_iter().enumerate() {
            let main = main_name(m);
            model.add_interval(IntervalVar::new(
                &main,
                0,
                (horizon - duration).max(0),
                duration,
                horizon,
            ));

            let mut alternatives = Vec::with_capacity(slottings.len());
            for s in slottings {
                let name = alternative_name(m, s.resource, s.day);
                let start_min = grid.timeline(s.day, s.start_min) as i64;
                let start_max = grid.timeline(s.day, s.start_max) as i64;
                model.add_interval(
                    IntervalVar::new(
                        &name,
                        start_min,
                        start_max,
                        duration,
                        start_max + grid.match_slots as i64 + rest,
                    )
                    .as_optional(format!("{name}?")),
                );
                court_lanes[s.resource].push(name.clone());
                alternatives.push(name);
            }
            model.add_constraint(Constraint::Alternative { main, alternatives });
        }

        for lane in court_lanes.into_iter().filter(|l| l.len() > 1) {
            model.add_no_overlap(lane);
        }
        for lane in self.participant_lanes().into_iter().filter(|l| l.len() > 1) {
            model.add_no_overlap(lane);
        }

        model.add_int_var(IntVar::new(RUN_PENALTY_VAR, 0, i64::MAX));
        model.add_int_var(IntVar::new(MIN_GAP_VAR, 0, horizon));
        model.set_objective(Objective::Hierarchical {
            objectives: vec![
                Objective::MinimizeMaxEnd,
                Objective::Minimize {
                    terms: vec![(RUN_PENALTY_VAR.to_string(), 1.0)],
                },
                Objective::Maximize {
                    terms: vec![(MIN_GAP_VAR.to_string(), 1.0)],
                },
            ],
        });

        model
    }

    /// Rules the interval model cannot express, for the same matches.
    pub fn rules(&self) -> ScheduleRules {
        let grid = self.checker.grid();
        let mut rules = ScheduleRules::for_grid(grid.match_slots, grid.rest_slots);
        for lane in self.participant_lanes() {
            rules.add_participant(lane);
        }
        for lane in self.group_lanes() {
            rules.add_group(lane);
        }
        for (m, slottings) in self.slottings().into_iter().enumerate() {
            for s in slottings {
                rules.set_resource(alternative_name(m, s.resource, s.day), s.resource);
            }
        }
        rules
    }

    /// The built-in optimizer, loaded with this builder's rules.
    pub fn solver(&self) -> BranchAndBoundSolver {
        BranchAndBoundSolver::new(self.rules())
    }

    /// Builds and solves the model, returning the decoded assignments.
    pub fn solve<S: CpSolver>(
        &self,
        solver: &S,
        config: &SolverConfig,
    ) -> (Vec<Assignment>, CpSolution) {
        let model = self.build();
        let solution = solver.solve(&model, config);
        let assignments = self.decode_solution(&solution);
        (assignments, solution)
    }

    /// Decodes a CP solution into assignments. Empty if none was found.
    ///
    /// A match takes its first present alternative; one with none, or with
    /// a start off its day, is left out.
    fn decode_solution(&self, solution: &CpSolution) -> Vec<Assignment> {
        if !solution.is_solution_found() {
            return Vec::new();
        }
        let grid = self.checker.grid();

        self.matches
            .iter()
            .zip(self.slottings())
            .enumerate()
            .filter_map(|(m, (mat, slottings))| {
                slottings.into_iter().find_map(|s| {
                    let iv = solution
                        .intervals
                        .get(&alternative_name(m, s.resource, s.day))
                        .filter(|iv| iv.is_present)?;
                    let local = usize::try_from(iv.start)
                        .ok()?
                        .checked_sub(grid.timeline(s.day, 0))?;
                    Some(Assignment::new(
                        mat,
                        &self.resources[s.resource].id,
                        s.day,
                        local,
                        local + grid.match_slots,
                    ))
                })
            })
            .collect()
    }
}
