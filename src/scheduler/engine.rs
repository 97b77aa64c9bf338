//! One scheduling call, end to end.
//!
//! Validates the request, derives the slot grid, asks the optimizer for a
//! complete schedule and falls back to the greedy scheduler when it has
//! none. The result is audited before it is returned.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{GreedyScheduler, ScheduleKpi};
use crate::config::SchedulerConfig;
use crate::constraints::ConstraintChecker;
use crate::cp::{status_label, CpSolution, CpSolver, ScheduleCpBuilder, SolverConfig, SolverStatus};
use crate::error::{Result, ScheduleError};
use crate::models::{
    Assignment, Match, Participant, Resource, ResourceTimetable, Schedule, Violation,
};
use crate::time::SlotGrid;
use crate::validation::validate_input;
use crate::verify::verify;

/// Input container for one scheduling call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Roster, with optional time windows.
    pub participants: Vec<Participant>,
    /// Courts.
    pub resources: Vec<Resource>,
    /// Matches to place.
    pub matches: Vec<Match>,
    /// Durations, grid and solver settings.
    #[serde(default)]
    pub config: SchedulerConfig,
}

impl ScheduleRequest {
    /// Creates a request with the default configuration.
    pub fn new(participants: Vec<Participant>, resources: Vec<Resource>, matches: Vec<Match>) -> Self {
        Self {
            participants,
            resources,
            matches,
            config: SchedulerConfig::default(),
        }
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }
}

/// How the schedule was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleOutcome {
    /// The optimizer placed every match.
    Scheduled,
    /// The optimizer had no schedule; the greedy scheduler placed every match.
    Fallback,
    /// The greedy scheduler left some matches out.
    PartiallyScheduled {
        /// IDs of the matches that were not placed, in input order.
        unscheduled: Vec<String>,
    },
}

/// Everything a scheduling call returns.
#[derive(Debug, Clone)]
pub struct ScheduleReport {
    /// Committed assignments.
    pub schedule: Schedule,
    /// How they were produced.
    pub outcome: ScheduleOutcome,
    /// Human-readable warnings, in the order they were raised.
    pub warnings: Vec<String>,
    /// Verifier findings. Empty unless the engine has a defect.
    pub violations: Vec<Violation>,
    /// Number of matches requested.
    pub requested: usize,
    /// What the optimizer reported.
    pub optimizer_status: SolverStatus,
    /// Optimizer objective, if its schedule was kept.
    pub objective: Option<f64>,
    /// Optimizer wall-clock time, measured around the solve.
    pub elapsed: Duration,
    /// The grid the schedule lives on.
    pub grid: SlotGrid,
}

impl ScheduleReport {
    /// Number of placed matches.
    pub fn scheduled_count(&self) -> usize {
        self.schedule.assignment_count()
    }

    /// Number of requested matches not placed.
    pub fn unscheduled_count(&self) -> usize {
        self.requested.saturating_sub(self.scheduled_count())
    }

    /// Whether every requested match was placed.
    pub fn is_complete(&self) -> bool {
        self.unscheduled_count() == 0
    }

    /// Court-indexed, time-sorted projection.
    pub fn timetable(&self) -> Vec<ResourceTimetable> {
        self.schedule.timetable(&self.grid)
    }

    /// Quality indicators for this schedule.
    pub fn kpi(&self, request: &ScheduleRequest) -> ScheduleKpi {
        ScheduleKpi::calculate(&self.schedule, &self.grid, &request.resources, &request.matches)
    }
}

/// Schedules a request with the built-in branch-and-bound optimizer.
///
/// # Errors
/// [`ScheduleError::Format`] for an unparsable time,
/// [`ScheduleError::Configuration`] for an unusable request. Optimizer
/// failure and unplaced matches are not errors.
///
/// # Example
///
/// ```
/// use court_scheduler::models::{Match, Participant, Resource};
/// use court_scheduler::scheduler::{schedule_matches, ScheduleOutcome, ScheduleRequest};
/// use court_scheduler::time::parse_time;
///
/// let request = ScheduleRequest::new(
///     vec![Participant::new("A"), Participant::new("B")],
///     vec![Resource::new("C1", parse_time("08:00").unwrap())],
///     vec![Match::new("M1", "A", "B")],
/// );
/// let report = schedule_matches(&request).unwrap();
/// assert_eq!(report.outcome, ScheduleOutcome::Scheduled);
/// assert_eq!(report.timetable()[0].entries[0].start_time, "08:00");
/// ```
pub fn schedule_matches(request: &ScheduleRequest) -> Result<ScheduleReport> {
    run(request, |builder, config| builder.solve(&builder.solver(), config))
}

/// Schedules a request with the given optimizer.
///
/// The solver sees the interval model only; rules outside it (run
/// penalty, group confinement) are up to the solver. Whatever it returns
/// is checked against every hard constraint before it is accepted.
pub fn schedule_with<S: CpSolver>(request: &ScheduleRequest, solver: &S) -> Result<ScheduleReport> {
    run(request, |builder, config| builder.solve(solver, config))
}

fn run<F>(request: &ScheduleRequest, solve: F) -> Result<ScheduleReport>
where
    F: FnOnce(&ScheduleCpBuilder<'_>, &SolverConfig) -> (Vec<Assignment>, CpSolution),
{
    let config = &request.config;
    config.validate()?;
    if request.resources.is_empty() {
        return Err(ScheduleError::config("no resources configured"));
    }
    if request.participants.is_empty() {
        return Err(ScheduleError::config("no participants configured"));
    }
    validate_input(&request.participants, &request.resources, &request.matches).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        ScheduleError::Configuration(messages.join("; "))
    })?;

    let grid = SlotGrid::new(&request.resources, config)?;
    info!(
        day_start = %grid.label(0),
        slots_per_day = grid.slots_per_day,
        days = grid.days,
        matches = request.matches.len(),
        resources = request.resources.len(),
        "slot grid ready"
    );

    let checker = ConstraintChecker::new(&grid, &request.resources, &request.participants);
    let mut warnings = Vec::new();

    let started = Instant::now();
    let builder = ScheduleCpBuilder::new(&checker, &request.resources, &request.matches)
        .with_group_confinement(config.confine_groups);
    let (assignments, solution) = solve(&builder, &config.solver);
    let elapsed = started.elapsed();
    info!(
        status = status_label(solution.status),
        objective = ?solution.objective_value,
        nodes = solution.num_nodes,
        elapsed_ms = elapsed.as_millis() as u64,
        "optimizer finished"
    );

    let accepted = if solution.is_solution_found() && assignments.len() == request.matches.len() {
        let candidate = commit(&request.resources, assignments);
        let feasible = candidate.assignments().all(|a| checker.is_feasible(&candidate, a));
        if !feasible {
            warn!("optimizer schedule breaks a hard constraint, falling back to greedy");
            warnings.push(
                "Optimizer schedule failed the feasibility check; fell back to greedy scheduling"
                    .to_string(),
            );
        }
        feasible.then_some(candidate)
    } else {
        let label = status_label(solution.status);
        warn!(status = label, "optimizer has no schedule, falling back to greedy");
        warnings.push(format!("Optimizer returned {label}; fell back to greedy scheduling"));
        None
    };

    let (schedule, outcome) = match accepted {
        Some(schedule) => (schedule, ScheduleOutcome::Scheduled),
        None => {
            let mut schedule = Schedule::for_resources(&request.resources);
            let unscheduled = GreedyScheduler::new(&checker, &request.resources)
                .with_group_confinement(config.confine_groups)
                .with_soft_break(config.allow_soft_break)
                .schedule(&request.matches, &mut schedule, &mut warnings);
            let outcome = if unscheduled.is_empty() {
                ScheduleOutcome::Fallback
            } else {
                ScheduleOutcome::PartiallyScheduled { unscheduled }
            };
            (schedule, outcome)
        }
    };

    let violations = verify(&schedule, &checker, &request.matches, &mut warnings);
    let optimizer_status = solution.status;
    let objective = solution.objective_value.filter(|_| outcome == ScheduleOutcome::Scheduled);

    Ok(ScheduleReport {
        schedule,
        outcome,
        warnings,
        violations,
        requested: request.matches.len(),
        optimizer_status,
        objective,
        elapsed,
        grid,
    })
}

fn commit(resources: &[Resource], assignments: Vec<Assignment>) -> Schedule {
    let mut schedule = Schedule::for_resources(resources);
    for assignment in assignments {
        schedule.add_assignment(assignment);
    }
    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_time;
    use std::collections::BTreeSet;
    use tracing_test::traced_test;
    use crate::cp::{BranchAndBoundSolver, CpModel};
    use u_metaheur::cp::{Constraint, IntervalSolution};

    fn t(s: &str) -> chrono::NaiveTime {
        parse_time(s).unwrap()
    }

    fn roster(ids: &[&str]) -> Vec<Participant> {
        ids.iter().map(|id| Participant::new(*id)).collect()
    }

    /// Round robin within each pool, pool by pool.
    fn round_robin(pools: &[(&str, &[&str])]) -> Vec<Match> {
        let mut matches = Vec::new();
        for (group, members) in pools {
            for i in 0..members.len() {
                for j in i + 1..members.len() {
                    let id = format!("{group}-{}{}", members[i], members[j]);
                    matches.push(Match::new(id, members[i], members[j]).with_group(*group));
                }
            }
        }
        matches
    }

    fn solver(secs: i64) -> SolverConfig {
        SolverConfig {
            time_limit_ms: secs * 1_000,
            num_workers: 2,
            stop_after_first: false,
        }
    }

    fn forced_fallback() -> SolverConfig {
        SolverConfig {
            time_limit_ms: 0,
            ..solver(0)
        }
    }

    /// Checks every testable property directly on the report.
    fn assert_properties(request: &ScheduleRequest, report: &ScheduleReport) {
        let grid = &report.grid;
        let span = |a: &Assignment| {
            (grid.timeline(a.day, a.start_slot), grid.timeline(a.day, a.end_slot))
        };
        // Rest is owed unless one of the two names the other in its waiver.
        let rest = |a: &Assignment, b: &Assignment| {
            if a.waives_rest_with(&b.match_id) || b.waives_rest_with(&a.match_id) {
                0
            } else {
                grid.rest_slots
            }
        };

        assert!(report.violations.is_empty(), "{:?}", report.violations);

        // exclusivity and rest, per court and per participant, across days
        let all: Vec<&Assignment> = report.schedule.assignments().collect();
        for (i, &a) in all.iter().enumerate() {
            for &b in &all[i + 1..] {
                if a.resource_id != b.resource_id && !a.shares_participant(b) {
                    continue;
                }
                let ((s1, e1), (s2, e2)) = (span(a), span(b));
                let gap = rest(a, b);
                assert!(s2 >= e1 + gap || s1 >= e2 + gap, "{a:?} {b:?}");
            }
        }

        // windows honored
        for p in request.participants.iter().filter(|p| p.has_window()) {
            let (earliest, latest) = grid.participant_window(p);
            for a in report.schedule.assignments_for_participant(&p.id) {
                assert!(a.start_slot >= earliest && a.end_slot <= latest, "{a:?}");
            }
        }

        // each match at most once, completeness or warning
        for m in &request.matches {
            assert!(report.schedule.assignments().filter(|a| a.match_id == m.id).count() <= 1);
        }
        assert_eq!(report.scheduled_count() + report.unscheduled_count(), report.requested);
        if report.unscheduled_count() > 0 {
            assert!(!report.warnings.is_empty());
        }

        // projection has no side effects
        assert_eq!(report.timetable(), report.timetable());
    }

    #[test]
    fn test_scenario_a_single_match() {
        let request = ScheduleRequest::new(
            roster(&["A", "B"]),
            vec![Resource::new("C1", t("08:00"))],
            vec![Match::new("M1", "A", "B")],
        )
        .with_config(SchedulerConfig::new().with_solver(solver(10)));

        let report = schedule_matches(&request).unwrap();
        assert_eq!(report.outcome, ScheduleOutcome::Scheduled);
        assert_eq!(report.optimizer_status, SolverStatus::Optimal);
        assert_eq!(report.scheduled_count(), 1);
        assert!(report.warnings.is_empty());

        let timetable = report.timetable();
        assert_eq!(timetable.len(), 1);
        let entry = &timetable[0].entries[0];
        assert_eq!((entry.day, entry.start_time.as_str(), entry.end_time.as_str()), (0, "08:00", "08:30"));
        assert_properties(&request, &report);
    }

    #[test]
    fn test_scenario_b_round_robin_without_long_runs() {
        let matches = round_robin(&[("P1", &["A", "B", "C", "D"])]);
        let request = ScheduleRequest::new(
            roster(&["A", "B", "C", "D"]),
            vec![Resource::new("C1", t("08:00")).with_closes_at(t("20:00"))],
            matches,
        )
        .with_config(
            SchedulerConfig::new()
                .with_rest_minutes(15)
                .with_confine_groups(true)
                .with_solver(solver(10)),
        );

        let report = schedule_matches(&request).unwrap();
        assert_eq!(report.outcome, ScheduleOutcome::Scheduled);
        assert_eq!(report.scheduled_count(), 6);
        assert_properties(&request, &report);

        let kpi = report.kpi(&request);
        assert_eq!(kpi.long_runs, 0);
        assert_eq!(kpi.makespan, 51);
        assert_eq!(kpi.consecutive_pairs, 2);
    }

    #[test]
    fn test_scenario_c_closing_time() {
        let resources = vec![Resource::new("C1", t("08:00")).with_closes_at(t("10:00"))];
        let participants = roster(&["A", "B"]);
        let grid = SlotGrid::new(&resources, &SchedulerConfig::new()).unwrap();
        let checker = ConstraintChecker::new(&grid, &resources, &participants);
        let m = Match::new("M1", "A", "B");

        let start = grid.start_bound(t("09:45"));
        let late = Assignment::new(&m, "C1", 0, start, start + grid.match_slots);
        assert!(!checker.resource_available(&Schedule::new(), &late));

        // and nothing the engine produces ends after 10:00
        let request = ScheduleRequest::new(participants, resources, vec![m]);
        let report = schedule_matches(&request).unwrap();
        let a = report.schedule.assignment_for_match("M1").unwrap();
        assert!(a.end_slot <= grid.end_bound(t("10:00")));
    }

    #[test]
    #[traced_test]
    fn test_scenario_d_forced_fallback() {
        let matches = round_robin(&[("P1", &["A", "B", "C"]), ("P2", &["D", "E", "F"])]);
        let request = ScheduleRequest::new(
            roster(&["A", "B", "C", "D", "E", "F"]),
            vec![Resource::new("C1", t("08:00")).with_closes_at(t("11:00"))],
            matches,
        )
        .with_config(SchedulerConfig::new().with_solver(forced_fallback()));

        let report = schedule_matches(&request).unwrap();
        assert_eq!(report.optimizer_status, SolverStatus::Timeout);
        assert_eq!(report.outcome, ScheduleOutcome::Fallback);
        assert_eq!(report.scheduled_count(), 6);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("timeout"));
        assert!(report.warnings[0].contains("fell back"));
        assert!(logs_contain("falling back to greedy"));
        assert_properties(&request, &report);
    }

    #[test]
    fn test_scenario_e_participant_window() {
        let mut participants = roster(&["B", "C"]);
        participants.push(Participant::new("A").with_earliest_start(t("10:00")));
        let resources = vec![Resource::new("C1", t("08:00")).with_closes_at(t("20:00"))];
        let matches = vec![Match::new("M1", "A", "B"), Match::new("M2", "A", "C")];

        let grid = SlotGrid::new(&resources, &SchedulerConfig::new()).unwrap();
        let checker = ConstraintChecker::new(&grid, &resources, &participants);
        let early = Assignment::new(&matches[0], "C1", 0, grid.start_bound(t("09:00")), 18);
        assert!(!checker.within_windows(&early));

        for solver_config in [solver(10), forced_fallback()] {
            let request = ScheduleRequest::new(participants.clone(), resources.clone(), matches.clone())
                .with_config(SchedulerConfig::new().with_solver(solver_config));
            let report = schedule_matches(&request).unwrap();
            assert_eq!(report.scheduled_count(), 2);
            for a in report.schedule.assignments() {
                assert!(a.start_slot >= 24, "{a:?}");
            }
            assert_properties(&request, &report);
        }
    }

    #[test]
    fn test_partially_scheduled() {
        // Room for two of three disjoint matches.
        let request = ScheduleRequest::new(
            roster(&["A", "B", "C", "D", "E", "F"]),
            vec![Resource::new("C1", t("08:00")).with_closes_at(t("09:00"))],
            vec![
                Match::new("M1", "A", "B"),
                Match::new("M2", "C", "D"),
                Match::new("M3", "E", "F"),
            ],
        )
        .with_config(SchedulerConfig::new().with_solver(solver(10)));

        let report = schedule_matches(&request).unwrap();
        assert_eq!(report.optimizer_status, SolverStatus::Infeasible);
        assert_eq!(
            report.outcome,
            ScheduleOutcome::PartiallyScheduled {
                unscheduled: vec!["M3".to_string()]
            }
        );
        assert_eq!(report.unscheduled_count(), 1);
        assert!(!report.is_complete());
        assert!(report
            .warnings
            .iter()
            .any(|w| w == "1 of 3 matches could not be scheduled"));
        assert_properties(&request, &report);
    }

    #[test]
    fn test_multi_day_multi_court_both_paths() {
        let pools: [(&str, &[&str]); 2] = [("P1", &["A", "B", "C", "D"]), ("P2", &["E", "F", "G", "H"])];
        let mut participants = roster(&["A", "B", "C", "E", "F", "G", "H"]);
        participants.push(Participant::new("D").with_latest_end(t("11:00")));
        let resources = vec![
            Resource::new("C1", t("09:00")).with_closes_at(t("12:00")),
            Resource::new("C2", t("09:30")).with_closes_at(t("12:00")),
        ];

        for solver_config in [solver(5), forced_fallback()] {
            let config = SchedulerConfig::new()
                .with_match_minutes(25)
                .with_rest_minutes(10)
                .with_days(2)
                .with_confine_groups(true)
                .with_solver(solver_config);
            let request =
                ScheduleRequest::new(participants.clone(), resources.clone(), round_robin(&pools))
                    .with_config(config);

            let report = schedule_matches(&request).unwrap();
            assert_eq!(report.scheduled_count(), 12, "{:?}", report.warnings);
            assert_properties(&request, &report);

            // each pool stays on one court
            for (group, _) in &pools {
                let courts: BTreeSet<&str> = report
                    .schedule
                    .assignments()
                    .filter(|a| a.group == *group)
                    .map(|a| a.resource_id.as_str())
                    .collect();
                assert_eq!(courts.len(), 1, "{group}");
            }
        }
    }

    #[test]
    fn test_overnight_court() {
        let request = ScheduleRequest::new(
            roster(&["A", "B", "C", "D"]),
            vec![Resource::new("C1", t("23:00")).with_closes_at(t("01:00"))],
            vec![
                Match::new("M1", "A", "B"),
                Match::new("M2", "C", "D"),
                Match::new("M3", "A", "C"),
            ],
        )
        .with_config(SchedulerConfig::new().with_match_minutes(40).with_solver(solver(10)));

        let report = schedule_matches(&request).unwrap();
        assert_eq!(report.scheduled_count(), 3);
        let times: Vec<String> = report.timetable()[0]
            .entries
            .iter()
            .map(|e| e.start_time.clone())
            .collect();
        assert_eq!(times, vec!["23:00", "23:40", "00:20"]);
        assert_properties(&request, &report);
    }

    #[test]
    fn test_empty_match_list() {
        let request = ScheduleRequest::new(
            roster(&["A"]),
            vec![Resource::new("C1", t("08:00"))],
            Vec::new(),
        );
        let report = schedule_matches(&request).unwrap();
        assert_eq!(report.outcome, ScheduleOutcome::Scheduled);
        assert_eq!(report.scheduled_count(), 0);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_configuration_errors() {
        let base = ScheduleRequest::new(
            roster(&["A", "B"]),
            vec![Resource::new("C1", t("08:00"))],
            vec![Match::new("M1", "A", "B")],
        );

        let mut no_resources = base.clone();
        no_resources.resources.clear();
        assert!(matches!(
            schedule_matches(&no_resources),
            Err(ScheduleError::Configuration(_))
        ));

        let mut no_participants = base.clone();
        no_participants.participants.clear();
        assert!(matches!(
            schedule_matches(&no_participants),
            Err(ScheduleError::Configuration(_))
        ));

        let zero_duration = base.clone().with_config(SchedulerConfig::new().with_match_minutes(0));
        assert!(matches!(
            schedule_matches(&zero_duration),
            Err(ScheduleError::Configuration(_))
        ));

        let bad_end = base.clone().with_config(SchedulerConfig::new().with_day_end("25:99"));
        assert_eq!(
            schedule_matches(&bad_end).unwrap_err(),
            ScheduleError::Format("25:99".into())
        );

        let mut dangling = base;
        dangling.matches.push(Match::new("M2", "A", "Z"));
        match schedule_matches(&dangling) {
            Err(ScheduleError::Configuration(msg)) => assert!(msg.contains("'Z'")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_request_from_json() {
        let json = r#"{
            "participants": [{"id": "A"}, {"id": "B", "earliest_start": "09:00:00"}],
            "resources": [{"id": "C1", "opens_at": "08:00:00"}],
            "matches": [{"id": "M1", "participant_a": "A", "participant_b": "B", "group": "P1"}],
            "config": {"match_minutes": 20}
        }"#;
        let request: ScheduleRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.config.match_minutes, 20);
        assert_eq!(request.config.rest_minutes, 0);

        let report = schedule_matches(&request).unwrap();
        let entry = &report.timetable()[0].entries[0];
        assert_eq!(entry.start_time, "09:00");
        assert_eq!(entry.end_time, "09:20");
    }

    #[test]
    fn test_relaxed_rest_stays_with_its_pair() {
        let resources = vec![
            Resource::new("C1", t("08:00")).with_closes_at(t("09:05")),
            Resource::new("C2", t("08:00")).with_closes_at(t("09:05")),
        ];
        let matches = vec![
            Match::new("M1", "A", "B").with_group("P1"),
            Match::new("M2", "C", "D").with_group("P1"),
            Match::new("M3", "C", "E").with_group("P2"),
        ];
        let request = ScheduleRequest::new(roster(&["A", "B", "C", "D", "E"]), resources, matches)
            .with_config(
                SchedulerConfig::new()
                    .with_rest_minutes(10)
                    .with_confine_groups(true)
                    .with_solver(forced_fallback()),
            );

        let report = schedule_matches(&request).unwrap();
        let m2 = report.schedule.assignment_for_match("M2").unwrap();
        assert_eq!(m2.rest_waived_with, vec!["M1".to_string()]);
        // C2 at 08:00 would end right as M2 starts, with no rest for C.
        assert_eq!(
            report.outcome,
            ScheduleOutcome::PartiallyScheduled {
                unscheduled: vec!["M3".to_string()]
            }
        );
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("M2 on C1 placed with rest relaxed next to M1")));
        assert_properties(&request, &report);
    }

    #[test]
    fn test_budget_ending_after_first_schedule_keeps_it() {
        // A meets eight opponents: the first schedule comes at once, the
        // optimality proof would take far longer than the budget.
        let mut ids = vec!["A".to_string()];
        ids.extend((1..=8).map(|i| format!("B{i}")));
        let participants: Vec<Participant> = ids.iter().map(Participant::new).collect();
        let matches: Vec<Match> = (1..=8)
            .map(|i| Match::new(format!("M{i}"), "A", format!("B{i}")))
            .collect();
        let resources = vec![
            Resource::new("C1", t("08:00")).with_closes_at(t("13:00")),
            Resource::new("C2", t("08:00")).with_closes_at(t("13:00")),
        ];
        let budget = SolverConfig {
            time_limit_ms: 300,
            ..solver(0)
        };
        let request = ScheduleRequest::new(participants, resources, matches)
            .with_config(SchedulerConfig::new().with_solver(budget));

        let report = schedule_matches(&request).unwrap();
        assert_eq!(report.optimizer_status, SolverStatus::Feasible);
        assert_eq!(report.outcome, ScheduleOutcome::Scheduled);
        assert_eq!(report.scheduled_count(), 8);
        assert!(report.objective.is_some());
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert_properties(&request, &report);
    }

    /// Puts every match at the earliest start of its first alternative.
    struct Careless;

    impl CpSolver for Careless {
        fn solve(&self, model: &CpModel, _config: &SolverConfig) -> CpSolution {
            let mut solution = CpSolution::empty(SolverStatus::Feasible);
            for constraint in &model.constraints {
                let Constraint::Alternative { alternatives, .. } = constraint else {
                    continue;
                };
                if let Some(iv) = alternatives.first().and_then(|name| model.intervals.get(name)) {
                    let interval = IntervalSolution {
                        start: iv.start.min,
                        end: iv.end.min,
                        duration: iv.end.min - iv.start.min,
                        is_present: true,
                    };
                    solution.intervals.insert(iv.name.clone(), interval);
                }
            }
            solution
        }
    }

    #[test]
    #[traced_test]
    fn test_unchecked_optimizer_schedule_is_rejected() {
        let request = ScheduleRequest::new(
            roster(&["A", "B", "C", "D"]),
            vec![Resource::new("C1", t("08:00")).with_closes_at(t("12:00"))],
            vec![Match::new("M1", "A", "B"), Match::new("M2", "C", "D")],
        )
        .with_config(SchedulerConfig::new().with_solver(solver(10)));

        let report = schedule_with(&request, &Careless).unwrap();
        assert_eq!(report.optimizer_status, SolverStatus::Feasible);
        assert_eq!(report.outcome, ScheduleOutcome::Fallback);
        assert_eq!(report.objective, None);
        assert_eq!(
            report.warnings,
            vec!["Optimizer schedule failed the feasibility check; fell back to greedy scheduling"]
        );
        assert!(logs_contain("breaks a hard constraint"));
        assert_eq!(report.scheduled_count(), 2);
        assert_properties(&request, &report);
    }

    #[test]
    fn test_schedule_with_builtin_solver() {
        let request = ScheduleRequest::new(
            roster(&["A", "B"]),
            vec![Resource::new("C1", t("08:00"))],
            vec![Match::new("M1", "A", "B")],
        )
        .with_config(SchedulerConfig::new().with_solver(solver(10)));

        // Without rules the solver still honors the interval model.
        let report = schedule_with(&request, &BranchAndBoundSolver::default()).unwrap();
        assert_eq!(report.outcome, ScheduleOutcome::Scheduled);
        assert_eq!(report.optimizer_status, SolverStatus::Optimal);
        assert_properties(&request, &report);
    }
}
