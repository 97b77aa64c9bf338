//! Branch-and-bound search over an interval model.
//!
//! # Algorithm
//!
//! The model is first compiled into a compact search space: one task per
//! `Alternative` constraint (or per mandatory interval outside any), each
//! with its alternative intervals, and one lane per `NoOverlap` constraint.
//! Depth-first search then places one task per level:
//! 1. Forward-check every unplaced task; a task with no feasible value
//!    ends the branch. The task with the fewest values is branched on.
//! 2. Values are tried by resulting makespan, then penalty increase.
//! 3. A branch is cut when its lower bound (current makespan, each open
//!    task's earliest feasible end, a court packing bound, the penalty
//!    so far and the best gap still reachable) cannot beat the incumbent.
//!
//! Several workers search the same tree with differently seeded tie
//! orders and share one incumbent. Whichever exhausts its tree first
//! proves the incumbent optimal (or the model infeasible) and stops the
//! others. The deadline stops everyone.
//!
//! # Reference
//! Baptiste et al. (2001), "Constraint-Based Scheduling", Ch. 7

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;
use u_metaheur::cp::{
    Constraint, CpModel, CpSolution, CpSolver, IntervalSolution, SolverConfig, SolverStatus,
};

use super::objective::{evaluate, run_penalty, ObjectiveValue, ObjectiveWeights};
use super::rules::{ScheduleRules, MIN_GAP_VAR, RUN_PENALTY_VAR};
use crate::constraints::separated;

/// Lower-case name of a status, for logs and warnings.
pub fn status_label(status: SolverStatus) -> &'static str {
    match status {
        SolverStatus::Optimal => "optimal",
        SolverStatus::Feasible => "feasible",
        SolverStatus::Infeasible => "infeasible",
        SolverStatus::ModelInvalid => "invalid model",
        SolverStatus::Timeout => "timeout",
        SolverStatus::Unknown => "unknown",
    }
}

/// Parallel depth-first branch-and-bound.
///
/// Understands `Alternative` and `NoOverlap` constraints with fixed
/// durations; anything else makes the model [`SolverStatus::ModelInvalid`].
/// The run penalty and group confinement come from [`ScheduleRules`].
#[derive(Debug, Clone, Default)]
pub struct BranchAndBoundSolver {
    rules: ScheduleRules,
    seed: u64,
}

impl BranchAndBoundSolver {
    /// Creates a solver applying `rules` on top of the model.
    pub fn new(rules: ScheduleRules) -> Self {
        Self { rules, seed: 0 }
    }

    /// Sets the seed for the tie orders of workers after the first.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl CpSolver for BranchAndBoundSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        let started = Instant::now();

        let space = match SearchSpace::compile(model, &self.rules) {
            Ok(space) => space,
            Err(reason) => {
                debug!(model = %model.name, %reason, "model rejected");
                return finished(CpSolution::empty(SolverStatus::ModelInvalid), started, 0);
            }
        };

        if space.tasks.is_empty() {
            let mut solution = CpSolution::empty(SolverStatus::Optimal);
            solution.objective_value = Some(0.0);
            return finished(solution, started, 0);
        }
        if space.tasks.iter().any(|t| t.alternatives.is_empty()) {
            return finished(CpSolution::empty(SolverStatus::Infeasible), started, 0);
        }
        if config.time_limit_ms <= 0 {
            return finished(CpSolution::empty(SolverStatus::Timeout), started, 0);
        }

        // A budget too large to represent means no deadline at all.
        let deadline = u64::try_from(config.time_limit_ms)
            .ok()
            .and_then(|ms| started.checked_add(Duration::from_millis(ms)));
        let shared = Shared::new(deadline, config.stop_after_first);
        let workers = config.num_workers.max(1);
        thread::scope(|scope| {
            for id in 0..workers {
                let (space, shared) = (&space, &shared);
                let seed = self.seed;
                scope.spawn(move || {
                    let mut worker = Worker::new(space, shared, id, seed);
                    worker.search();
                    worker.finish();
                });
            }
        });

        let exhausted = shared.exhausted.load(Ordering::Acquire);
        let nodes = shared.nodes.load(Ordering::Relaxed);
        let incumbent = shared
            .incumbent
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);

        let status = match (&incumbent, exhausted) {
            (Some(_), true) => SolverStatus::Optimal,
            (Some(_), false) => SolverStatus::Feasible,
            (None, true) => SolverStatus::Infeasible,
            (None, false) => SolverStatus::Timeout,
        };
        debug!(
            model = %model.name,
            status = status_label(status),
            nodes,
            workers,
            "search finished"
        );

        let mut solution = CpSolution::empty(status);
        if let Some(best) = incumbent {
            space.write_solution(model, &best, &mut solution);
        }
        finished(solution, started, nodes)
    }
}

fn finished(mut solution: CpSolution, started: Instant, nodes: u64) -> CpSolution {
    solution.solve_time_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);
    solution.num_nodes = nodes;
    solution
}

/// One optional interval a task may take.
struct Alternative {
    name: String,
    start_min: usize,
    start_max: usize,
    duration: usize,
    lanes: Vec<usize>,
    resource: Option<usize>,
}

/// One interval that must be placed, through exactly one alternative.
struct Task {
    main: String,
    alternatives: Vec<usize>,
    participants: Vec<usize>,
    group: Option<usize>,
}

/// The model reduced to indices.
struct SearchSpace {
    alternatives: Vec<Alternative>,
    tasks: Vec<Task>,
    lane_count: usize,
    participant_count: usize,
    group_count: usize,
    /// Merged alternative windows per court; empty unless every
    /// alternative has a court.
    windows: Vec<Vec<(usize, usize)>>,
    min_duration: usize,
    run_threshold: usize,
    weights: ObjectiveWeights,
    /// Largest gap still reachable; zero when nobody plays twice.
    gap_ceiling: usize,
}

fn to_slot(value: i64, what: &str) -> Result<usize, String> {
    usize::try_from(value).map_err(|_| format!("negative {what}: {value}"))
}

impl SearchSpace {
    fn compile(model: &CpModel, rules: &ScheduleRules) -> Result<Self, String> {
        model.validate()?;
        let horizon = to_slot(model.horizon, "horizon")?;

        let mut alternatives: Vec<Alternative> = Vec::new();
        let mut alternative_index: HashMap<String, usize> = HashMap::new();
        let mut tasks: Vec<Task> = Vec::new();
        let mut task_index: HashMap<&str, usize> = HashMap::new();

        let mut add_alternative = |name: &str| -> Result<Option<usize>, String> {
            if let Some(&i) = alternative_index.get(name) {
                return Ok(Some(i));
            }
            let iv = model
                .intervals
                .get(name)
                .ok_or_else(|| format!("undefined interval: {name}"))?;
            if iv.duration.fixed.is_none() && iv.duration.min != iv.duration.max {
                return Err(format!("variable duration: {name}"));
            }
            let duration = to_slot(iv.duration.min, "duration")?;
            let start_min = to_slot(iv.start.min, "start")?;
            let end_max = to_slot(iv.end.max, "end")?;
            let start_max = to_slot(iv.start.max, "start")?.min(end_max.saturating_sub(duration));
            if end_max < duration || start_max < start_min {
                return Ok(None);
            }
            let i = alternatives.len();
            alternatives.push(Alternative {
                name: name.to_string(),
                start_min,
                start_max,
                duration,
                lanes: Vec::new(),
                resource: rules.resource_of.get(name).copied(),
            });
            alternative_index.insert(name.to_string(), i);
            Ok(Some(i))
        };

        let mut covered: HashSet<&str> = HashSet::new();
        for constraint in &model.constraints {
            match constraint {
                Constraint::Alternative { main, alternatives: options } => {
                    if task_index.contains_key(main.as_str()) {
                        return Err(format!("interval {main} has two alternative sets"));
                    }
                    let mut chosen = Vec::new();
                    for name in options {
                        covered.insert(name.as_str());
                        if let Some(i) = add_alternative(name)? {
                            chosen.push(i);
                        }
                    }
                    covered.insert(main.as_str());
                    task_index.insert(main.as_str(), tasks.len());
                    tasks.push(Task {
                        main: main.clone(),
                        alternatives: chosen,
                        participants: Vec::new(),
                        group: None,
                    });
                }
                Constraint::NoOverlap { .. } => {}
                other => return Err(format!("unsupported constraint: {other:?}")),
            }
        }

        // Mandatory intervals outside every alternative set are their own task.
        let mut standalone: Vec<&str> = model
            .intervals
            .values()
            .filter(|iv| !iv.is_optional && !covered.contains(iv.name.as_str()))
            .map(|iv| iv.name.as_str())
            .collect();
        standalone.sort_unstable();
        for name in standalone {
            let chosen: Vec<usize> = add_alternative(name)?.into_iter().collect();
            task_index.insert(name, tasks.len());
            tasks.push(Task {
                main: name.to_string(),
                alternatives: chosen,
                participants: Vec::new(),
                group: None,
            });
        }

        let mut lane_count = 0;
        for constraint in &model.constraints {
            let Constraint::NoOverlap { intervals } = constraint else {
                continue;
            };
            let lane = lane_count;
            lane_count += 1;
            for name in intervals {
                if let Some(&t) = task_index.get(name.as_str()) {
                    for &a in &tasks[t].alternatives {
                        alternatives[a].lanes.push(lane);
                    }
                } else if let Some(&a) = alternative_index.get(name.as_str()) {
                    alternatives[a].lanes.push(lane);
                }
            }
        }
        for alternative in &mut alternatives {
            alternative.lanes.sort_unstable();
            alternative.lanes.dedup();
        }

        let lookup = |name: &String| {
            task_index
                .get(name.as_str())
                .copied()
                .ok_or_else(|| format!("rules name an unknown interval: {name}"))
        };
        for (p, mains) in rules.participants.iter().enumerate() {
            for name in mains {
                tasks[lookup(name)?].participants.push(p);
            }
        }
        for (g, mains) in rules.groups.iter().enumerate() {
            for name in mains {
                tasks[lookup(name)?].group = Some(g);
            }
        }

        let resource_count = alternatives
            .iter()
            .filter_map(|a| a.resource)
            .max()
            .map_or(0, |r| r + 1);
        let packable = alternatives.iter().all(|a| a.resource.is_some());
        let mut windows = vec![Vec::new(); if packable { resource_count } else { 0 }];
        if packable {
            for a in &alternatives {
                if let Some(r) = a.resource {
                    windows[r].push((a.start_min, a.start_max + a.duration));
                }
            }
            for lane in &mut windows {
                *lane = merge(std::mem::take(lane));
            }
        }

        let repeat = rules.participants.iter().any(|mains| mains.len() > 1);
        Ok(Self {
            min_duration: alternatives.iter().map(|a| a.duration).min().unwrap_or(0),
            alternatives,
            tasks,
            lane_count,
            participant_count: rules.participants.len(),
            group_count: rules.groups.len(),
            windows,
            run_threshold: rules.run_threshold,
            weights: ObjectiveWeights::for_grid(horizon, rules.match_slots),
            gap_ceiling: if repeat { horizon } else { 0 },
        })
    }

    /// Marks the incumbent's intervals present and fills the objective.
    fn write_solution(&self, model: &CpModel, best: &Incumbent, solution: &mut CpSolution) {
        let mut starts = vec![Vec::new(); self.participant_count];
        let mut makespan = 0;
        for (task, placement) in self.tasks.iter().zip(&best.placements) {
            let Some(p) = placement else {
                continue;
            };
            let alternative = &self.alternatives[p.alternative];
            let end = p.start + alternative.duration;
            let interval = IntervalSolution {
                start: p.start as i64,
                end: end as i64,
                duration: alternative.duration as i64,
                is_present: true,
            };
            solution.intervals.insert(alternative.name.clone(), interval.clone());
            solution.intervals.insert(task.main.clone(), interval);
            for &participant in &task.participants {
                starts[participant].push(p.start);
            }
            makespan = makespan.max(end);
        }

        for alternative in &self.alternatives {
            let present = solution.intervals.contains_key(&alternative.name);
            if let Some(literal) = model
                .intervals
                .get(&alternative.name)
                .and_then(|iv| iv.presence.as_ref())
            {
                solution.bool_vars.insert(literal.name.clone(), present);
            }
        }

        let value = evaluate(&starts, makespan, self.run_threshold);
        solution.int_vars.insert(RUN_PENALTY_VAR.to_string(), value.penalty);
        solution.int_vars.insert(MIN_GAP_VAR.to_string(), value.min_gap as i64);
        solution.objective_value = Some(value.scalar(self.weights) as f64);
    }
}

/// Sorts and merges overlapping or touching windows.
fn merge(mut spans: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    spans.sort_unstable();
    let mut out: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for (s, e) in spans {
        match out.last_mut() {
            Some(last) if s <= last.1 => last.1 = last.1.max(e),
            _ => out.push((s, e)),
        }
    }
    out
}

/// Chosen alternative and start for one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placement {
    alternative: usize,
    start: usize,
}

struct Incumbent {
    objective: i64,
    placements: Vec<Option<Placement>>,
}

/// State shared by all workers.
struct Shared {
    deadline: Option<Instant>,
    stop_after_first: bool,
    best: AtomicI64,
    incumbent: Mutex<Option<Incumbent>>,
    stop: AtomicBool,
    exhausted: AtomicBool,
    nodes: AtomicU64,
}

impl Shared {
    fn new(deadline: Option<Instant>, stop_after_first: bool) -> Self {
        Self {
            deadline,
            stop_after_first,
            best: AtomicI64::new(i64::MAX),
            incumbent: Mutex::new(None),
            stop: AtomicBool::new(false),
            exhausted: AtomicBool::new(false),
            nodes: AtomicU64::new(0),
        }
    }

    fn offer(&self, candidate: Incumbent) {
        let mut guard = self.incumbent.lock().unwrap_or_else(PoisonError::into_inner);
        if guard
            .as_ref()
            .map_or(true, |current| candidate.objective < current.objective)
        {
            self.best.store(candidate.objective, Ordering::Release);
            *guard = Some(candidate);
        }
        if self.stop_after_first {
            self.stop.store(true, Ordering::Release);
        }
    }
}

/// One value of the branching task.
struct Candidate {
    alternative: usize,
    start: usize,
    end: usize,
    penalty_delta: i64,
    gap: Option<usize>,
    tiebreak: u64,
}

/// What a placement changed, for backtracking.
struct Undo {
    makespan: usize,
    penalty: i64,
    min_gap: Option<usize>,
    participant_penalty: Vec<i64>,
}

fn smaller(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

struct Worker<'a> {
    space: &'a SearchSpace,
    shared: &'a Shared,
    rng: Option<StdRng>,
    task_rank: Vec<usize>,
    /// Sorted spans per no-overlap lane.
    lane_busy: Vec<Vec<(usize, usize)>>,
    /// Sorted spans per court, for the packing bound.
    resource_busy: Vec<Vec<(usize, usize)>>,
    /// Starts per participant, in placement order.
    participant_starts: Vec<Vec<usize>>,
    participant_penalty: Vec<i64>,
    group_resource: Vec<Option<usize>>,
    group_placed: Vec<usize>,
    placements: Vec<Option<Placement>>,
    placed: usize,
    makespan: usize,
    penalty: i64,
    min_gap: Option<usize>,
    nodes: u64,
    aborted: bool,
}

impl<'a> Worker<'a> {
    fn new(space: &'a SearchSpace, shared: &'a Shared, id: usize, seed: u64) -> Self {
        let n = space.tasks.len();
        let mut task_rank: Vec<usize> = (0..n).collect();
        let rng = if id == 0 {
            None
        } else {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(id as u64));
            task_rank.shuffle(&mut rng);
            Some(rng)
        };
        Self {
            space,
            shared,
            rng,
            task_rank,
            lane_busy: vec![Vec::new(); space.lane_count],
            resource_busy: vec![Vec::new(); space.windows.len()],
            participant_starts: vec![Vec::new(); space.participant_count],
            participant_penalty: vec![0; space.participant_count],
            group_resource: vec![None; space.group_count],
            group_placed: vec![0; space.group_count],
            placements: vec![None; n],
            placed: 0,
            makespan: 0,
            penalty: 0,
            min_gap: None,
            nodes: 0,
            aborted: false,
        }
    }

    fn finish(&self) {
        self.shared.nodes.fetch_add(self.nodes, Ordering::Relaxed);
        if !self.aborted {
            self.shared.exhausted.store(true, Ordering::Release);
            self.shared.stop.store(true, Ordering::Release);
        }
    }

    fn should_stop(&self) -> bool {
        if self.shared.stop.load(Ordering::Acquire) {
            return true;
        }
        if self.shared.deadline.is_some_and(|d| Instant::now() >= d) {
            self.shared.stop.store(true, Ordering::Release);
            return true;
        }
        false
    }

    /// Whether the alternative is allowed by the group's court commitment.
    #[inline]
    fn group_allows(&self, t: usize, alternative: &Alternative) -> bool {
        match self.space.tasks[t].group.and_then(|g| self.group_resource[g]) {
            Some(resource) => alternative.resource == Some(resource),
            None => true,
        }
    }

    fn fits(&self, alternative: &Alternative, start: usize) -> bool {
        let span = (start, start + alternative.duration);
        alternative.lanes.iter().all(|&lane| {
            self.lane_busy[lane]
                .iter()
                .all(|&busy| separated(span, busy, 0))
        })
    }

    /// Count of feasible values and the earliest end among them.
    fn domain_summary(&self, t: usize) -> (usize, usize) {
        let mut count = 0;
        let mut min_end = usize::MAX;
        for &a in &self.space.tasks[t].alternatives {
            let alternative = &self.space.alternatives[a];
            if !self.group_allows(t, alternative) {
                continue;
            }
            for start in alternative.start_min..=alternative.start_max {
                if self.fits(alternative, start) {
                    count += 1;
                    min_end = min_end.min(start + alternative.duration);
                }
            }
        }
        (count, min_end)
    }

    /// Smallest makespan that could hold `remaining` more tasks, counting
    /// only free court time; `None` if they cannot fit at all.
    fn packing_bound(&self, remaining: usize) -> Option<usize> {
        if remaining == 0 || self.space.windows.is_empty() {
            return Some(0);
        }
        let len = self.space.min_duration.max(1);
        let mut ends = Vec::new();
        let mut pack = |from: usize, until: usize| {
            let mut end = from + len;
            let mut k = 0;
            while end <= until && k < remaining {
                ends.push(end);
                end += len;
                k += 1;
            }
        };

        for (r, windows) in self.space.windows.iter().enumerate() {
            let busy = &self.resource_busy[r];
            for &(open, close) in windows {
                let mut cursor = open;
                for &(s, e) in busy.iter().filter(|&&(s, e)| s < close && e > open) {
                    pack(cursor, s.min(close));
                    cursor = cursor.max(e);
                }
                pack(cursor, close);
            }
        }

        if ends.len() < remaining {
            return None;
        }
        let (_, nth, _) = ends.select_nth_unstable(remaining - 1);
        Some(*nth)
    }

    fn lower_bound(&self, makespan: usize, penalty: i64, min_gap: Option<usize>) -> i64 {
        ObjectiveValue {
            makespan,
            penalty,
            min_gap: min_gap.unwrap_or(self.space.gap_ceiling),
        }
        .scalar(self.space.weights)
    }

    /// Penalty increase and smallest new gap if task `t` started at `start`.
    fn delta(&self, t: usize, start: usize) -> (i64, Option<usize>) {
        let mut penalty = 0;
        let mut gap: Option<usize> = None;
        for &p in &self.space.tasks[t].participants {
            let starts = &self.participant_starts[p];
            if starts.is_empty() {
                continue;
            }
            let mut with = starts.clone();
            with.push(start);
            penalty += run_penalty(&with, self.space.run_threshold) - self.participant_penalty[p];
            gap = smaller(gap, starts.iter().map(|&s| s.abs_diff(start)).min());
        }
        (penalty, gap)
    }

    fn candidates(&mut self, t: usize) -> Vec<Candidate> {
        let mut out = Vec::new();
        let count = self.space.alternatives.len().max(1);
        for &a in &self.space.tasks[t].alternatives {
            let alternative = &self.space.alternatives[a];
            if !self.group_allows(t, alternative) {
                continue;
            }
            for start in alternative.start_min..=alternative.start_max {
                if !self.fits(alternative, start) {
                    continue;
                }
                let (penalty_delta, gap) = self.delta(t, start);
                let tiebreak = match self.rng.as_mut() {
                    Some(rng) => rng.random::<u64>(),
                    None => (start * count + a) as u64,
                };
                out.push(Candidate {
                    alternative: a,
                    start,
                    end: start + alternative.duration,
                    penalty_delta,
                    gap,
                    tiebreak,
                });
            }
        }
        let makespan = self.makespan;
        out.sort_by_key(|c| (c.end.max(makespan), c.penalty_delta, c.tiebreak));
        out
    }

    fn place(&mut self, t: usize, c: &Candidate) -> Undo {
        let space = self.space;
        let task = &space.tasks[t];
        let alternative = &space.alternatives[c.alternative];
        let span = (c.start, c.end);

        let undo = Undo {
            makespan: self.makespan,
            penalty: self.penalty,
            min_gap: self.min_gap,
            participant_penalty: task
                .participants
                .iter()
                .map(|&p| self.participant_penalty[p])
                .collect(),
        };

        for &lane in &alternative.lanes {
            let busy = &mut self.lane_busy[lane];
            let pos = busy.partition_point(|&b| b < span);
            busy.insert(pos, span);
        }
        if let Some(r) = alternative.resource.filter(|&r| r < self.resource_busy.len()) {
            let busy = &mut self.resource_busy[r];
            let pos = busy.partition_point(|&b| b < span);
            busy.insert(pos, span);
        }

        for &p in &task.participants {
            self.participant_starts[p].push(c.start);
            self.participant_penalty[p] =
                run_penalty(&self.participant_starts[p], space.run_threshold);
        }

        if let Some(g) = task.group {
            self.group_placed[g] += 1;
            if let Some(r) = alternative.resource {
                self.group_resource[g].get_or_insert(r);
            }
        }

        self.placements[t] = Some(Placement {
            alternative: c.alternative,
            start: c.start,
        });
        self.placed += 1;
        self.makespan = self.makespan.max(c.end);
        self.penalty += c.penalty_delta;
        self.min_gap = smaller(self.min_gap, c.gap);
        undo
    }

    fn unplace(&mut self, t: usize, c: &Candidate, undo: Undo) {
        let space = self.space;
        let task = &space.tasks[t];
        let alternative = &space.alternatives[c.alternative];
        let span = (c.start, c.end);

        for &lane in &alternative.lanes {
            let busy = &mut self.lane_busy[lane];
            if let Some(pos) = busy.iter().position(|&b| b == span) {
                busy.remove(pos);
            }
        }
        if let Some(r) = alternative.resource.filter(|&r| r < self.resource_busy.len()) {
            let busy = &mut self.resource_busy[r];
            if let Some(pos) = busy.iter().position(|&b| b == span) {
                busy.remove(pos);
            }
        }

        for (&p, &before) in task.participants.iter().zip(&undo.participant_penalty) {
            self.participant_starts[p].pop();
            self.participant_penalty[p] = before;
        }

        if let Some(g) = task.group {
            self.group_placed[g] -= 1;
            if self.group_placed[g] == 0 {
                self.group_resource[g] = None;
            }
        }

        self.placements[t] = None;
        self.placed -= 1;
        self.makespan = undo.makespan;
        self.penalty = undo.penalty;
        self.min_gap = undo.min_gap;
    }

    fn record(&self) {
        let value = ObjectiveValue {
            makespan: self.makespan,
            penalty: self.penalty,
            min_gap: self.min_gap.unwrap_or(0),
        };
        let objective = value.scalar(self.space.weights);
        if objective < self.shared.best.load(Ordering::Acquire) {
            self.shared.offer(Incumbent {
                objective,
                placements: self.placements.clone(),
            });
        }
    }

    fn search(&mut self) {
        if self.should_stop() {
            self.aborted = true;
            return;
        }
        self.nodes += 1;

        let n = self.space.tasks.len();
        if self.placed == n {
            self.record();
            return;
        }

        let Some(packed_end) = self.packing_bound(n - self.placed) else {
            return;
        };
        let mut end_bound = self.makespan.max(packed_end);
        if self.lower_bound(end_bound, self.penalty, self.min_gap)
            >= self.shared.best.load(Ordering::Acquire)
        {
            return;
        }

        // Most constrained open task first.
        let mut branch: Option<(usize, usize, usize)> = None;
        for t in (0..n).filter(|&t| self.placements[t].is_none()) {
            let (count, min_end) = self.domain_summary(t);
            if count == 0 {
                return;
            }
            end_bound = end_bound.max(min_end);
            let key = (count, self.task_rank[t], t);
            if branch.map_or(true, |best| key < best) {
                branch = Some(key);
            }
        }
        let Some((_, _, t)) = branch else {
            return;
        };
        if self.lower_bound(end_bound, self.penalty, self.min_gap)
            >= self.shared.best.load(Ordering::Acquire)
        {
            return;
        }

        for c in self.candidates(t) {
            let min_gap = smaller(self.min_gap, c.gap);
            let bound =
                self.lower_bound(end_bound.max(c.end), self.penalty + c.penalty_delta, min_gap);
            if bound >= self.shared.best.load(Ordering::Acquire) {
                continue;
            }
            let undo = self.place(t, &c);
            self.search();
            self.unplace(t, &c, undo);
            if self.aborted {
                return;
            }
        }
    }
}
