//! Model Builder (C3): turns a layout and a [`ScheduleRequest`] into a MILP.
//!
//! CP-SAT-style engines give you optional intervals, `NoOverlap`, and
//! `Cumulative` as native globals. This crate's solver stack has no such
//! engine, only a linear/mixed-integer modeler, so every one of those
//! globals is translated into big-M linear constraints: presence gates every
//! conditional constraint, pairwise disjunctive big-M stands in for
//! `NoOverlap`, and a time-indexed selector formulation stands in for
//! `Cumulative`.

use std::collections::HashMap;

use good_lp::{constraint, variable, Constraint, Expression, ProblemVariables, Variable};
use itertools::Itertools;
use log::debug;

use crate::domain::{ElementaryTask, Layout, ScheduleRequest, TaskKind};
use crate::error::{Result, ScheduleError};
use crate::expand::expand_basic;

#[derive(Debug, Clone)]
pub struct TaskVars {
    pub start: Variable,
    pub end: Variable,
    pub duration_ticks: f64,
    pub task: ElementaryTask,
}

#[derive(Debug, Clone)]
pub struct JobVars {
    pub job_id: String,
    pub op: String,
    pub presence: Variable,
    pub weight: f64,
    pub finish: Variable,
    pub tasks: Vec<TaskVars>,
}

#[derive(Debug, Clone)]
pub struct BuiltModel {
    pub jobs: Vec<JobVars>,
    pub h_ticks: f64,
    pub time_unit: f64,
    pub program_start: f64,
}

/// Builds the full constraint system and objective for `request` against
/// `layout`, registering every decision variable on `vars`.
///
/// Returns the built model (for the driver and the projector), the objective
/// expression to maximize, and every constraint to fold into the problem.
pub fn build(
    vars: &mut ProblemVariables,
    layout: &Layout,
    request: &ScheduleRequest,
) -> Result<(BuiltModel, Expression, Vec<Constraint>)> {
    let time_unit = (request.time_unit.max(1)) as f64;
    let program_start = request.program_start();
    let h_ticks = (request.horizon_min * time_unit).round();
    let m = h_ticks.max(1.0);

    let to_ticks = |clock_min: f64| -> f64 { ((clock_min - program_start) * time_unit).max(0.0) };

    let earliest_t: HashMap<&str, f64> = request
        .earliest_starts
        .iter()
        .filter(|(op, _)| op.as_str() != "program_start")
        .map(|(op, &t)| (op.as_str(), to_ticks(t)))
        .collect();
    let latest_t: HashMap<&str, f64> = request
        .latest_finishes
        .iter()
        .map(|(op, &t)| (op.as_str(), to_ticks(t)))
        .collect();

    let mut templates = HashMap::with_capacity(request.selected_ops.len());
    let mut run_counts = HashMap::with_capacity(request.selected_ops.len());
    for op in &request.selected_ops {
        let recipe = layout.operation(op)?;
        let tpl = expand_basic(recipe, layout);
        let run_count = match request.max_runs.get(op) {
            Some(&n) if n > 0 => n,
            _ => {
                let minimal: f64 = tpl.iter().map(|t| t.duration_min).sum();
                if minimal <= 0.0 {
                    1
                } else {
                    (request.horizon_min / minimal).floor() as u32 + 1
                }
            }
        };
        debug!("operation `{op}` resolved to {run_count} run(s)");
        run_counts.insert(op.clone(), run_count);
        templates.insert(op.clone(), tpl);
    }
    let total_run_count: u32 = run_counts.values().sum();

    validate_precedence(request)?;

    let mut constraints = Vec::new();
    let mut jobs: Vec<JobVars> = Vec::new();
    let mut job_index: HashMap<String, usize> = HashMap::new();
    let mut station_buckets: HashMap<String, Vec<(usize, usize)>> = HashMap::new();
    let mut move_d: Vec<(usize, usize)> = Vec::new();
    let mut move_s: Vec<(usize, usize)> = Vec::new();

    for op in &request.selected_ops {
        let weight = request.weights.get(op).copied().unwrap_or(1.0);
        let force_presence = latest_t.contains_key(op.as_str());
        let tpl = &templates[op];
        let run_count = run_counts[op];

        for k in 0..run_count {
            let job_id = format!("{op}_{k}");
            let presence = vars.add(variable().binary());
            let finish = vars.add(variable().min(0.0).max(h_ticks));

            let job_idx = jobs.len();
            let mut task_vars = Vec::with_capacity(tpl.len());
            for (idx, task) in tpl.iter().enumerate() {
                let duration_ticks = (task.duration_min * time_unit).ceil();
                let start_upper = (h_ticks - duration_ticks).max(0.0);
                let start = vars.add(variable().integer().min(0.0).max(start_upper));
                let end = vars.add(variable().integer().min(0.0).max(h_ticks));
                // Gated on `presence`: an absent task's start/end are free, so a
                // task whose duration alone exceeds the horizon only rules out
                // *that task's run* (forces its presence to 0) instead of making
                // the whole batch infeasible.
                constraints.push(big_m_ge(end, start + duration_ticks, presence, m));
                constraints.push(big_m_le(end, start + duration_ticks, presence, m));

                if let Some(station) = task.capacity_station() {
                    if station != crate::domain::SOURCE && station != crate::domain::SINK {
                        station_buckets.entry(station.to_string()).or_default().push((job_idx, idx));
                    }
                }
                if task.kind == TaskKind::Move {
                    if let Some(from) = task.from_station.as_deref() {
                        if from.starts_with('D') {
                            move_d.push((job_idx, idx));
                        }
                        if from.starts_with('S') {
                            move_s.push((job_idx, idx));
                        }
                    }
                }

                task_vars.push(TaskVars { start, end, duration_ticks, task: task.clone() });
            }

            if force_presence {
                constraints.push(constraint!(presence == 1.0));
            }
            if let Some(&earliest) = earliest_t.get(op.as_str()) {
                constraints.push(big_m_ge(task_vars[0].start, earliest, presence, m));
            }
            if let Some(&latest) = latest_t.get(op.as_str()) {
                let last = task_vars.last().expect("template has at least one task");
                constraints.push(big_m_le(last.end, latest, presence, m));
            }
            for w in task_vars.windows(2) {
                let (curr, next) = (&w[0], &w[1]);
                constraints.push(big_m_ge(next.start, curr.end, presence, m));
                constraints.push(big_m_le(next.start, curr.end, presence, m));
            }
            for tv in &task_vars {
                constraints.push(big_m_ge(finish, tv.end, presence, m));
            }

            job_index.insert(job_id.clone(), job_idx);
            jobs.push(JobVars { job_id, op: op.clone(), presence, weight, finish, tasks: task_vars });
        }
    }

    for (jid, preds) in &request.precedence {
        let Some(&job_idx) = job_index.get(jid) else { continue };
        let first_start = jobs[job_idx].tasks[0].start;
        let presence = jobs[job_idx].presence;
        for pred in preds {
            let Some(&pred_idx) = job_index.get(pred) else { continue };
            let pred_end = jobs[pred_idx].tasks.last().expect("template has at least one task").end;
            constraints.push(big_m_ge(first_start, pred_end, presence, m));
        }
    }

    for (station, members) in &station_buckets {
        let cap = request.station_caps.get(station).copied().unwrap_or(1);
        let items = resource_items(&jobs, members);
        if cap <= 1 {
            add_no_overlap(vars, &items, m, &mut constraints);
        } else {
            add_cumulative(vars, &items, h_ticks, cap, &mut constraints);
        }
    }
    if !move_d.is_empty() {
        let items = resource_items(&jobs, &move_d);
        add_no_overlap(vars, &items, m, &mut constraints);
    }
    if !move_s.is_empty() {
        let items = resource_items(&jobs, &move_s);
        add_cumulative(vars, &items, h_ticks, 2, &mut constraints);
    }

    let big_f = h_ticks * (total_run_count as f64 + 1.0);
    let throughput: Expression = jobs.iter().map(|j| j.weight * j.presence).sum();
    let total_finish: Expression = jobs.iter().map(|j| Expression::from(j.finish)).sum();
    let objective = throughput * big_f - total_finish;

    debug!(
        "built {} job(s), {} task(s), {} constraint(s)",
        jobs.len(),
        jobs.iter().map(|j| j.tasks.len()).sum::<usize>(),
        constraints.len()
    );

    let built = BuiltModel { jobs, h_ticks, time_unit, program_start };
    Ok((built, objective, constraints))
}

/// A precedence entry is only a configuration error when neither its job nor
/// any predecessor's *operation* was ever selected — a reference to a
/// specific run index that simply wasn't instantiated this horizon is normal
/// and silently ignored downstream, matching the source system.
fn validate_precedence(request: &ScheduleRequest) -> Result<()> {
    let known_ops: std::collections::HashSet<&str> =
        request.selected_ops.iter().map(String::as_str).collect();
    for (jid, preds) in &request.precedence {
        for referenced in std::iter::once(jid).chain(preds.iter()) {
            if !known_ops.contains(job_operation(referenced)) {
                return Err(ScheduleError::UnknownPrecedenceReference(referenced.clone()));
            }
        }
    }
    Ok(())
}

fn job_operation(job_id: &str) -> &str {
    job_id.rsplit_once('_').map_or(job_id, |(op, _)| op)
}

fn resource_items(jobs: &[JobVars], members: &[(usize, usize)]) -> Vec<(Variable, Variable, f64, Variable)> {
    members
        .iter()
        .map(|&(j, t)| {
            let job = &jobs[j];
            let tv = &job.tasks[t];
            (tv.start, tv.end, tv.duration_ticks, job.presence)
        })
        .collect()
}

/// `lhs >= rhs`, gated so the inequality is vacuous whenever `presence == 0`.
fn big_m_ge(lhs: impl Into<Expression>, rhs: impl Into<Expression>, presence: Variable, m: f64) -> Constraint {
    let lhs = lhs.into();
    let rhs = rhs.into();
    constraint!(lhs >= rhs - m + m * presence)
}

/// `lhs <= rhs`, gated so the inequality is vacuous whenever `presence == 0`.
fn big_m_le(lhs: impl Into<Expression>, rhs: impl Into<Expression>, presence: Variable, m: f64) -> Constraint {
    let lhs = lhs.into();
    let rhs = rhs.into();
    constraint!(lhs <= rhs + m - m * presence)
}

/// Pairwise disjunctive big-M: for every pair of intervals in `items`, one
/// ordering boolean and the two inequalities gated on that ordering and on
/// both intervals' presence.
fn add_no_overlap(
    vars: &mut ProblemVariables,
    items: &[(Variable, Variable, f64, Variable)],
    m: f64,
    constraints: &mut Vec<Constraint>,
) {
    for (&(s_i, e_i, _, p_i), &(s_j, e_j, _, p_j)) in items.iter().tuple_combinations() {
        let y = vars.add(variable().binary());
        constraints.push(constraint!(s_j >= e_i - 3.0 * m + m * y + m * p_i + m * p_j));
        constraints.push(constraint!(s_i >= e_j - 2.0 * m - m * y + m * p_i + m * p_j));
    }
}

/// Time-indexed cumulative: each interval gets one "starts at tick `t`"
/// binary per feasible `t`; `start` is tied to the selected tick, exactly one
/// tick is selected iff the interval is present, and occupancy at every tick
/// is bounded by `cap`.
fn add_cumulative(
    vars: &mut ProblemVariables,
    items: &[(Variable, Variable, f64, Variable)],
    h_ticks: f64,
    cap: u32,
    constraints: &mut Vec<Constraint>,
) {
    let horizon = h_ticks.round() as i64;
    let mut occupancy: HashMap<i64, Vec<Variable>> = HashMap::new();

    for &(start, _end, duration_ticks, presence) in items {
        let duration = duration_ticks.round() as i64;
        if duration > horizon {
            constraints.push(constraint!(presence == 0.0));
            continue;
        }
        let last_start = horizon - duration;

        let mut selectors = Vec::with_capacity((last_start + 1) as usize);
        for t in 0..=last_start {
            selectors.push((t, vars.add(variable().binary())));
        }

        let start_expr: Expression = selectors.iter().map(|&(t, x)| (t as f64) * x).sum();
        constraints.push(constraint!(start == start_expr));
        let total: Expression = selectors.iter().map(|&(_, x)| Expression::from(x)).sum();
        constraints.push(constraint!(total == presence));

        for &(t, x) in &selectors {
            for tick in t..(t + duration).min(horizon + 1) {
                occupancy.entry(tick).or_default().push(x);
            }
        }
    }

    for tick in 0..=horizon {
        if let Some(contributors) = occupancy.get(&tick) {
            let total: Expression = contributors.iter().map(|&x| Expression::from(x)).sum();
            constraints.push(constraint!(total <= cap as f64));
        }
    }
}
