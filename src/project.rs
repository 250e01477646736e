//! Schedule Projector (C5): turns a solved (or infeasible) [`BuiltModel`]
//! into plain, solver-agnostic output — floating-point minutes, no `Variable`
//! handles, safe to serialize or hand back across the public API boundary.

use std::collections::HashMap;

use good_lp::Solution;

use crate::model::BuiltModel;

/// One task's timing and descriptive metadata, keyed by `(job_id, task_index)`
/// in [`SolveOutput::schedule`] and [`SolveOutput::task_metadata`].
#[derive(Debug, Clone, PartialEq)]
pub struct TaskWindow {
    pub start_min: f64,
    pub end_min: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskMetadata {
    pub kind: crate::domain::TaskKind,
    pub station: Option<String>,
    pub from_station: Option<String>,
    pub to_station: Option<String>,
    pub present: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolveOutput {
    pub schedule: HashMap<(String, usize), TaskWindow>,
    pub task_metadata: HashMap<(String, usize), TaskMetadata>,
    pub horizon_returned_min: f64,
}

/// Projects a solved model: only tasks belonging to present jobs are
/// included in `schedule`, but `task_metadata` carries every task the model
/// built (present or not) so callers can see what was considered.
pub fn project(built: &BuiltModel, solution: &impl Solution) -> SolveOutput {
    let mut schedule = HashMap::new();
    let mut task_metadata = HashMap::new();

    for job in &built.jobs {
        let present = solution.value(job.presence) >= 0.5;
        for (idx, tv) in job.tasks.iter().enumerate() {
            let key = (job.job_id.clone(), idx);
            if present {
                schedule.insert(
                    key.clone(),
                    TaskWindow {
                        start_min: solution.value(tv.start) / built.time_unit,
                        end_min: solution.value(tv.end) / built.time_unit,
                    },
                );
            }
            task_metadata.insert(
                key,
                TaskMetadata {
                    kind: tv.task.kind,
                    station: tv.task.station.clone(),
                    from_station: tv.task.from_station.clone(),
                    to_station: tv.task.to_station.clone(),
                    present,
                },
            );
        }
    }

    SolveOutput { schedule, task_metadata, horizon_returned_min: built.h_ticks / built.time_unit }
}

/// The result of an infeasible (or timed-out-with-nothing-found) solve: an
/// empty schedule, full task metadata marked absent, and a zero horizon —
/// the caller distinguishes this from success by the empty map.
pub fn empty_output(built: &BuiltModel) -> SolveOutput {
    let mut task_metadata = HashMap::new();
    for job in &built.jobs {
        for (idx, tv) in job.tasks.iter().enumerate() {
            task_metadata.insert(
                (job.job_id.clone(), idx),
                TaskMetadata {
                    kind: tv.task.kind,
                    station: tv.task.station.clone(),
                    from_station: tv.task.from_station.clone(),
                    to_station: tv.task.to_station.clone(),
                    present: false,
                },
            );
        }
    }
    SolveOutput { schedule: HashMap::new(), task_metadata, horizon_returned_min: 0.0 }
}
