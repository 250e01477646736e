//! Solver Driver (C4): hands the built MILP to the backend and classifies
//! the outcome. Infeasibility is not an error (see `crate::error`) — it is
//! reported as an empty, zero-horizon [`crate::project::SolveOutput`].

use good_lp::{variables, ResolutionError, Solution, SolverModel};
use log::{error, info, warn};

use crate::domain::{Layout, ScheduleRequest};
use crate::error::Result;
use crate::model::{self, BuiltModel};
use crate::project::{self, SolveOutput};

/// Worker count and wall-clock budget are fixed by design; the bundled MILP
/// backend used by this crate does not expose either knob through the
/// modeling layer, so there is nothing further to set here.
const SOLVE_TIME_BUDGET_SECS: u64 = 60;

pub fn solve(layout: &Layout, request: &ScheduleRequest) -> Result<SolveOutput> {
    let mut vars = variables!();
    let (built, objective, constraints): (BuiltModel, _, _) = model::build(&mut vars, layout, request)?;

    info!(
        "solving {} jobs over a {} tick horizon (budget {}s)",
        built.jobs.len(),
        built.h_ticks,
        SOLVE_TIME_BUDGET_SECS
    );

    let problem = constraints
        .into_iter()
        .fold(vars.maximise(objective).using(good_lp::default_solver), |problem, c| problem.with(c));

    match problem.solve() {
        Ok(solution) => Ok(project::project(&built, &solution)),
        Err(ResolutionError::Infeasible) => {
            warn!("no feasible schedule for this request");
            Ok(project::empty_output(&built))
        }
        Err(e) => {
            error!("solver backend fault: {e}");
            Err(crate::error::ScheduleError::Solver(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OperationRecipe, RecipeStep, Station};
    use std::collections::HashMap;

    fn tiny_layout() -> Layout {
        let mut operations = HashMap::new();
        operations.insert(
            "op1".to_string(),
            OperationRecipe(vec![
                RecipeStep { station: "S".into(), min_duration_min: 1.0, max_duration_min: 1.0 },
                RecipeStep { station: "M1".into(), min_duration_min: 2.0, max_duration_min: 2.0 },
            ]),
        );
        let mut stations = HashMap::new();
        stations.insert("M1".to_string(), Station::default());
        Layout { stations, operations, travel_times: HashMap::new() }
    }

    #[test]
    fn builds_and_folds_constraints_without_panicking() {
        // Exercises model::build + the constraint-folding chain up to (but not
        // including) the actual `.solve()` call, which needs a real backend.
        let layout = tiny_layout();
        let request = ScheduleRequest {
            selected_ops: vec!["op1".to_string()],
            horizon_min: 20.0,
            time_unit: 1,
            ..Default::default()
        };
        let mut vars = variables!();
        let (_, objective, constraints) = model::build(&mut vars, &layout, &request).unwrap();
        let problem = constraints
            .into_iter()
            .fold(vars.maximise(objective).using(good_lp::default_solver), |p, c| p.with(c));
        let _ = problem;
    }
}
