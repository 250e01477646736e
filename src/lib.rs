//! Station-scheduler: throughput-first, then-earliest-finish scheduling of
//! batch operations across a fixed station layout.
//!
//! The public surface is intentionally small: parse a layout (`provider`),
//! describe a batch request (`domain::ScheduleRequest`), call [`solve`].
//! Everything else — task expansion, MILP construction, the solver driver,
//! and result projection — is an implementation detail reachable for
//! testing and for the CLI front-end, but not part of the contract.

pub mod domain;
pub mod error;
pub mod expand;
pub mod model;
pub mod project;
pub mod provider;
pub mod solve;

pub use domain::{ElementaryTask, Layout, OperationRecipe, RecipeStep, ScheduleRequest, Station, TaskKind};
pub use error::{Result, ScheduleError};
pub use project::{SolveOutput, TaskMetadata, TaskWindow};
pub use provider::load_layout;

/// Schedules `request` against `layout`: builds the MILP, solves it within
/// the fixed time budget, and projects the result to plain minutes.
///
/// Returns `Ok` with an empty [`SolveOutput`] (horizon 0) when the request
/// has no feasible schedule — infeasibility is a normal outcome, not an
/// error. Only configuration faults and solver-backend failures are `Err`.
pub fn solve(layout: &Layout, request: &ScheduleRequest) -> Result<SolveOutput> {
    solve::solve(layout, request)
}
