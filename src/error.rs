//! Typed errors for configuration/input faults and opaque solver faults.
//!
//! Infeasibility is *not* represented here: per the scheduling contract, an
//! unsolvable request is a first-class `Ok` result (empty schedule, horizon
//! 0), not an error. See [`crate::solve`].

use thiserror::Error;

/// Everything that can go wrong before or during a solve attempt, other than
/// the request simply having no feasible schedule.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("station `{0}` is not declared in the layout")]
    UnknownStation(String),

    #[error("operation `{0}` is not declared in the layout")]
    UnknownOperation(String),

    #[error("malformed recipe for operation `{0}`: {1}")]
    MalformedRecipe(String, String),

    #[error("operation `{0}` has a negative duration ({1} min)")]
    NegativeDuration(String, f64),

    #[error("precedence references job `{0}`, which was never instantiated")]
    UnknownPrecedenceReference(String),

    #[error("failed to parse layout document: {0}")]
    Config(#[from] serde_json::Error),

    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("solver backend error: {0}")]
    Solver(String),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
