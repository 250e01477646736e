//! Core data model: stations, recipes, elementary tasks and batch requests.
//!
//! Everything here is a plain, immutable-once-built value. The Model Builder
//! (`crate::model`) is the only thing that turns these into solver variables;
//! nothing in this module knows that a solver exists.

use std::collections::HashMap;

use crate::error::{Result, ScheduleError};

/// Reserved station key for the system source/sink start.
pub const SOURCE: &str = "S";
/// Reserved station key for the virtual finish.
pub const SINK: &str = "FIN";

/// A processing station. `x`/`row` are layout hints consumed only by the
/// (out of scope) GUI; the core never reads them.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub capacity: u32,
    pub x: f64,
    pub row: f64,
}

impl Default for Station {
    fn default() -> Self {
        Station { capacity: 1, x: 0.0, row: 0.0 }
    }
}

/// One step of an operation recipe: visit `station` for somewhere between
/// `min_duration_min` and `max_duration_min` minutes.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeStep {
    pub station: String,
    pub min_duration_min: f64,
    pub max_duration_min: f64,
}

/// An ordered sequence of recipe steps, the first of which is always at
/// [`SOURCE`].
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecipe(pub Vec<RecipeStep>);

/// The immutable layout: stations, their recipes, and inter-station travel
/// times. Built once by the Data Provider and passed by reference to every
/// downstream component.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub stations: HashMap<String, Station>,
    pub operations: HashMap<String, OperationRecipe>,
    pub travel_times: HashMap<String, HashMap<String, f64>>,
}

impl Layout {
    pub fn operation(&self, id: &str) -> Result<&OperationRecipe> {
        self.operations
            .get(id)
            .ok_or_else(|| ScheduleError::UnknownOperation(id.to_string()))
    }

    /// Travel time in minutes from `from` to `to`, defaulting to 1.0 when the
    /// pair is not declared. Not assumed symmetric.
    pub fn travel_time(&self, from: &str, to: &str) -> f64 {
        self.travel_times
            .get(from)
            .and_then(|m| m.get(to))
            .copied()
            .unwrap_or(1.0)
    }
}

/// The kind of an elementary task emitted by the Task Expander.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Process,
    Move,
    Storage,
}

/// One elementary task in a job's flattened template: a `PROCESS` step at a
/// station, a `MOVE` between two stations, or (storage-buffer variant only)
/// a zero-duration `STORAGE` hold.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementaryTask {
    pub kind: TaskKind,
    pub station: Option<String>,
    pub from_station: Option<String>,
    pub to_station: Option<String>,
    pub duration_min: f64,
    pub min_duration_min: Option<f64>,
    pub max_duration_min: Option<f64>,
}

impl ElementaryTask {
    pub fn process(station: &str, duration_min: f64, min: f64, max: f64) -> Self {
        ElementaryTask {
            kind: TaskKind::Process,
            station: Some(station.to_string()),
            from_station: None,
            to_station: None,
            duration_min,
            min_duration_min: Some(min),
            max_duration_min: Some(max),
        }
    }

    pub fn mv(from: &str, to: &str, duration_min: f64) -> Self {
        ElementaryTask {
            kind: TaskKind::Move,
            station: None,
            from_station: Some(from.to_string()),
            to_station: Some(to.to_string()),
            duration_min,
            min_duration_min: None,
            max_duration_min: None,
        }
    }

    pub fn storage(station: &str) -> Self {
        ElementaryTask {
            kind: TaskKind::Storage,
            station: Some(station.to_string()),
            from_station: None,
            to_station: None,
            duration_min: 0.0,
            min_duration_min: None,
            max_duration_min: None,
        }
    }

    /// The station whose capacity this task occupies, if any: a `PROCESS`
    /// or `STORAGE` station, or a `MOVE`'s destination. `None` is never
    /// returned for a well-formed task, but callers still filter out `S`
    /// and `FIN` themselves since those are unlimited.
    pub fn capacity_station(&self) -> Option<&str> {
        match self.kind {
            TaskKind::Process | TaskKind::Storage => self.station.as_deref(),
            TaskKind::Move => self.to_station.as_deref(),
        }
    }
}

pub type TaskTemplate = Vec<ElementaryTask>;

/// A batch request: which operations to schedule, how many times, under
/// which time windows and precedences. Maps directly onto the parameters of
/// the `solve` entry point.
#[derive(Debug, Clone, Default)]
pub struct ScheduleRequest {
    pub selected_ops: Vec<String>,
    pub weights: HashMap<String, f64>,
    pub max_runs: HashMap<String, u32>,
    pub horizon_min: f64,
    pub station_caps: HashMap<String, u32>,
    /// May contain the reserved key `"program_start"`.
    pub earliest_starts: HashMap<String, f64>,
    pub latest_finishes: HashMap<String, f64>,
    pub time_unit: u32,
    pub precedence: HashMap<String, Vec<String>>,
}

impl ScheduleRequest {
    pub fn program_start(&self) -> f64 {
        self.earliest_starts.get("program_start").copied().unwrap_or(0.0)
    }
}
