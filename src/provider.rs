//! Data Provider (C1): parses the read-only layout document (stations,
//! operation recipes, travel times) into a [`Layout`]. The core library never
//! touches the filesystem itself — the caller supplies the document text, so
//! file discovery and path resolution stay a CLI/front-end concern.

use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::{Layout, OperationRecipe, RecipeStep, Station, SOURCE};
use crate::error::{Result, ScheduleError};

#[derive(Debug, Deserialize)]
struct StationDoc {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    row: f64,
    #[serde(default = "default_capacity")]
    capacity: u32,
}

fn default_capacity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct LayoutDoc {
    stations: HashMap<String, StationDoc>,
    operations: HashMap<String, Vec<(String, f64, f64)>>,
    #[serde(rename = "Travel_Times", default)]
    travel_times: HashMap<String, HashMap<String, f64>>,
}

/// Parses a layout document (`stations`/`operations`/`Travel_Times`
/// top-level sections) into a [`Layout`].
///
/// `S` and `FIN` are treated as reserved, unlimited-capacity stations
/// regardless of what (if anything) the document says about them.
pub fn load_layout(document: &str) -> Result<Layout> {
    let doc: LayoutDoc = serde_json::from_str(document)?;

    let stations = doc
        .stations
        .into_iter()
        .map(|(id, s)| {
            (
                id,
                Station {
                    capacity: s.capacity,
                    x: s.x,
                    row: s.row,
                },
            )
        })
        .collect();

    let mut operations = HashMap::with_capacity(doc.operations.len());
    for (op_id, steps) in doc.operations {
        operations.insert(op_id.clone(), parse_recipe(&op_id, steps)?);
    }

    Ok(Layout {
        stations,
        operations,
        travel_times: doc.travel_times,
    })
}

fn parse_recipe(op_id: &str, steps: Vec<(String, f64, f64)>) -> Result<OperationRecipe> {
    if steps.is_empty() {
        return Err(ScheduleError::MalformedRecipe(op_id.to_string(), "recipe has no steps".into()));
    }

    let mut recipe_steps = Vec::with_capacity(steps.len());
    for (station, min, max) in steps {
        if min < 0.0 || max < 0.0 {
            return Err(ScheduleError::NegativeDuration(op_id.to_string(), min.min(max)));
        }
        if max < min {
            return Err(ScheduleError::MalformedRecipe(
                op_id.to_string(),
                format!("max duration {max} is less than min duration {min} at station `{station}`"),
            ));
        }
        recipe_steps.push(RecipeStep {
            station,
            min_duration_min: min,
            max_duration_min: max,
        });
    }

    if recipe_steps[0].station != SOURCE {
        return Err(ScheduleError::MalformedRecipe(
            op_id.to_string(),
            format!("first step must be at station `{SOURCE}`, found `{}`", recipe_steps[0].station),
        ));
    }

    Ok(OperationRecipe(recipe_steps))
}
