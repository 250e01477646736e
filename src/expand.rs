//! Task Expander (C2): turns one operation recipe into a flat, ordered list
//! of elementary tasks. Pure and deterministic — no side effects, no shared
//! state, same inputs always give the same output.

use crate::domain::{ElementaryTask, Layout, OperationRecipe, TaskTemplate, SINK, SOURCE};

/// Flattens a recipe into PROCESS/MOVE tasks with no intermediate buffering:
/// load at `S`, move to the first real station, process/move through each
/// recipe step in turn, and finally move to `FIN`.
pub fn expand_basic(recipe: &OperationRecipe, layout: &Layout) -> TaskTemplate {
    let steps = &recipe.0;
    debug_assert!(!steps.is_empty(), "recipe must have at least one step");

    let next_station = |i: usize| -> &str {
        steps.get(i + 1).map_or(SINK, |step| step.station.as_str())
    };

    let mut tasks = Vec::with_capacity(steps.len() * 2);

    let first = &steps[0];
    tasks.push(ElementaryTask::process(
        SOURCE,
        first.min_duration_min,
        first.min_duration_min,
        first.max_duration_min,
    ));
    let first_next = next_station(0);
    tasks.push(ElementaryTask::mv(SOURCE, first_next, layout.travel_time(SOURCE, first_next)));

    for (i, step) in steps.iter().enumerate().skip(1) {
        if step.min_duration_min > 0.0 {
            tasks.push(ElementaryTask::process(
                &step.station,
                step.min_duration_min,
                step.min_duration_min,
                step.max_duration_min,
            ));
        }
        let next = next_station(i);
        tasks.push(ElementaryTask::mv(&step.station, next, layout.travel_time(&step.station, next)));
    }

    tasks
}

/// Round-robin buffer stations used by [`expand_with_storage`].
const STORAGE_BUFFERS: [&str; 3] = ["S14", "S15", "S16"];

/// Same recipe flattening as [`expand_basic`], but injects an explicit
/// `MOVE -> STORAGE -> MOVE` through a round-robin buffer between every pair
/// of adjacent recipe steps. Used by the batch/history path only; the
/// interactive scheduling path in this crate always calls [`expand_basic`].
pub fn expand_with_storage(recipe: &OperationRecipe, layout: &Layout) -> TaskTemplate {
    let steps = &recipe.0;
    let mut tasks = Vec::new();

    for (i, step) in steps.iter().enumerate() {
        if step.min_duration_min > 0.0 {
            tasks.push(ElementaryTask::process(
                &step.station,
                step.min_duration_min,
                step.min_duration_min,
                step.max_duration_min,
            ));
        }
        if let Some(next) = steps.get(i + 1) {
            let buffer = STORAGE_BUFFERS[i % STORAGE_BUFFERS.len()];
            tasks.push(ElementaryTask::mv(&step.station, buffer, layout.travel_time(&step.station, buffer)));
            tasks.push(ElementaryTask::storage(buffer));
            tasks.push(ElementaryTask::mv(buffer, &next.station, layout.travel_time(buffer, &next.station)));
        }
    }

    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RecipeStep, TaskKind};
    use std::collections::HashMap;

    fn layout_with_travel(pairs: &[((&str, &str), f64)]) -> Layout {
        let mut travel_times: HashMap<String, HashMap<String, f64>> = HashMap::new();
        for &((from, to), minutes) in pairs {
            travel_times.entry(from.to_string()).or_default().insert(to.to_string(), minutes);
        }
        Layout { travel_times, ..Layout::default() }
    }

    fn recipe(steps: &[(&str, f64, f64)]) -> OperationRecipe {
        OperationRecipe(
            steps
                .iter()
                .map(|&(station, min, max)| RecipeStep {
                    station: station.to_string(),
                    min_duration_min: min,
                    max_duration_min: max,
                })
                .collect(),
        )
    }

    #[test]
    fn basic_expansion_matches_scenario_one() {
        let layout = layout_with_travel(&[(("S", "M1"), 3.0), (("M1", "FIN"), 2.0)]);
        let tasks = expand_basic(&recipe(&[("S", 5.0, 5.0), ("M1", 10.0, 10.0)]), &layout);

        assert_eq!(tasks.len(), 4);
        assert_eq!(tasks[0].kind, TaskKind::Process);
        assert_eq!(tasks[0].station.as_deref(), Some("S"));
        assert_eq!(tasks[0].duration_min, 5.0);

        assert_eq!(tasks[1].kind, TaskKind::Move);
        assert_eq!(tasks[1].from_station.as_deref(), Some("S"));
        assert_eq!(tasks[1].to_station.as_deref(), Some("M1"));
        assert_eq!(tasks[1].duration_min, 3.0);

        assert_eq!(tasks[2].kind, TaskKind::Process);
        assert_eq!(tasks[2].station.as_deref(), Some("M1"));
        assert_eq!(tasks[2].duration_min, 10.0);

        assert_eq!(tasks[3].kind, TaskKind::Move);
        assert_eq!(tasks[3].from_station.as_deref(), Some("M1"));
        assert_eq!(tasks[3].to_station.as_deref(), Some("FIN"));
        assert_eq!(tasks[3].duration_min, 2.0);
    }

    #[test]
    fn zero_duration_step_emits_no_process_task() {
        let layout = Layout::default();
        let tasks = expand_basic(&recipe(&[("S", 0.0, 0.0), ("M1", 0.0, 0.0)]), &layout);
        // PROCESS(S), MOVE(S->M1), no PROCESS(M1) since min==0, MOVE(M1->FIN)
        assert_eq!(tasks.len(), 3);
        assert!(tasks.iter().all(|t| t.station.as_deref() != Some("M1") || t.kind != TaskKind::Process));
    }

    #[test]
    fn default_travel_time_is_one_minute() {
        let layout = Layout::default();
        let tasks = expand_basic(&recipe(&[("S", 1.0, 1.0), ("M1", 1.0, 1.0)]), &layout);
        assert_eq!(tasks[1].duration_min, 1.0);
        assert_eq!(tasks[3].duration_min, 1.0);
    }

    #[test]
    fn storage_variant_injects_buffers_between_every_step() {
        let layout = Layout::default();
        let tasks = expand_with_storage(&recipe(&[("S", 2.0, 2.0), ("M1", 3.0, 3.0), ("M2", 4.0, 4.0)]), &layout);

        let storages: Vec<_> = tasks.iter().filter(|t| t.kind == TaskKind::Storage).collect();
        assert_eq!(storages.len(), 2);
        assert_eq!(storages[0].station.as_deref(), Some("S14"));
        assert_eq!(storages[1].station.as_deref(), Some("S15"));
    }
}
