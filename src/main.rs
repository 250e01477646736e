use std::collections::HashMap;
use std::fs;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Deserialize;
use station_scheduler::{load_layout, ScheduleRequest};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedules a batch request against a station layout.
    Solve {
        /// Layout document: stations, operation recipes, travel times.
        #[arg(short, long)]
        layout_file: String,

        /// Request document: selected operations, weights, horizon, etc.
        #[arg(short, long)]
        request_file: String,

        /// Print the schedule as JSON instead of a human-readable table.
        #[arg(long)]
        json: bool,
    },
}

/// Mirrors `ScheduleRequest`, but as the wire shape the CLI accepts: every
/// field optional except the ones with no sane default.
#[derive(Debug, Deserialize)]
struct RequestDoc {
    selected_ops: Vec<String>,
    #[serde(default)]
    weights: HashMap<String, f64>,
    #[serde(default)]
    max_runs: HashMap<String, u32>,
    horizon_min: f64,
    #[serde(default)]
    station_caps: HashMap<String, u32>,
    #[serde(default)]
    earliest_starts: HashMap<String, f64>,
    #[serde(default)]
    latest_finishes: HashMap<String, f64>,
    #[serde(default = "default_time_unit")]
    time_unit: u32,
    #[serde(default)]
    precedence: HashMap<String, Vec<String>>,
}

fn default_time_unit() -> u32 {
    1
}

impl From<RequestDoc> for ScheduleRequest {
    fn from(doc: RequestDoc) -> Self {
        ScheduleRequest {
            selected_ops: doc.selected_ops,
            weights: doc.weights,
            max_runs: doc.max_runs,
            horizon_min: doc.horizon_min,
            station_caps: doc.station_caps,
            earliest_starts: doc.earliest_starts,
            latest_finishes: doc.latest_finishes,
            time_unit: doc.time_unit,
            precedence: doc.precedence,
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Solve { layout_file, request_file, json } => {
            if let Err(e) = run_solve(layout_file, request_file, *json) {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

fn run_solve(layout_file: &str, request_file: &str, as_json: bool) -> station_scheduler::Result<()> {
    let layout_doc = fs::read_to_string(layout_file)?;
    let request_doc = fs::read_to_string(request_file)?;

    let layout = load_layout(&layout_doc)?;
    let request: ScheduleRequest = serde_json::from_str::<RequestDoc>(&request_doc)?.into();

    let output = station_scheduler::solve(&layout, &request)?;

    if as_json {
        print_json(&output);
    } else {
        print_table(&output);
    }
    Ok(())
}

fn print_json(output: &station_scheduler::SolveOutput) {
    let entries: Vec<_> = output
        .schedule
        .iter()
        .map(|((job_id, idx), window)| {
            serde_json::json!({
                "job_id": job_id,
                "task_index": idx,
                "start_min": window.start_min,
                "end_min": window.end_min,
            })
        })
        .collect();
    let doc = serde_json::json!({
        "schedule": entries,
        "horizon_returned_min": output.horizon_returned_min,
    });
    println!("{}", serde_json::to_string_pretty(&doc).expect("schedule document always serializes"));
}

fn print_table(output: &station_scheduler::SolveOutput) {
    if output.schedule.is_empty() {
        println!("no feasible schedule for this request");
        return;
    }
    let mut rows: Vec<_> = output.schedule.iter().collect();
    rows.sort_by(|a, b| a.1.start_min.partial_cmp(&b.1.start_min).unwrap().then(a.0.cmp(b.0)));

    println!("{:<16} {:>6} {:>10} {:>10}", "job", "task", "start_min", "end_min");
    for ((job_id, idx), window) in rows {
        println!("{:<16} {:>6} {:>10.2} {:>10.2}", job_id, idx, window.start_min, window.end_min);
    }
    println!("horizon_returned_min = {:.2}", output.horizon_returned_min);
}
