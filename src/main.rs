use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;

use wbs_tracker::config::Settings;
use wbs_tracker::io;
use wbs_tracker::model::{ProcessedSchedule, Project, TaskId, TimelineViewport};
use wbs_tracker::schedule::{DragKind, NoCapture, ReleasePolicy, Rescheduler};

const USAGE: &str = "\
Usage: wbs-tracker <schedule.xml> [options]

Options:
  --status-date YYYY-MM-DD   Reference day for planned progress (default: today)
  --csv PATH                 Write a semicolon-delimited progress report
  --json                     Print the processed tree as JSON
  --shift ID:DAYS            Drag a task bar by DAYS (negative moves earlier)
  --stretch ID:DAYS          Drag a task's end handle by DAYS
  -h, --help                 Show this help";

/// A gesture to replay against the timeline before reporting.
struct Gesture {
    kind: DragKind,
    task: TaskId,
    days: i64,
}

struct Options {
    input: PathBuf,
    status_date: Option<NaiveDate>,
    csv: Option<PathBuf>,
    json: bool,
    gestures: Vec<Gesture>,
}

fn parse_gesture(kind: DragKind, value: &str) -> Result<Gesture, String> {
    let (id, days) = value
        .split_once(':')
        .ok_or_else(|| format!("Expected ID:DAYS, got '{}'", value))?;
    let task = id
        .trim()
        .parse::<u32>()
        .map(TaskId)
        .map_err(|_| format!("Invalid task id '{}'", id))?;
    let days = days
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("Invalid day count '{}'", days))?;
    Ok(Gesture { kind, task, days })
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Option<Options>, String> {
    let mut input = None;
    let mut status_date = None;
    let mut csv = None;
    let mut json = false;
    let mut gestures = Vec::new();

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .ok_or_else(|| format!("Missing value for {}", flag))
        };
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--status-date" => {
                let raw = value("--status-date")?;
                let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .map_err(|e| format!("Invalid status date '{}': {}", raw, e))?;
                status_date = Some(date);
            }
            "--csv" => csv = Some(PathBuf::from(value("--csv")?)),
            "--json" => json = true,
            "--shift" => gestures.push(parse_gesture(DragKind::Move, &value("--shift")?)?),
            "--stretch" => {
                gestures.push(parse_gesture(DragKind::ResizeEnd, &value("--stretch")?)?)
            }
            other if other.starts_with('-') => return Err(format!("Unknown option {}", other)),
            other => {
                if input.is_some() {
                    return Err(format!("Unexpected argument {}", other));
                }
                input = Some(PathBuf::from(other));
            }
        }
    }

    let input = input.ok_or_else(|| "Missing schedule file".to_string())?;
    Ok(Some(Options {
        input,
        status_date,
        csv,
        json,
        gestures,
    }))
}

/// Drive the drag state machine the way a pointer would and commit the result.
fn replay_gesture(
    project: &mut Project,
    gesture: &Gesture,
    viewport: &TimelineViewport,
    policy: ReleasePolicy,
    status_date: NaiveDate,
) -> Result<(), String> {
    let schedule = project.process(status_date);
    let node = schedule
        .find(gesture.task)
        .ok_or_else(|| format!("Task {} not found", gesture.task))?;

    let bar = viewport.bar_extent(&node.task);
    let press_x = match gesture.kind {
        DragKind::Move => (bar.left + bar.right) / 2.0,
        DragKind::ResizeStart => bar.left,
        DragKind::ResizeEnd => bar.right,
    };

    let mut machine = Rescheduler::new(policy);
    let kind = machine
        .pointer_down(node, press_x, viewport, &mut NoCapture)
        .ok_or_else(|| format!("Task {} cannot be rescheduled", gesture.task))?;
    if kind != gesture.kind {
        tracing::warn!(task = %gesture.task, ?kind, "Bar too narrow; grabbed a different zone");
    }

    let release_x = press_x + gesture.days as f32 * viewport.pixels_per_day;
    machine.pointer_move(release_x, viewport);
    match machine.pointer_up(release_x, viewport) {
        Some(change) => project.apply_change(&change).map_err(|e| e.to_string()),
        None => {
            tracing::info!(task = %gesture.task, days = gesture.days, "Gesture left the task unchanged");
            Ok(())
        }
    }
}

fn print_report(name: &str, schedule: &ProcessedSchedule) {
    println!("{} (status date {})", name, schedule.status_date);
    println!(
        "{:<40} {:>10} {:>10} {:>8} {:>8} {:>8}",
        "Task", "Start", "End", "Plan %", "Act %", "Var"
    );
    for (depth, node) in schedule.iter() {
        let label = format!("{}{}", "  ".repeat(depth), node.task.name);
        println!(
            "{:<40} {:>10} {:>10} {:>8.1} {:>8.1} {:>8.1}",
            label,
            node.task.start.format("%Y-%m-%d"),
            node.task.end.format("%Y-%m-%d"),
            node.planned_progress,
            node.actual_progress,
            node.variance,
        );
    }
    let summary = &schedule.summary;
    println!(
        "Project: planned {:.1}%, executed {:.1}%, variance {:+.1} ({})",
        summary.planned,
        summary.executed,
        summary.variance,
        summary.variance_band().label()
    );
}

fn run(options: Options, settings: &Settings) -> Result<(), String> {
    let outcome = io::import_file(&options.input).map_err(|e| e.to_string())?;
    for warning in &outcome.warnings {
        eprintln!("Skipped {}", warning);
    }

    let name = outcome.project_name.clone().unwrap_or_else(|| {
        options
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Imported Project")
            .to_string()
    });
    let mut project = Project::new(name).with_tasks(outcome.tasks);

    let today = chrono::Local::now().date_naive();
    let status_date = options.status_date.unwrap_or(today);
    let viewport = TimelineViewport::fit_to(project.tasks(), today)
        .with_pixels_per_day(settings.pixels_per_day);

    for gesture in &options.gestures {
        replay_gesture(
            &mut project,
            gesture,
            &viewport,
            settings.release_policy,
            status_date,
        )?;
    }

    let schedule = project.process(status_date);
    if options.json {
        let json = serde_json::to_string_pretty(&schedule).map_err(|e| e.to_string())?;
        println!("{}", json);
    } else {
        print_report(&project.name, &schedule);
    }

    if let Some(path) = &options.csv {
        io::export_progress_csv_file(&schedule, &project.name, path).map_err(|e| e.to_string())?;
    }

    if !outcome.warnings.is_empty() {
        eprintln!("{} task records skipped", outcome.warnings.len());
    }
    Ok(())
}

fn main() -> ExitCode {
    let settings = Settings::load();
    wbs_tracker::logging::init_logging(&settings.log_filter);

    let options = match parse_args(std::env::args().skip(1)) {
        Ok(Some(options)) => options,
        Ok(None) => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            return ExitCode::from(2);
        }
    };

    match run(options, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
