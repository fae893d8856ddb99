//! Planned progress, rollups and variance.
//!
//! Everything here is a pure function of the forest and the status date.
//! Children are finalised before their parent aggregates them.

use chrono::NaiveDate;

use crate::model::{ProcessedSchedule, ProcessedTask, ProjectSummary, Task};

/// Planned completion of a bar at `status_date`, in percent.
///
/// Linear over the inclusive day span: 100 on or after the end day, else 0
/// on or before the start day. A bar that starts and ends on the same day
/// is therefore complete on that day.
pub fn planned_progress(start: NaiveDate, end: NaiveDate, status_date: NaiveDate) -> f64 {
    if status_date >= end {
        return 100.0;
    }
    if status_date <= start {
        return 0.0;
    }
    let span = (end - start).num_days() + 1;
    let elapsed = (status_date - start).num_days();
    (elapsed as f64 / span as f64 * 100.0).clamp(0.0, 100.0)
}

/// Weighted mean of `(weight, value)` pairs.
///
/// Falls back to the plain mean when the weights sum to zero, and to 0.0
/// for an empty input.
pub fn weighted_mean<I>(items: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let items: Vec<(f64, f64)> = items.into_iter().collect();
    if items.is_empty() {
        return 0.0;
    }

    let total_weight: f64 = items.iter().map(|(w, _)| w.max(0.0)).sum();
    if total_weight > 0.0 {
        items.iter().map(|(w, v)| w.max(0.0) * v).sum::<f64>() / total_weight
    } else {
        items.iter().map(|(_, v)| v).sum::<f64>() / items.len() as f64
    }
}

fn process_node(task: &Task, status_date: NaiveDate) -> ProcessedTask {
    let children: Vec<ProcessedTask> = task
        .children
        .iter()
        .map(|child| process_node(child, status_date))
        .collect();

    let (planned, actual) = if task.is_leaf() {
        (
            planned_progress(task.start, task.end, status_date),
            task.percent_complete.clamp(0.0, 100.0),
        )
    } else {
        (
            weighted_mean(
                children
                    .iter()
                    .map(|c| (c.task.duration as f64, c.planned_progress)),
            ),
            weighted_mean(
                children
                    .iter()
                    .map(|c| (c.task.duration as f64, c.actual_progress)),
            ),
        )
    };

    ProcessedTask {
        task: task.detached(),
        planned_progress: planned,
        actual_progress: actual,
        variance: actual - planned,
        children,
    }
}

/// Derive progress for every node of the forest.
pub fn compute_progress(forest: &[Task], status_date: NaiveDate) -> Vec<ProcessedTask> {
    forest
        .iter()
        .map(|root| process_node(root, status_date))
        .collect()
}

/// Project figures: one more duration-weighted pass over the roots only.
pub fn summarize_project(roots: &[ProcessedTask]) -> ProjectSummary {
    let planned = weighted_mean(
        roots
            .iter()
            .map(|r| (r.task.duration as f64, r.planned_progress)),
    );
    let executed = weighted_mean(
        roots
            .iter()
            .map(|r| (r.task.duration as f64, r.actual_progress)),
    );
    ProjectSummary {
        planned,
        executed,
        variance: executed - planned,
    }
}

/// Progress for the whole forest plus the project summary.
pub fn process_schedule(forest: &[Task], status_date: NaiveDate) -> ProcessedSchedule {
    let roots = compute_progress(forest, status_date);
    let summary = summarize_project(&roots);
    ProcessedSchedule {
        status_date,
        roots,
        summary,
    }
}
