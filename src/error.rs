use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::TaskId;

/// Fatal import failures. Dropped records are not errors; see `ImportWarning`.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed schedule document: {0}")]
    Malformed(String),

    #[error("No valid tasks found in schedule ({dropped} records skipped)")]
    NoValidTasks { dropped: usize },
}

/// Rejected changes to the authoritative task list.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Task {0} does not exist")]
    UnknownTask(TaskId),

    #[error("Task {0} is a summary; its dates are derived")]
    SummaryTask(TaskId),

    #[error("Invalid date range {start} .. {end}: start must precede end")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// Failures while writing a progress report.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}
