//! Work breakdown structure scheduling engine.
//!
//! The flat, outline-ordered task list is the only source of truth. Trees,
//! progress rollups and variances are rebuilt from it at a status date, and
//! drag gestures on the timeline produce date changes that replace the list.

pub mod config;
pub mod error;
pub mod io;
pub mod logging;
pub mod model;
pub mod schedule;

pub use error::{ExportError, ImportError, ScheduleError};
pub use model::{
    ProcessedSchedule, ProcessedTask, Project, ProjectSummary, Task, TaskId, TimelineViewport,
    VarianceBand,
};
pub use schedule::{build_tree, compute_progress, flatten, Rescheduler, ScheduleChange};
