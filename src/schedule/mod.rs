pub mod hierarchy;
pub mod progress;
pub mod reschedule;

pub use hierarchy::{build_tree, effective_level, flatten};
pub use progress::{
    compute_progress, planned_progress, process_schedule, summarize_project, weighted_mean,
};
pub use reschedule::{
    candidate_dates, drag_days, hit_test, DragKind, DragOrigin, DragState, NoCapture,
    PointerCapture, ReleasePolicy, Rescheduler, ScheduleChange,
};
