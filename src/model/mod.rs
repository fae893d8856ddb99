pub mod processed;
pub mod project;
pub mod task;
pub mod timeline;

pub use processed::{ProcessedSchedule, ProcessedTask, ProjectSummary, VarianceBand};
pub use project::Project;
pub use task::{Task, TaskId};
pub use timeline::{BarExtent, TimelineViewport};
