use chrono::{DateTime, NaiveDate, Utc};

use super::processed::ProcessedSchedule;
use super::task::Task;
use crate::error::ScheduleError;
use crate::schedule::{self, ScheduleChange};

/// A project holding the authoritative flat task list.
///
/// The list is in outline pre-order. The tree and every derived figure are
/// rebuilt from it on demand; nothing here is patched in place.
#[derive(Debug, Clone)]
pub struct Project {
    pub name: String,
    tasks: Vec<Task>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            name: "Untitled Project".to_string(),
            tasks: Vec::new(),
            created: Utc::now(),
            modified: Utc::now(),
        }
    }
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.replace_tasks(tasks);
        self
    }

    /// The flat list, in outline pre-order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Supersede the whole flat list, e.g. after an import.
    pub fn replace_tasks(&mut self, tasks: Vec<Task>) {
        tracing::debug!(count = tasks.len(), "Replacing task list");
        self.tasks = tasks;
        self.touch();
    }

    /// Commit a reschedule by building a new flat list and swapping it in.
    pub fn apply_change(&mut self, change: &ScheduleChange) -> Result<(), ScheduleError> {
        if change.start >= change.end {
            return Err(ScheduleError::InvalidRange {
                start: change.start,
                end: change.end,
            });
        }
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == change.task)
            .ok_or(ScheduleError::UnknownTask(change.task))?;
        if self.has_children(index) {
            return Err(ScheduleError::SummaryTask(change.task));
        }

        let next: Vec<Task> = self
            .tasks
            .iter()
            .map(|t| {
                let mut t = t.clone();
                if t.id == change.task {
                    t.reschedule(change.start, change.end);
                }
                t
            })
            .collect();

        tracing::info!(
            task = %change.task,
            start = %change.start,
            end = %change.end,
            "Committed reschedule"
        );
        self.replace_tasks(next);
        Ok(())
    }

    /// Whether the entry at `index` is a summary, flagged or by outline.
    ///
    /// In pre-order the first child, if any, is the very next entry.
    fn has_children(&self, index: usize) -> bool {
        let task = &self.tasks[index];
        task.is_summary
            || self.tasks.get(index + 1).is_some_and(|next| {
                schedule::effective_level(next.outline_level)
                    > schedule::effective_level(task.outline_level)
            })
    }

    /// Rebuild the tree from the flat list and compute progress at `status_date`.
    pub fn process(&self, status_date: NaiveDate) -> ProcessedSchedule {
        let forest = schedule::build_tree(self.tasks.clone());
        schedule::process_schedule(&forest, status_date)
    }

    /// Touch the modified timestamp.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskId;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample() -> Project {
        Project::new("Site").with_tasks(vec![
            Task::new(TaskId(1), "Shell", d(2024, 1, 1), d(2024, 1, 31)).as_summary(),
            Task::new(TaskId(2), "Foundations", d(2024, 1, 1), d(2024, 1, 10))
                .with_level(2)
                .with_progress(100.0),
            Task::new(TaskId(3), "Walls", d(2024, 1, 11), d(2024, 1, 31))
                .with_level(2)
                .with_progress(20.0),
        ])
    }

    #[test]
    fn apply_change_replaces_dates_and_duration() {
        let mut project = sample();
        let change = ScheduleChange {
            task: TaskId(3),
            start: d(2024, 1, 15),
            end: d(2024, 2, 4),
        };
        project.apply_change(&change).unwrap();
        let walls = &project.tasks()[2];
        assert_eq!(walls.start, d(2024, 1, 15));
        assert_eq!(walls.end, d(2024, 2, 4));
        assert_eq!(walls.duration, 21);
        assert_eq!(project.tasks().len(), 3);
    }

    #[test]
    fn apply_change_rejects_unknown_and_summary_tasks() {
        let mut project = sample();
        let unknown = ScheduleChange {
            task: TaskId(99),
            start: d(2024, 1, 1),
            end: d(2024, 1, 2),
        };
        assert!(matches!(
            project.apply_change(&unknown),
            Err(ScheduleError::UnknownTask(TaskId(99)))
        ));

        let summary = ScheduleChange {
            task: TaskId(1),
            start: d(2024, 1, 1),
            end: d(2024, 1, 2),
        };
        assert!(matches!(
            project.apply_change(&summary),
            Err(ScheduleError::SummaryTask(TaskId(1)))
        ));
    }

    #[test]
    fn apply_change_rejects_unflagged_parent() {
        let mut project = Project::new("Site").with_tasks(vec![
            Task::new(TaskId(1), "Envelope", d(2024, 1, 1), d(2024, 1, 31)),
            Task::new(TaskId(2), "Cladding", d(2024, 1, 1), d(2024, 1, 31)).with_level(2),
            Task::new(TaskId(3), "Glazing", d(2024, 2, 1), d(2024, 2, 10)),
        ]);
        let parent = ScheduleChange {
            task: TaskId(1),
            start: d(2024, 1, 5),
            end: d(2024, 2, 4),
        };
        assert!(matches!(
            project.apply_change(&parent),
            Err(ScheduleError::SummaryTask(TaskId(1)))
        ));

        let leaf = ScheduleChange {
            task: TaskId(3),
            start: d(2024, 2, 2),
            end: d(2024, 2, 11),
        };
        project.apply_change(&leaf).unwrap();
        assert_eq!(project.tasks()[2].start, d(2024, 2, 2));
    }

    #[test]
    fn apply_change_rejects_empty_range() {
        let mut project = sample();
        let change = ScheduleChange {
            task: TaskId(2),
            start: d(2024, 1, 5),
            end: d(2024, 1, 5),
        };
        assert!(matches!(
            project.apply_change(&change),
            Err(ScheduleError::InvalidRange { .. })
        ));
        assert_eq!(project.tasks()[1].start, d(2024, 1, 1));
    }

    #[test]
    fn process_rebuilds_tree() {
        let project = sample();
        let schedule = project.process(d(2024, 2, 1));
        assert_eq!(schedule.roots.len(), 1);
        assert_eq!(schedule.roots[0].children.len(), 2);
        assert_eq!(schedule.roots[0].planned_progress, 100.0);
    }
}
