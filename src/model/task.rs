use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique id of a task, taken from the interchange document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u32);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single work package (or summary) in the breakdown structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Inclusive day count, kept in step with `start`/`end`.
    pub duration: i64,
    /// Actual progress from 0.0 to 100.0. Only meaningful on leaves.
    pub percent_complete: f64,
    pub is_summary: bool,
    /// WBS depth, 1 = top level. Raw value; see `schedule::effective_level`.
    pub outline_level: i32,
    /// Predecessor ids. Informational only.
    #[serde(default)]
    pub dependencies: Vec<TaskId>,
    #[serde(default)]
    pub children: Vec<Task>,
}

impl Task {
    /// Create a top-level leaf task with no progress.
    pub fn new(id: TaskId, name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        let end = end.max(start);
        Self {
            id,
            name: name.into(),
            start,
            end,
            duration: span_days(start, end),
            percent_complete: 0.0,
            is_summary: false,
            outline_level: 1,
            dependencies: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_level(mut self, outline_level: i32) -> Self {
        self.outline_level = outline_level;
        self
    }

    pub fn with_progress(mut self, percent_complete: f64) -> Self {
        self.percent_complete = percent_complete.clamp(0.0, 100.0);
        self
    }

    pub fn as_summary(mut self) -> Self {
        self.is_summary = true;
        self
    }

    /// Inclusive number of calendar days covered by the bar.
    pub fn span_days(&self) -> i64 {
        span_days(self.start, self.end)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Clone of this record without its subtree.
    pub fn detached(&self) -> Task {
        Task {
            id: self.id,
            name: self.name.clone(),
            start: self.start,
            end: self.end,
            duration: self.duration,
            percent_complete: self.percent_complete,
            is_summary: self.is_summary,
            outline_level: self.outline_level,
            dependencies: self.dependencies.clone(),
            children: Vec::new(),
        }
    }

    /// Move the bar to new dates.
    ///
    /// The duration changes by exactly as many days as the span does, so an
    /// imported duration that rounded up a partial day survives a plain move.
    pub fn reschedule(&mut self, start: NaiveDate, end: NaiveDate) {
        let growth = span_days(start, end) - self.span_days();
        self.start = start;
        self.end = end;
        self.duration = (self.duration + growth).max(1);
    }
}

fn span_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}
