use chrono::NaiveDate;
use serde::Serialize;

use super::task::{Task, TaskId};

/// How far behind plan a node is. Informational; the engine never acts on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VarianceBand {
    SeverelyBehind,
    Behind,
    OnTrack,
}

impl VarianceBand {
    pub fn from_variance(variance: f64) -> Self {
        if variance < -10.0 {
            VarianceBand::SeverelyBehind
        } else if variance < 0.0 {
            VarianceBand::Behind
        } else {
            VarianceBand::OnTrack
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VarianceBand::SeverelyBehind => "Severely behind",
            VarianceBand::Behind => "Behind",
            VarianceBand::OnTrack => "On track",
        }
    }
}

/// Derived view of a task at a status date. Rebuilt wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedTask {
    /// The source record with its subtree detached.
    pub task: Task,
    pub planned_progress: f64,
    pub actual_progress: f64,
    /// `actual_progress - planned_progress`, signed.
    pub variance: f64,
    pub children: Vec<ProcessedTask>,
}

impl ProcessedTask {
    pub fn id(&self) -> TaskId {
        self.task.id
    }

    pub fn is_summary(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn variance_band(&self) -> VarianceBand {
        VarianceBand::from_variance(self.variance)
    }
}

/// Project-wide figures aggregated over the root tasks.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ProjectSummary {
    pub planned: f64,
    pub executed: f64,
    pub variance: f64,
}

impl ProjectSummary {
    pub fn variance_band(&self) -> VarianceBand {
        VarianceBand::from_variance(self.variance)
    }
}

/// Output of one rebuild + recompute pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedSchedule {
    pub status_date: NaiveDate,
    pub roots: Vec<ProcessedTask>,
    pub summary: ProjectSummary,
}

impl ProcessedSchedule {
    /// Pre-order walk over every node, paired with its depth (0 = root).
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder {
            stack: self.roots.iter().rev().map(|n| (0, n)).collect(),
        }
    }

    pub fn find(&self, id: TaskId) -> Option<&ProcessedTask> {
        self.iter().map(|(_, n)| n).find(|n| n.id() == id)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

pub struct PreOrder<'a> {
    stack: Vec<(usize, &'a ProcessedTask)>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = (usize, &'a ProcessedTask);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|c| (depth + 1, c)));
        Some((depth, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variance_bands_follow_thresholds() {
        assert_eq!(VarianceBand::from_variance(-10.5), VarianceBand::SeverelyBehind);
        assert_eq!(VarianceBand::from_variance(-10.0), VarianceBand::Behind);
        assert_eq!(VarianceBand::from_variance(-0.1), VarianceBand::Behind);
        assert_eq!(VarianceBand::from_variance(0.0), VarianceBand::OnTrack);
        assert_eq!(VarianceBand::from_variance(12.0), VarianceBand::OnTrack);
    }
}
