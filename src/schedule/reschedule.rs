//! Drag-to-reschedule state machine.
//!
//! Pointer x values are pixel offsets from the viewport start, the same
//! space `TimelineViewport::date_to_x` maps into. Every candidate is derived
//! from the snapshot taken at pointer-down, never from the last preview.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::{BarExtent, ProcessedTask, TaskId, TimelineViewport};

/// Width of the resize handles at each end of a bar.
pub const HANDLE_WIDTH: f32 = 7.0;
/// Extra reach around a handle that still counts as a hit.
const HANDLE_SLOP: f32 = 4.0;

/// Which part of the bar a gesture grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragKind {
    Move,
    ResizeStart,
    ResizeEnd,
}

/// What to do with a preview when the pointer is released outside the
/// visible timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleasePolicy {
    /// Commit the last preview wherever the release happens.
    #[default]
    CommitAnywhere,
    /// Drop the gesture when released outside the viewport.
    RequireInsideViewport,
}

/// New dates for one task, either previewed or committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleChange {
    pub task: TaskId,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Snapshot taken when a gesture begins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOrigin {
    pub kind: DragKind,
    pub task: TaskId,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub pointer_x: f32,
}

/// Host hook for pointer listeners that must live exactly as long as a
/// gesture. The guard is stored in the `Dragging` state and dropped when
/// the machine returns to `Idle`.
pub trait PointerCapture {
    type Guard;

    fn capture(&mut self) -> Self::Guard;
}

/// Capture for hosts that deliver pointer events without global listeners.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCapture;

impl PointerCapture for NoCapture {
    type Guard = ();

    fn capture(&mut self) -> Self::Guard {}
}

#[derive(Debug)]
pub enum DragState<G> {
    Idle,
    Dragging {
        origin: DragOrigin,
        preview: Option<ScheduleChange>,
        capture: G,
    },
}

/// Pick the drag mode from where the pointer landed on a bar.
///
/// Handles shrink on narrow bars so a third of the bar always remains
/// grabbable as a body.
pub fn hit_test(bar: BarExtent, pointer_x: f32) -> Option<DragKind> {
    let width = (bar.right - bar.left).max(0.0);
    let reach = (HANDLE_WIDTH * 0.5 + HANDLE_SLOP).min(width / 3.0);
    if (pointer_x - bar.left).abs() <= reach {
        Some(DragKind::ResizeStart)
    } else if (pointer_x - bar.right).abs() <= reach {
        Some(DragKind::ResizeEnd)
    } else if pointer_x >= bar.left && pointer_x <= bar.right {
        Some(DragKind::Move)
    } else {
        None
    }
}

/// Whole days covered by a horizontal pointer delta.
pub fn drag_days(delta_x: f32, pixels_per_day: f32) -> i64 {
    if pixels_per_day <= 0.0 {
        return 0;
    }
    (delta_x / pixels_per_day).round() as i64
}

fn shift(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::try_days(days)?)
}

/// Candidate dates for a gesture, clamped to at least one day between start and end.
///
/// `None` when the shifted dates fall outside the calendar range.
pub fn candidate_dates(
    kind: DragKind,
    origin_start: NaiveDate,
    origin_end: NaiveDate,
    delta_days: i64,
) -> Option<(NaiveDate, NaiveDate)> {
    match kind {
        DragKind::Move => {
            let start = shift(origin_start, delta_days)?;
            let end = shift(origin_end, delta_days)?.max(shift(start, 1)?);
            Some((start, end))
        }
        DragKind::ResizeEnd => {
            let end = shift(origin_end, delta_days)?;
            if end <= origin_start {
                Some((origin_start, shift(origin_start, 1)?))
            } else {
                Some((origin_start, end))
            }
        }
        DragKind::ResizeStart => {
            let start = shift(origin_start, delta_days)?;
            if start >= origin_end {
                Some((shift(origin_end, -1)?, origin_end))
            } else {
                Some((start, origin_end))
            }
        }
    }
}

/// Turns pointer gestures on timeline bars into date changes.
///
/// At most one gesture is active. `pointer_up` yields at most one
/// `ScheduleChange` per gesture; the host applies it to the flat list.
#[derive(Debug)]
pub struct Rescheduler<G = ()> {
    state: DragState<G>,
    policy: ReleasePolicy,
}

impl<G> Default for Rescheduler<G> {
    fn default() -> Self {
        Self::new(ReleasePolicy::default())
    }
}

impl<G> Rescheduler<G> {
    pub fn new(policy: ReleasePolicy) -> Self {
        Self {
            state: DragState::Idle,
            policy,
        }
    }

    pub fn state(&self) -> &DragState<G> {
        &self.state
    }

    pub fn policy(&self) -> ReleasePolicy {
        self.policy
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// The uncommitted candidate for the active gesture, if any.
    pub fn preview(&self) -> Option<ScheduleChange> {
        match &self.state {
            DragState::Dragging { preview, .. } => *preview,
            DragState::Idle => None,
        }
    }

    /// Start a gesture on `node`'s bar. Returns the chosen mode, or `None`
    /// when the press is ignored (summary bar, miss, gesture in progress).
    pub fn pointer_down<C>(
        &mut self,
        node: &ProcessedTask,
        pointer_x: f32,
        viewport: &TimelineViewport,
        capture: &mut C,
    ) -> Option<DragKind>
    where
        C: PointerCapture<Guard = G>,
    {
        if self.is_dragging() || node.is_summary() || node.task.is_summary {
            return None;
        }
        let kind = hit_test(viewport.bar_extent(&node.task), pointer_x)?;

        let origin = DragOrigin {
            kind,
            task: node.id(),
            start: node.task.start,
            end: node.task.end,
            pointer_x,
        };
        tracing::debug!(task = %origin.task, ?kind, "Drag started");
        self.state = DragState::Dragging {
            origin,
            preview: None,
            capture: capture.capture(),
        };
        Some(kind)
    }

    /// Recompute the preview for the current pointer position.
    pub fn pointer_move(
        &mut self,
        pointer_x: f32,
        viewport: &TimelineViewport,
    ) -> Option<ScheduleChange> {
        let DragState::Dragging {
            origin, preview, ..
        } = &mut self.state
        else {
            return None;
        };

        let delta = drag_days(pointer_x - origin.pointer_x, viewport.pixels_per_day);
        let Some((start, end)) = candidate_dates(origin.kind, origin.start, origin.end, delta)
        else {
            tracing::debug!(task = %origin.task, delta, "Drag beyond calendar range; preview kept");
            return *preview;
        };
        let change = ScheduleChange {
            task: origin.task,
            start,
            end,
        };
        *preview = Some(change);
        Some(change)
    }

    /// End the gesture. Returns the change to commit, if any.
    pub fn pointer_up(
        &mut self,
        pointer_x: f32,
        viewport: &TimelineViewport,
    ) -> Option<ScheduleChange> {
        // Replacing the state drops the capture guard.
        let DragState::Dragging {
            origin, preview, ..
        } = std::mem::replace(&mut self.state, DragState::Idle)
        else {
            return None;
        };

        let change = preview?;
        if self.policy == ReleasePolicy::RequireInsideViewport && !viewport.contains_x(pointer_x) {
            tracing::info!(task = %origin.task, "Drag released outside timeline; discarded");
            return None;
        }
        Some(change)
    }
}
