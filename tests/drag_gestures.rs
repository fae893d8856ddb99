use chrono::{Duration, NaiveDate};
use wbs_tracker::schedule::{DragKind, NoCapture, ReleasePolicy, Rescheduler};
use wbs_tracker::{Project, Task, TaskId, TimelineViewport};

fn day(n: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap() + Duration::days(n)
}

fn project() -> Project {
    Project::new("Fit-out").with_tasks(vec![
        Task::new(TaskId(10), "Level 1", day(0), day(29)).as_summary(),
        Task::new(TaskId(11), "Partitions", day(0), day(9))
            .with_level(2)
            .with_progress(60.0),
        Task::new(TaskId(12), "Ceilings", day(10), day(29))
            .with_level(2)
            .with_progress(10.0),
    ])
}

fn viewport() -> TimelineViewport {
    TimelineViewport::new(day(0), day(60)).with_pixels_per_day(20.0)
}

#[test]
fn committed_move_rebuilds_rollup() {
    let mut project = project();
    let vp = viewport();
    let before = project.process(day(15));

    let ceilings = before.find(TaskId(12)).unwrap();
    let bar = vp.bar_extent(&ceilings.task);
    let press = (bar.left + bar.right) / 2.0;

    let mut machine: Rescheduler = Rescheduler::new(ReleasePolicy::CommitAnywhere);
    assert_eq!(
        machine.pointer_down(ceilings, press, &vp, &mut NoCapture),
        Some(DragKind::Move)
    );
    machine.pointer_move(press + 45.0, &vp);
    machine.pointer_move(press + 100.0, &vp);
    let change = machine.pointer_up(press + 100.0, &vp).unwrap();
    assert_eq!((change.start, change.end), (day(15), day(34)));

    project.apply_change(&change).unwrap();
    let after = project.process(day(15));

    let moved = after.find(TaskId(12)).unwrap();
    assert_eq!(moved.task.start, day(15));
    assert_eq!(moved.task.duration, 20);
    assert_eq!(moved.planned_progress, 0.0);
    assert!(after.roots[0].planned_progress < before.roots[0].planned_progress);
}

#[test]
fn summary_bar_cannot_start_a_gesture() {
    let project = project();
    let vp = viewport();
    let schedule = project.process(day(5));
    let level = schedule.find(TaskId(10)).unwrap();
    let bar = vp.bar_extent(&level.task);

    let mut machine: Rescheduler = Rescheduler::default();
    assert_eq!(
        machine.pointer_down(level, (bar.left + bar.right) / 2.0, &vp, &mut NoCapture),
        None
    );
    assert!(!machine.is_dragging());
}

#[test]
fn shrinking_past_start_commits_one_day_task() {
    let mut project = project();
    let vp = viewport();
    let schedule = project.process(day(5));
    let partitions = schedule.find(TaskId(11)).unwrap();
    let bar = vp.bar_extent(&partitions.task);

    let mut machine: Rescheduler = Rescheduler::default();
    assert_eq!(
        machine.pointer_down(partitions, bar.right, &vp, &mut NoCapture),
        Some(DragKind::ResizeEnd)
    );
    machine.pointer_move(bar.right - 1000.0, &vp);
    let change = machine.pointer_up(bar.right - 1000.0, &vp).unwrap();
    assert_eq!(change.end, change.start + Duration::days(1));

    project.apply_change(&change).unwrap();
    let task = &project.tasks()[1];
    assert_eq!(task.start, day(0));
    assert_eq!(task.end, day(1));
    assert_eq!(task.duration, 2);
}

#[test]
fn zoom_between_moves_uses_current_scale() {
    let project = project();
    let mut vp = viewport();
    let schedule = project.process(day(5));
    let ceilings = schedule.find(TaskId(12)).unwrap();
    let bar = vp.bar_extent(&ceilings.task);
    let press = (bar.left + bar.right) / 2.0;

    let mut machine: Rescheduler = Rescheduler::default();
    machine.pointer_down(ceilings, press, &vp, &mut NoCapture);
    let at_20 = machine.pointer_move(press + 80.0, &vp).unwrap();
    assert_eq!(at_20.start, day(14));

    vp.pixels_per_day = 40.0;
    let at_40 = machine.pointer_move(press + 80.0, &vp).unwrap();
    assert_eq!(at_40.start, day(12));
    assert!(machine.is_dragging());
}
