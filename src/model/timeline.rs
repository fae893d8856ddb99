use chrono::{Days, NaiveDate};

use super::task::Task;

const MIN_PIXELS_PER_DAY: f32 = 2.0;
const MAX_PIXELS_PER_DAY: f32 = 80.0;
const ZOOM_STEP: f32 = 1.2;

/// Horizontal pixel extent of a task bar, relative to the viewport start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarExtent {
    pub left: f32,
    pub right: f32,
}

/// Manages the visible viewport of the timeline.
#[derive(Debug, Clone)]
pub struct TimelineViewport {
    /// The leftmost visible date.
    pub start: NaiveDate,
    /// The rightmost visible date.
    pub end: NaiveDate,
    /// Pixels per day (controls zoom level).
    pub pixels_per_day: f32,
}

impl TimelineViewport {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            pixels_per_day: 18.0,
        }
    }

    pub fn with_pixels_per_day(mut self, pixels_per_day: f32) -> Self {
        self.pixels_per_day = pixels_per_day.clamp(MIN_PIXELS_PER_DAY, MAX_PIXELS_PER_DAY);
        self
    }

    /// Viewport spanning the given tasks with a week of margin before and a month after.
    pub fn fit_to(tasks: &[Task], today: NaiveDate) -> Self {
        let start = tasks.iter().map(|t| t.start).min().unwrap_or(today);
        let end = tasks.iter().map(|t| t.end).max().unwrap_or(today);
        Self::new(
            start.checked_sub_days(Days::new(7)).unwrap_or(start),
            end.checked_add_days(Days::new(30)).unwrap_or(end),
        )
    }

    /// Convert a date to an x-pixel offset from the viewport start.
    pub fn date_to_x(&self, date: NaiveDate) -> f32 {
        let days = (date - self.start).num_days() as f32;
        days * self.pixels_per_day
    }

    /// Convert an x-pixel offset back to a date, `None` past the calendar range.
    pub fn x_to_date(&self, x: f32) -> Option<NaiveDate> {
        let days = (x / self.pixels_per_day).round() as i64;
        self.start.checked_add_signed(chrono::Duration::try_days(days)?)
    }

    /// Pixel extent of a task bar. The end day is covered in full.
    pub fn bar_extent(&self, task: &Task) -> BarExtent {
        BarExtent {
            left: self.date_to_x(task.start),
            right: self.date_to_x(task.end) + self.pixels_per_day,
        }
    }

    /// Total width in pixels for the visible range.
    pub fn total_width(&self) -> f32 {
        self.date_to_x(self.end)
    }

    /// Whether a pointer x offset falls inside the visible range.
    pub fn contains_x(&self, x: f32) -> bool {
        x >= 0.0 && x <= self.total_width()
    }

    /// Zoom in (increase pixels per day).
    pub fn zoom_in(&mut self) {
        self.pixels_per_day = (self.pixels_per_day * ZOOM_STEP).min(MAX_PIXELS_PER_DAY);
    }

    /// Zoom out (decrease pixels per day).
    pub fn zoom_out(&mut self) {
        self.pixels_per_day = (self.pixels_per_day / ZOOM_STEP).max(MIN_PIXELS_PER_DAY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskId;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn date_and_pixel_conversions_agree() {
        let vp = TimelineViewport::new(d(2024, 1, 1), d(2024, 3, 1)).with_pixels_per_day(10.0);
        assert_eq!(vp.date_to_x(d(2024, 1, 11)), 100.0);
        assert_eq!(vp.x_to_date(104.0), Some(d(2024, 1, 11)));
        assert_eq!(vp.x_to_date(106.0), Some(d(2024, 1, 12)));
    }

    #[test]
    fn x_to_date_past_calendar_range_is_none() {
        let vp = TimelineViewport::new(d(2024, 1, 1), d(2024, 3, 1)).with_pixels_per_day(2.0);
        assert_eq!(vp.x_to_date(1.0e12), None);
        assert_eq!(vp.x_to_date(f32::NEG_INFINITY), None);
    }

    #[test]
    fn bar_covers_its_end_day() {
        let vp = TimelineViewport::new(d(2024, 1, 1), d(2024, 3, 1)).with_pixels_per_day(10.0);
        let one_day = Task::new(TaskId(1), "Inspection", d(2024, 1, 6), d(2024, 1, 6));
        assert_eq!(
            vp.bar_extent(&one_day),
            BarExtent {
                left: 50.0,
                right: 60.0
            }
        );
    }

    #[test]
    fn zoom_is_clamped() {
        let mut vp = TimelineViewport::new(d(2024, 1, 1), d(2024, 2, 1));
        for _ in 0..50 {
            vp.zoom_in();
        }
        assert_eq!(vp.pixels_per_day, MAX_PIXELS_PER_DAY);
        for _ in 0..100 {
            vp.zoom_out();
        }
        assert_eq!(vp.pixels_per_day, MIN_PIXELS_PER_DAY);
    }

    #[test]
    fn fit_to_adds_margins() {
        let tasks = vec![
            Task::new(TaskId(1), "a", d(2024, 5, 10), d(2024, 5, 20)),
            Task::new(TaskId(2), "b", d(2024, 5, 1), d(2024, 6, 1)),
        ];
        let vp = TimelineViewport::fit_to(&tasks, d(2020, 1, 1));
        assert_eq!(vp.start, d(2024, 4, 24));
        assert_eq!(vp.end, d(2024, 7, 1));
    }

    #[test]
    fn contains_x_tracks_visible_width() {
        let vp = TimelineViewport::new(d(2024, 1, 1), d(2024, 1, 11)).with_pixels_per_day(10.0);
        assert!(vp.contains_x(0.0));
        assert!(vp.contains_x(100.0));
        assert!(!vp.contains_x(-1.0));
        assert!(!vp.contains_x(100.5));
    }
}
