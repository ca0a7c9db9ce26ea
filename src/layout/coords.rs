use chrono::{Datelike, Days, NaiveDate};

use super::grid::{days_between, days_in_month, Grid, MonthScale, TimeScale, WeekScale};
use crate::model::{DateRange, Task, ViewMode};

/// Slack applied before flooring a pixel offset, so an offset computed as
/// `n × width` never floors to `n - 1`.
const PIXEL_EPSILON: f32 = 1e-3;

/// Forward and inverse transforms between dates and horizontal pixels.
///
/// `anchor` is the date drawn at pixel zero.
pub trait CoordinateMap: TimeScale {
    /// Horizontal offset of `target` from `anchor`. `date_to_pixel(a, a) == 0`.
    fn date_to_pixel(&self, anchor: NaiveDate, target: NaiveDate) -> f32;

    /// Date under the pixel `px`.
    fn pixel_to_date(&self, anchor: NaiveDate, px: f32) -> NaiveDate;

    /// Width of a task bar.
    fn task_width(&self, task: &Task) -> f32;
}

impl CoordinateMap for WeekScale {
    fn date_to_pixel(&self, anchor: NaiveDate, target: NaiveDate) -> f32 {
        self.units_between(anchor, target) as f32 * self.week_width
    }

    fn pixel_to_date(&self, anchor: NaiveDate, px: f32) -> NaiveDate {
        let base = self.unit_start(anchor);
        if !px.is_finite() {
            return base;
        }
        let weeks = ((px + PIXEL_EPSILON) / self.week_width).floor() as i64;
        self.add_units(base, weeks)
    }

    fn task_width(&self, task: &Task) -> f32 {
        task.duration_weeks() as f32 * self.week_width
    }
}

impl MonthScale {
    /// Days from the first of `anchor`'s month to `target`: whole months in
    /// between plus `target`'s day-of-month offset.
    fn day_offset(&self, anchor: NaiveDate, target: NaiveDate) -> i64 {
        let first = self.unit_start(anchor);
        let months = self.units_between(first, target);
        let whole: i64 = if months >= 0 {
            (0..months)
                .map(|i| i64::from(days_in_month(self.add_units(first, i))))
                .sum()
        } else {
            -(months..0)
                .map(|i| i64::from(days_in_month(self.add_units(first, i))))
                .sum::<i64>()
        };
        whole + i64::from(target.day0())
    }
}

impl CoordinateMap for MonthScale {
    fn date_to_pixel(&self, anchor: NaiveDate, target: NaiveDate) -> f32 {
        let days = self.day_offset(anchor, target) - i64::from(anchor.day0());
        days as f32 * self.base_day_width
    }

    fn pixel_to_date(&self, anchor: NaiveDate, px: f32) -> NaiveDate {
        let first = self.unit_start(anchor);
        if !px.is_finite() {
            return first;
        }
        // Every month is exactly `days × base_day_width` wide, so the offset
        // from the first of the anchor month is a plain day count.
        let day_width = f64::from(self.base_day_width);
        let offset = f64::from(px) + f64::from(anchor.day0()) * day_width;
        let days = ((offset + f64::from(PIXEL_EPSILON)) / day_width).floor() as i64;
        let step = Days::new(days.unsigned_abs());
        if days >= 0 {
            first.checked_add_days(step).unwrap_or(NaiveDate::MAX)
        } else {
            first.checked_sub_days(step).unwrap_or(NaiveDate::MIN)
        }
    }

    fn task_width(&self, task: &Task) -> f32 {
        (days_between(task.start_date(), task.end_date()) + 1) as f32 * self.base_day_width
    }
}

/// On-screen rectangle of a task bar relative to the timeline origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskRect {
    pub left: f32,
    pub width: f32,
    pub top: f32,
    pub height: f32,
}

impl TaskRect {
    pub fn right(&self) -> f32 {
        self.left + self.width
    }
}

impl Grid {
    pub fn date_to_pixel(&self, mode: ViewMode, anchor: NaiveDate, target: NaiveDate) -> f32 {
        self.scale(mode).date_to_pixel(anchor, target)
    }

    pub fn pixel_to_date(&self, mode: ViewMode, anchor: NaiveDate, px: f32) -> NaiveDate {
        self.scale(mode).pixel_to_date(anchor, px)
    }

    pub fn task_pixel_width(&self, mode: ViewMode, task: &Task) -> f32 {
        self.scale(mode).task_width(task)
    }

    /// Bar rectangle of a stacked task; the lane decides the vertical offset.
    pub fn task_rect(&self, mode: ViewMode, anchor: NaiveDate, task: &Task) -> TaskRect {
        let config = self.config();
        TaskRect {
            left: self.date_to_pixel(mode, anchor, task.start_date()),
            width: self.task_pixel_width(mode, task),
            top: task.stack_position as f32 * config.lane_height(),
            height: config.task_height,
        }
    }

    /// Canvas width of a visible range: from the range start to the end of
    /// the unit containing the range end.
    pub fn range_width(&self, mode: ViewMode, range: &DateRange) -> f32 {
        let scale = self.scale(mode);
        let after_end = scale.add_units(scale.unit_start(range.end), 1);
        scale.date_to_pixel(range.start, after_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimelineConfig;
    use crate::model::TaskInput;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(grid: &Grid, start: NaiveDate, weeks: u32) -> Task {
        Task::from_input(TaskInput::new("t", start, weeks, "#3b82f6"), grid)
    }

    #[test]
    fn anchor_maps_to_zero() {
        let grid = Grid::default();
        for anchor in [date(2024, 1, 1), date(2024, 1, 17), date(2023, 12, 31)] {
            assert_eq!(grid.date_to_pixel(ViewMode::Week, anchor, anchor), 0.0);
            assert_eq!(grid.date_to_pixel(ViewMode::Month, anchor, anchor), 0.0);
        }
    }

    #[test]
    fn week_offsets_are_uniform() {
        let grid = Grid::default();
        let anchor = date(2024, 1, 1);
        assert_eq!(grid.date_to_pixel(ViewMode::Week, anchor, date(2024, 1, 15)), 200.0);
        assert_eq!(grid.date_to_pixel(ViewMode::Week, anchor, date(2024, 1, 21)), 200.0);
        assert_eq!(grid.date_to_pixel(ViewMode::Week, anchor, date(2023, 12, 25)), -100.0);
    }

    #[test]
    fn month_offset_across_leap_february() {
        let grid = Grid::default();
        let bdw = grid.config().base_day_width;
        let px = grid.date_to_pixel(ViewMode::Month, date(2024, 1, 1), date(2024, 3, 1));
        assert_eq!(px, 31.0 * bdw + 29.0 * bdw);
    }

    #[test]
    fn month_offset_includes_day_of_month() {
        let grid = Grid::default();
        let px = grid.date_to_pixel(ViewMode::Month, date(2024, 1, 1), date(2024, 2, 10));
        assert_eq!(px, (31.0 + 9.0) * 4.0);
        let back = grid.date_to_pixel(ViewMode::Month, date(2024, 3, 1), date(2024, 1, 1));
        assert_eq!(back, -(31.0 + 29.0) * 4.0);
    }

    #[test]
    fn week_pixel_floors_into_unit() {
        let grid = Grid::default();
        let anchor = date(2024, 1, 1);
        assert_eq!(grid.pixel_to_date(ViewMode::Week, anchor, 0.0), anchor);
        assert_eq!(grid.pixel_to_date(ViewMode::Week, anchor, 99.9), anchor);
        assert_eq!(grid.pixel_to_date(ViewMode::Week, anchor, 100.0), date(2024, 1, 8));
        assert_eq!(grid.pixel_to_date(ViewMode::Week, anchor, -1.0), date(2023, 12, 25));
    }

    #[test]
    fn month_pixel_resolves_day_and_clamps() {
        let grid = Grid::default();
        let anchor = date(2024, 1, 1);
        assert_eq!(grid.pixel_to_date(ViewMode::Month, anchor, 0.0), anchor);
        assert_eq!(grid.pixel_to_date(ViewMode::Month, anchor, 4.0 * 31.0), date(2024, 2, 1));
        assert_eq!(grid.pixel_to_date(ViewMode::Month, anchor, 4.0 * 31.0 + 4.0 * 28.5), date(2024, 2, 29));
        assert_eq!(grid.pixel_to_date(ViewMode::Month, anchor, 4.0 * 60.0), date(2024, 3, 1));
        assert_eq!(grid.pixel_to_date(ViewMode::Month, anchor, -4.0), date(2023, 12, 31));
        assert_eq!(grid.pixel_to_date(ViewMode::Month, anchor, f32::NAN), anchor);
    }

    #[test]
    fn huge_offsets_saturate_at_the_calendar_ends() {
        let grid = Grid::default();
        let anchor = date(2024, 1, 1);
        assert_eq!(grid.pixel_to_date(ViewMode::Month, anchor, 1.0e12), NaiveDate::MAX);
        assert_eq!(grid.pixel_to_date(ViewMode::Month, anchor, -1.0e12), NaiveDate::MIN);
        assert_eq!(grid.pixel_to_date(ViewMode::Month, anchor, f32::MAX), NaiveDate::MAX);
        assert_eq!(grid.pixel_to_date(ViewMode::Week, anchor, 1.0e12), NaiveDate::MAX);
        // Still day-precise well past the visible window.
        let far = grid.pixel_to_date(ViewMode::Month, anchor, 4.0 * 36_524.0);
        assert_eq!(far, date(2124, 1, 1));
    }

    #[test]
    fn task_width_per_mode() {
        let grid = Grid::default();
        let t = task(&grid, date(2024, 1, 8), 4);
        assert_eq!(grid.task_pixel_width(ViewMode::Week, &t), 400.0);
        // Jan 8 ..= Feb 4 is 28 days.
        assert_eq!(grid.task_pixel_width(ViewMode::Month, &t), 28.0 * 4.0);
    }

    #[test]
    fn task_rect_uses_stack_lane() {
        let grid = Grid::default();
        let mut t = task(&grid, date(2024, 1, 15), 2);
        t.stack_position = 2;
        let rect = grid.task_rect(ViewMode::Week, date(2024, 1, 1), &t);
        assert_eq!(
            rect,
            TaskRect {
                left: 200.0,
                width: 200.0,
                top: 88.0,
                height: 40.0
            }
        );
        assert_eq!(rect.right(), 400.0);
    }

    #[test]
    fn range_width_covers_last_unit() {
        let grid = Grid::default();
        let range = DateRange {
            start: date(2024, 1, 1),
            end: date(2024, 3, 1),
        };
        assert_eq!(grid.range_width(ViewMode::Week, &range), 900.0);
        assert_eq!(grid.range_width(ViewMode::Month, &range), (31.0 + 29.0 + 31.0) * 4.0);
    }

    proptest! {
        #[test]
        fn unit_aligned_dates_round_trip(offset in -5_000i64..5_000, anchor_offset in -400i64..400) {
            let grid = Grid::default();
            let base = date(2024, 1, 1);
            for mode in [ViewMode::Week, ViewMode::Month] {
                let anchor = grid.unit_start(mode, base + chrono::Duration::days(anchor_offset));
                let d = grid.unit_start(mode, base + chrono::Duration::days(offset));
                let px = grid.date_to_pixel(mode, anchor, d);
                prop_assert_eq!(grid.pixel_to_date(mode, anchor, px), d);
            }
        }

        #[test]
        fn month_view_round_trips_every_day(offset in -2_000i64..2_000) {
            let grid = Grid::default();
            let anchor = date(2024, 1, 1);
            let d = anchor + chrono::Duration::days(offset);
            let px = grid.date_to_pixel(ViewMode::Month, anchor, d);
            prop_assert_eq!(grid.pixel_to_date(ViewMode::Month, anchor, px), d);
        }

        #[test]
        fn month_offsets_never_drift(offset in 0i64..20_000) {
            let grid = Grid::new(TimelineConfig { base_day_width: 3.0, ..Default::default() });
            let anchor = date(2000, 1, 1);
            let d = anchor + chrono::Duration::days(offset);
            prop_assert_eq!(
                grid.date_to_pixel(ViewMode::Month, anchor, d),
                offset as f32 * 3.0
            );
        }
    }
}
