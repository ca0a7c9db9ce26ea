use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

use super::coords::CoordinateMap;
use crate::config::TimelineConfig;
use crate::error::{Result, TimelineError};
use crate::model::ViewMode;

/// Calendar arithmetic for one kind of grid column.
///
/// `WeekScale` and `MonthScale` are the only implementations; callers pick
/// one through [`Grid::scale`] instead of branching on the view mode.
pub trait TimeScale {
    fn mode(&self) -> ViewMode;

    /// First day of the unit containing `date`.
    fn unit_start(&self, date: NaiveDate) -> NaiveDate;

    /// Last day of the unit containing `date`.
    fn unit_end(&self, date: NaiveDate) -> NaiveDate;

    /// Whole units from the unit of `a` to the unit of `b`. Negative when `b`
    /// lies before `a`.
    fn units_between(&self, a: NaiveDate, b: NaiveDate) -> i64;

    /// Calendar-aware unit addition. Saturates at the ends of the date range.
    fn add_units(&self, date: NaiveDate, units: i64) -> NaiveDate;

    /// Pixel width of the unit containing `reference`.
    ///
    /// Month columns vary in width, so asking for one without naming the
    /// month is a caller bug and fails with
    /// [`TimelineError::MissingReferenceDate`].
    fn unit_width(&self, reference: Option<NaiveDate>) -> Result<f32>;

    /// `count` consecutive unit starts beginning at the unit of `start`.
    fn generate_units(&self, start: NaiveDate, count: usize) -> Vec<NaiveDate> {
        let base = self.unit_start(start);
        (0..count as i64).map(|i| self.add_units(base, i)).collect()
    }

    /// Inclusive number of units touched by `[start, end]`, never below one.
    fn duration_in_units(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        let span = self.units_between(start, end) + 1;
        span.clamp(1, u32::MAX as i64) as u32
    }

    /// Last day of the unit `duration - 1` units after the unit of `start`.
    fn end_from_duration(&self, start: NaiveDate, duration: u32) -> NaiveDate {
        let offset = i64::from(duration.max(1)) - 1;
        self.unit_end(self.add_units(self.unit_start(start), offset))
    }
}

/// Fixed-width week columns starting on a configurable weekday.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeekScale {
    pub week_width: f32,
    pub week_start: Weekday,
}

impl TimeScale for WeekScale {
    fn mode(&self) -> ViewMode {
        ViewMode::Week
    }

    fn unit_start(&self, date: NaiveDate) -> NaiveDate {
        let offset = (7 + date.weekday().num_days_from_monday()
            - self.week_start.num_days_from_monday())
            % 7;
        date.checked_sub_days(Days::new(u64::from(offset)))
            .unwrap_or(NaiveDate::MIN)
    }

    fn unit_end(&self, date: NaiveDate) -> NaiveDate {
        self.unit_start(date)
            .checked_add_days(Days::new(6))
            .unwrap_or(NaiveDate::MAX)
    }

    fn units_between(&self, a: NaiveDate, b: NaiveDate) -> i64 {
        days_between(self.unit_start(a), self.unit_start(b)) / 7
    }

    fn add_units(&self, date: NaiveDate, units: i64) -> NaiveDate {
        let days = Days::new(units.unsigned_abs().saturating_mul(7));
        if units >= 0 {
            date.checked_add_days(days).unwrap_or(NaiveDate::MAX)
        } else {
            date.checked_sub_days(days).unwrap_or(NaiveDate::MIN)
        }
    }

    fn unit_width(&self, _reference: Option<NaiveDate>) -> Result<f32> {
        Ok(self.week_width)
    }
}

/// Month columns whose width is proportional to their day count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthScale {
    pub base_day_width: f32,
}

impl MonthScale {
    /// Width of the month containing `date`. Always `days × base_day_width`.
    pub fn month_width(&self, date: NaiveDate) -> f32 {
        days_in_month(date) as f32 * self.base_day_width
    }
}

impl TimeScale for MonthScale {
    fn mode(&self) -> ViewMode {
        ViewMode::Month
    }

    fn unit_start(&self, date: NaiveDate) -> NaiveDate {
        date.with_day(1).unwrap_or(date)
    }

    fn unit_end(&self, date: NaiveDate) -> NaiveDate {
        let first = self.unit_start(date);
        first
            .checked_add_days(Days::new(u64::from(days_in_month(first)) - 1))
            .unwrap_or(NaiveDate::MAX)
    }

    fn units_between(&self, a: NaiveDate, b: NaiveDate) -> i64 {
        month_index(b) - month_index(a)
    }

    fn add_units(&self, date: NaiveDate, units: i64) -> NaiveDate {
        let months = Months::new(u32::try_from(units.unsigned_abs()).unwrap_or(u32::MAX));
        if units >= 0 {
            date.checked_add_months(months).unwrap_or(NaiveDate::MAX)
        } else {
            date.checked_sub_months(months).unwrap_or(NaiveDate::MIN)
        }
    }

    fn unit_width(&self, reference: Option<NaiveDate>) -> Result<f32> {
        reference
            .map(|date| self.month_width(date))
            .ok_or(TimelineError::MissingReferenceDate)
    }
}

fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

/// Number of days in the month containing `date` (29 for a leap February).
pub fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    match (
        NaiveDate::from_ymd_opt(date.year(), date.month(), 1),
        NaiveDate::from_ymd_opt(year, month, 1),
    ) {
        (Some(first), Some(next)) => days_between(first, next) as u32,
        // Only December of the last representable year lands here.
        _ => 31,
    }
}

/// Signed whole days from `a` to `b`.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    b.signed_duration_since(a).num_days()
}

/// Both column strategies, built once from a [`TimelineConfig`].
#[derive(Debug, Clone)]
pub struct Grid {
    config: TimelineConfig,
    week: WeekScale,
    month: MonthScale,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(TimelineConfig::default())
    }
}

impl Grid {
    pub fn new(config: TimelineConfig) -> Self {
        let config = config.sanitized();
        Self {
            week: WeekScale {
                week_width: config.week_width,
                week_start: config.week_start,
            },
            month: MonthScale {
                base_day_width: config.base_day_width,
            },
            config,
        }
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn week(&self) -> &WeekScale {
        &self.week
    }

    pub fn month(&self) -> &MonthScale {
        &self.month
    }

    /// The strategy for `mode`.
    pub fn scale(&self, mode: ViewMode) -> &dyn CoordinateMap {
        match mode {
            ViewMode::Week => &self.week,
            ViewMode::Month => &self.month,
        }
    }

    pub fn unit_start(&self, mode: ViewMode, date: NaiveDate) -> NaiveDate {
        self.scale(mode).unit_start(date)
    }

    pub fn unit_end(&self, mode: ViewMode, date: NaiveDate) -> NaiveDate {
        self.scale(mode).unit_end(date)
    }

    pub fn units_between(&self, mode: ViewMode, a: NaiveDate, b: NaiveDate) -> i64 {
        self.scale(mode).units_between(a, b)
    }

    pub fn unit_width(&self, mode: ViewMode, reference: Option<NaiveDate>) -> Result<f32> {
        self.scale(mode).unit_width(reference)
    }

    pub fn generate_units(&self, mode: ViewMode, start: NaiveDate, count: usize) -> Vec<NaiveDate> {
        self.scale(mode).generate_units(start, count)
    }

    pub fn add_units(&self, mode: ViewMode, date: NaiveDate, units: i64) -> NaiveDate {
        self.scale(mode).add_units(date, units)
    }

    pub fn duration_in_units(&self, mode: ViewMode, start: NaiveDate, end: NaiveDate) -> u32 {
        self.scale(mode).duration_in_units(start, end)
    }

    pub fn end_from_duration(&self, mode: ViewMode, start: NaiveDate, duration: u32) -> NaiveDate {
        self.scale(mode).end_from_duration(start, duration)
    }

    /// End date of a task: task durations are always counted in weeks.
    pub fn task_end(&self, start: NaiveDate, duration_weeks: u32) -> NaiveDate {
        self.week.end_from_duration(start, duration_weeks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn any_date() -> impl Strategy<Value = NaiveDate> {
        (-20_000i64..20_000).prop_map(|offset| date(2024, 1, 1) + chrono::Duration::days(offset))
    }

    #[test]
    fn week_start_defaults_to_monday() {
        let grid = Grid::default();
        // 2024-01-10 is a Wednesday.
        assert_eq!(grid.unit_start(ViewMode::Week, date(2024, 1, 10)), date(2024, 1, 8));
        assert_eq!(grid.unit_start(ViewMode::Week, date(2024, 1, 8)), date(2024, 1, 8));
        assert_eq!(grid.unit_start(ViewMode::Week, date(2024, 1, 14)), date(2024, 1, 8));
    }

    #[test]
    fn week_start_is_configurable() {
        let grid = Grid::new(TimelineConfig {
            week_start: Weekday::Sun,
            ..Default::default()
        });
        assert_eq!(grid.unit_start(ViewMode::Week, date(2024, 1, 10)), date(2024, 1, 7));
        assert_eq!(grid.unit_start(ViewMode::Week, date(2024, 1, 7)), date(2024, 1, 7));
    }

    #[test]
    fn month_start_is_the_first() {
        let grid = Grid::default();
        assert_eq!(grid.unit_start(ViewMode::Month, date(2024, 2, 29)), date(2024, 2, 1));
        assert_eq!(grid.unit_end(ViewMode::Month, date(2024, 2, 3)), date(2024, 2, 29));
        assert_eq!(grid.unit_end(ViewMode::Week, date(2024, 1, 10)), date(2024, 1, 14));
    }

    #[test]
    fn units_between_counts_whole_units() {
        let grid = Grid::default();
        assert_eq!(grid.units_between(ViewMode::Week, date(2024, 1, 8), date(2024, 1, 14)), 0);
        assert_eq!(grid.units_between(ViewMode::Week, date(2024, 1, 14), date(2024, 1, 15)), 1);
        assert_eq!(grid.units_between(ViewMode::Week, date(2024, 1, 15), date(2024, 1, 1)), -2);
        assert_eq!(grid.units_between(ViewMode::Month, date(2023, 11, 30), date(2024, 2, 1)), 3);
        assert_eq!(grid.units_between(ViewMode::Month, date(2024, 2, 1), date(2023, 11, 30)), -3);
    }

    #[test]
    fn leap_february_has_twenty_nine_days() {
        assert_eq!(days_in_month(date(2024, 2, 10)), 29);
        assert_eq!(days_in_month(date(2023, 2, 10)), 28);
        assert_eq!(days_in_month(date(1900, 2, 1)), 28);
        assert_eq!(days_in_month(date(2000, 2, 1)), 29);
        assert_eq!(days_in_month(date(2024, 12, 31)), 31);
    }

    #[test]
    fn month_width_requires_reference_date() {
        let grid = Grid::default();
        assert!(matches!(
            grid.unit_width(ViewMode::Month, None),
            Err(TimelineError::MissingReferenceDate)
        ));
        assert_eq!(grid.unit_width(ViewMode::Month, Some(date(2024, 2, 1))).unwrap(), 116.0);
        assert_eq!(grid.unit_width(ViewMode::Week, None).unwrap(), 100.0);
    }

    #[test]
    fn month_widths_over_a_year_sum_to_day_count() {
        let grid = Grid::default();
        let total: f32 = grid
            .generate_units(ViewMode::Month, date(2024, 1, 1), 12)
            .into_iter()
            .map(|m| grid.unit_width(ViewMode::Month, Some(m)).unwrap())
            .sum();
        assert_eq!(total, 366.0 * 4.0);
    }

    #[test]
    fn add_months_clamps_to_month_end() {
        let grid = Grid::default();
        assert_eq!(grid.add_units(ViewMode::Month, date(2024, 1, 31), 1), date(2024, 2, 29));
        assert_eq!(grid.add_units(ViewMode::Month, date(2024, 11, 15), 3), date(2025, 2, 15));
        assert_eq!(grid.add_units(ViewMode::Month, date(2024, 3, 31), -1), date(2024, 2, 29));
        assert_eq!(grid.add_units(ViewMode::Week, date(2024, 12, 30), 1), date(2025, 1, 6));
    }

    #[test]
    fn generate_units_starts_at_unit_boundary() {
        let grid = Grid::default();
        assert_eq!(
            grid.generate_units(ViewMode::Week, date(2024, 1, 10), 3),
            vec![date(2024, 1, 8), date(2024, 1, 15), date(2024, 1, 22)]
        );
        assert_eq!(
            grid.generate_units(ViewMode::Month, date(2024, 11, 20), 3),
            vec![date(2024, 11, 1), date(2024, 12, 1), date(2025, 1, 1)]
        );
        assert!(grid.generate_units(ViewMode::Week, date(2024, 1, 10), 0).is_empty());
    }

    #[test]
    fn duration_is_inclusive_with_floor_of_one() {
        let grid = Grid::default();
        let d = date(2024, 1, 10);
        assert_eq!(grid.duration_in_units(ViewMode::Week, d, d), 1);
        assert_eq!(grid.duration_in_units(ViewMode::Week, date(2024, 1, 8), date(2024, 2, 4)), 4);
        assert_eq!(grid.duration_in_units(ViewMode::Week, date(2024, 2, 4), date(2024, 1, 8)), 1);
        assert_eq!(grid.duration_in_units(ViewMode::Month, date(2024, 1, 31), date(2024, 3, 1)), 3);
    }

    #[test]
    fn end_from_duration_lands_on_last_day_of_unit() {
        let grid = Grid::default();
        assert_eq!(grid.end_from_duration(ViewMode::Week, date(2024, 1, 8), 4), date(2024, 2, 4));
        assert_eq!(grid.end_from_duration(ViewMode::Week, date(2024, 1, 10), 1), date(2024, 1, 14));
        assert_eq!(grid.end_from_duration(ViewMode::Month, date(2024, 1, 15), 2), date(2024, 2, 29));
    }

    proptest! {
        #[test]
        fn unit_start_is_idempotent(d in any_date()) {
            let grid = Grid::default();
            for mode in [ViewMode::Week, ViewMode::Month] {
                let once = grid.unit_start(mode, d);
                prop_assert_eq!(grid.unit_start(mode, once), once);
                prop_assert!(once <= d);
            }
        }

        #[test]
        fn units_between_is_antisymmetric(a in any_date(), b in any_date()) {
            let grid = Grid::default();
            for mode in [ViewMode::Week, ViewMode::Month] {
                prop_assert_eq!(
                    grid.units_between(mode, a, b),
                    -grid.units_between(mode, b, a)
                );
            }
        }

        #[test]
        fn add_units_moves_exactly_that_many_units(d in any_date(), n in -600i64..600) {
            let grid = Grid::default();
            for mode in [ViewMode::Week, ViewMode::Month] {
                let start = grid.unit_start(mode, d);
                let moved = grid.add_units(mode, start, n);
                prop_assert_eq!(grid.units_between(mode, start, moved), n);
                prop_assert_eq!(grid.unit_start(mode, moved), moved);
            }
        }
    }
}
