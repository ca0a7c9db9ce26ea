use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimelineError};
use crate::layout::{days_between, Grid};

/// Shortest range a user may pick.
pub const MIN_RANGE_DAYS: i64 = 7;
/// Longest range a user may pick.
pub const MAX_RANGE_YEARS: u32 = 5;

/// Column granularity of the timeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Week,
    Month,
}

impl ViewMode {
    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Week => "Weeks",
            ViewMode::Month => "Months",
        }
    }
}

/// The visible window, kept on unit boundaries of the current view mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Snap both ends to unit starts; an end at or before the start becomes
    /// one unit after it.
    pub fn normalized(grid: &Grid, mode: ViewMode, start: NaiveDate, end: NaiveDate) -> Self {
        let start = grid.unit_start(mode, start);
        let mut end = grid.unit_start(mode, end);
        if end <= start {
            end = grid.add_units(mode, start, 1);
        }
        Self { start, end }
    }

    /// Check a user-picked range before normalizing it: the end must come
    /// after the start, at least [`MIN_RANGE_DAYS`] later and no more than
    /// [`MAX_RANGE_YEARS`] later.
    pub fn validate(start: NaiveDate, end: NaiveDate) -> Result<()> {
        if end <= start {
            return Err(TimelineError::RangeNotIncreasing);
        }
        if days_between(start, end) < MIN_RANGE_DAYS {
            return Err(TimelineError::RangeTooShort(MIN_RANGE_DAYS));
        }
        let latest = start.checked_add_months(Months::new(MAX_RANGE_YEARS * 12));
        if latest.is_some_and(|latest| end > latest) {
            return Err(TimelineError::RangeTooLong(MAX_RANGE_YEARS));
        }
        Ok(())
    }

    pub fn len_days(&self) -> i64 {
        days_between(self.start, self.end)
    }
}

/// The persisted part of a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSettings {
    pub mode: ViewMode,
    pub range: DateRange,
}

/// Manages the visible viewport of the timeline: which view mode, which
/// dates, and the pixel transforms between them.
#[derive(Debug, Clone)]
pub struct TimelineViewport {
    grid: Grid,
    mode: ViewMode,
    range: DateRange,
}

impl TimelineViewport {
    pub fn new(grid: Grid, mode: ViewMode, start: NaiveDate, end: NaiveDate) -> Self {
        let range = DateRange::normalized(&grid, mode, start, end);
        Self { grid, mode, range }
    }

    /// The first-launch window: two weeks before `today`, spanning the
    /// configured number of weeks.
    pub fn around(grid: Grid, today: NaiveDate) -> Self {
        let start = grid.add_units(ViewMode::Week, grid.unit_start(ViewMode::Week, today), -2);
        let weeks = i64::from(grid.config().default_range_weeks);
        let end = grid.add_units(ViewMode::Week, start, weeks);
        Self::new(grid, ViewMode::Week, start, end)
    }

    /// Rebuild a viewport from stored settings, re-normalizing the range in
    /// case the config's week start changed since it was saved.
    pub fn restore(grid: Grid, settings: ViewSettings) -> Self {
        Self::new(grid, settings.mode, settings.range.start, settings.range.end)
    }

    pub fn settings(&self) -> ViewSettings {
        ViewSettings {
            mode: self.mode,
            range: self.range,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    /// The date at pixel zero.
    pub fn anchor(&self) -> NaiveDate {
        self.range.start
    }

    /// Switch granularity, re-snapping the range to the new unit boundaries.
    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
        self.range = DateRange::normalized(&self.grid, mode, self.range.start, self.range.end);
    }

    pub fn set_range(&mut self, start: NaiveDate, end: NaiveDate) {
        self.range = DateRange::normalized(&self.grid, self.mode, start, end);
    }

    /// Apply a range typed in by the user. A rejected range leaves the
    /// viewport unchanged.
    pub fn try_set_range(&mut self, start: NaiveDate, end: NaiveDate) -> Result<()> {
        DateRange::validate(start, end)?;
        self.set_range(start, end);
        Ok(())
    }

    /// Convert a date to an x-pixel offset from the viewport start.
    pub fn date_to_x(&self, date: NaiveDate) -> f32 {
        self.grid.date_to_pixel(self.mode, self.anchor(), date)
    }

    /// Convert an x-pixel offset back to a date.
    pub fn x_to_date(&self, x: f32) -> NaiveDate {
        self.grid.pixel_to_date(self.mode, self.anchor(), x)
    }

    /// Total width in pixels for the visible range.
    pub fn total_width(&self) -> f32 {
        self.grid.range_width(self.mode, &self.range)
    }

    /// Unit starts from the range start through the unit of the range end.
    pub fn visible_units(&self) -> Vec<NaiveDate> {
        let count = self.grid.units_between(self.mode, self.range.start, self.range.end) + 1;
        self.grid
            .generate_units(self.mode, self.range.start, count.max(1) as usize)
    }

    /// Shift the window by one unit forward.
    pub fn scroll_next(&mut self) {
        self.shift(1);
    }

    /// Shift the window by one unit back.
    pub fn scroll_previous(&mut self) {
        self.shift(-1);
    }

    fn shift(&mut self, units: i64) {
        let start = self.grid.add_units(self.mode, self.range.start, units);
        let end = self.grid.add_units(self.mode, self.range.end, units);
        self.set_range(start, end);
    }

    /// Start the window at the unit containing `date`, keeping its length.
    pub fn scroll_to_date(&mut self, date: NaiveDate) {
        let len = Days::new(self.range.len_days().max(0) as u64);
        let start = self.grid.unit_start(self.mode, date);
        let end = start.checked_add_days(len).unwrap_or(NaiveDate::MAX);
        self.set_range(start, end);
    }

    /// Center the window on `today`, keeping its length.
    pub fn scroll_to_today(&mut self, today: NaiveDate) {
        let half = Days::new((self.range.len_days().max(0) / 2) as u64);
        let start = today.checked_sub_days(half).unwrap_or(NaiveDate::MIN);
        let end = today.checked_add_days(half).unwrap_or(NaiveDate::MAX);
        self.set_range(start, end);
    }
}
