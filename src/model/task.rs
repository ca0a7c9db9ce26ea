use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::layout::Grid;
use crate::model::ViewMode;

/// Fields supplied by the user when creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInput {
    pub title: String,
    pub start_date: NaiveDate,
    pub duration_weeks: u32,
    /// Display color. Any string is accepted; the shell uses `#rrggbb`.
    pub color: String,
}

impl TaskInput {
    pub fn new(
        title: impl Into<String>,
        start_date: NaiveDate,
        duration_weeks: u32,
        color: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            start_date,
            duration_weeks,
            color: color.into(),
        }
    }
}

/// A schedulable bar on the timeline.
///
/// The schedule (`start_date`, `duration_weeks`, `end_date`) is private: the
/// end date is derived from the other two and only [`Task::rescheduled`] can
/// change them, always returning a new snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    start_date: NaiveDate,
    duration_weeks: u32,
    end_date: NaiveDate,
    pub color: String,
    /// Lane index assigned by the stacking engine. Never user-set.
    #[serde(default)]
    pub stack_position: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a task with a fresh id and timestamps. The start date is
    /// snapped back to the start of its week.
    pub fn from_input(input: TaskInput, grid: &Grid) -> Self {
        let now = Utc::now();
        let start_date = grid.unit_start(ViewMode::Week, input.start_date);
        let duration_weeks = input.duration_weeks.max(grid.config().min_duration_weeks);
        Self {
            id: format!("task-{}", Uuid::new_v4()),
            title: input.title,
            start_date,
            duration_weeks,
            end_date: grid.task_end(start_date, duration_weeks),
            color: input.color,
            stack_position: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn duration_weeks(&self) -> u32 {
        self.duration_weeks
    }

    /// Last day of the final week covered by the task (inclusive).
    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// A copy with a new schedule and a bumped `updated_at`.
    pub fn rescheduled(&self, grid: &Grid, start_date: NaiveDate, duration_weeks: u32) -> Self {
        let duration_weeks = duration_weeks.max(grid.config().min_duration_weeks);
        Self {
            start_date,
            duration_weeks,
            end_date: grid.task_end(start_date, duration_weeks),
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    /// Re-derive the end date after loading, ignoring whatever was stored.
    pub(crate) fn rederived(mut self, grid: &Grid) -> Self {
        self.duration_weeks = self.duration_weeks.max(grid.config().min_duration_weeks);
        self.end_date = grid.task_end(self.start_date, self.duration_weeks);
        self
    }
}
