use chrono::NaiveDate;

use crate::layout::{CoordinateMap, TimeScale};
use crate::model::{Task, TimelineViewport, ViewMode};

/// A move ready to be written to the task store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveCommit {
    pub task_id: String,
    pub new_start: NaiveDate,
}

/// Drag-to-move state: idle, or dragging a snapshot of one task.
#[derive(Debug, Clone, Default)]
pub struct MoveDrag {
    active: Option<Task>,
}

impl MoveDrag {
    pub fn begin(&mut self, task: &Task) {
        self.active = Some(task.clone());
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_task(&self) -> Option<&Task> {
        self.active.as_ref()
    }

    /// Snapped start the task would get if released at `dx`, or `None` when
    /// the drag would leave it where it is.
    pub fn proposed_start(&self, dx: f32, viewport: &TimelineViewport) -> Option<NaiveDate> {
        self.active
            .as_ref()
            .and_then(|task| propose_start(task, dx, viewport))
    }

    /// Finish the drag. Returns to idle either way; a drag that does not
    /// cross a unit boundary commits nothing.
    pub fn release(&mut self, dx: f32, viewport: &TimelineViewport) -> Option<MoveCommit> {
        let task = self.active.take()?;
        let new_start = propose_start(&task, dx, viewport)?;
        Some(MoveCommit {
            task_id: task.id,
            new_start,
        })
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }
}

fn propose_start(task: &Task, dx: f32, viewport: &TimelineViewport) -> Option<NaiveDate> {
    let grid = viewport.grid();
    match viewport.mode() {
        ViewMode::Week => {
            let week = grid.week();
            let weeks = (dx / week.week_width).round() as i64;
            if weeks == 0 {
                return None;
            }
            Some(week.unit_start(week.add_units(task.start_date(), weeks)))
        }
        ViewMode::Month => {
            let month = grid.month();
            let anchor = viewport.anchor();
            let left = month.date_to_pixel(anchor, task.start_date());
            let target = month.unit_start(month.pixel_to_date(anchor, left + dx));
            (target != month.unit_start(task.start_date())).then_some(target)
        }
    }
}
