use chrono::NaiveDate;

use crate::layout::{days_between, CoordinateMap, TimeScale};
use crate::model::{Task, TimelineViewport, ViewMode};

/// Which edge of a bar is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    Start,
    End,
}

/// A resize ready to be written to the task store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeCommit {
    pub task_id: String,
    pub new_start: NaiveDate,
    pub duration_weeks: u32,
}

#[derive(Debug, Clone)]
struct ResizeSession {
    task_id: String,
    handle: ResizeHandle,
    initial_x: f32,
    initial_start: NaiveDate,
    initial_duration: u32,
    /// Latest pointer sample not yet turned into a preview.
    pending_x: Option<f32>,
    preview: Option<ResizeCommit>,
}

/// Drag-to-resize state: idle, or resizing one edge of one task.
///
/// Pointer samples are coalesced: [`ResizeDrag::pointer_moved`] only records
/// the latest position, and [`ResizeDrag::frame`] turns it into at most one
/// preview per rendered frame.
#[derive(Debug, Clone, Default)]
pub struct ResizeDrag {
    session: Option<ResizeSession>,
}

impl ResizeDrag {
    pub fn begin(&mut self, task: &Task, handle: ResizeHandle, initial_x: f32) {
        self.session = Some(ResizeSession {
            task_id: task.id.clone(),
            handle,
            initial_x,
            initial_start: task.start_date(),
            initial_duration: task.duration_weeks(),
            pending_x: None,
            preview: None,
        });
    }

    pub fn is_resizing(&self) -> bool {
        self.session.is_some()
    }

    pub fn active(&self) -> Option<(&str, ResizeHandle)> {
        self.session
            .as_ref()
            .map(|session| (session.task_id.as_str(), session.handle))
    }

    pub fn pointer_moved(&mut self, x: f32) {
        if let Some(session) = self.session.as_mut() {
            session.pending_x = Some(x);
        }
    }

    /// Recompute the preview from the latest pointer sample, if any arrived
    /// since the last frame. A rejected candidate clears the preview.
    pub fn frame(&mut self, viewport: &TimelineViewport) -> Option<&ResizeCommit> {
        let session = self.session.as_mut()?;
        if let Some(x) = session.pending_x.take() {
            session.preview = propose(session, x - session.initial_x, viewport);
        }
        session.preview.as_ref()
    }

    /// Finish the resize at pointer position `x`.
    ///
    /// Returns to idle either way. Nothing is committed when no resize is
    /// active, when the candidate is rejected, or when it equals the task's
    /// current schedule.
    pub fn release(&mut self, x: f32, viewport: &TimelineViewport) -> Option<ResizeCommit> {
        let session = self.session.take()?;
        propose(&session, x - session.initial_x, viewport).filter(|commit| {
            commit.new_start != session.initial_start || commit.duration_weeks != session.initial_duration
        })
    }

    pub fn cancel(&mut self) {
        self.session = None;
    }
}

fn propose(session: &ResizeSession, dx: f32, viewport: &TimelineViewport) -> Option<ResizeCommit> {
    let grid = viewport.grid();
    let week = grid.week();
    let min = i64::from(grid.config().min_duration_weeks);
    let start = session.initial_start;
    let duration = i64::from(session.initial_duration);
    let fixed_end = grid.task_end(start, session.initial_duration);

    let (new_start, weeks) = match (viewport.mode(), session.handle) {
        (ViewMode::Week, ResizeHandle::End) => {
            let delta = (dx / week.week_width).round() as i64;
            (start, (duration + delta).max(min))
        }
        (ViewMode::Week, ResizeHandle::Start) => {
            let delta = (dx / week.week_width).round() as i64;
            let proposed = week.add_units(start, delta);
            // Raw inclusive span: a start dragged past the end goes to zero or
            // below and is rejected instead of clamped.
            let span = week.units_between(proposed, fixed_end) + 1;
            if span < min {
                return None;
            }
            (week.unit_start(proposed), span)
        }
        (ViewMode::Month, ResizeHandle::End) => {
            let month = grid.month();
            let anchor = viewport.anchor();
            let end_px = month.date_to_pixel(anchor, fixed_end);
            let new_end = month.unit_start(month.pixel_to_date(anchor, (end_px + dx).max(0.0)));
            (start, weeks_spanned(start, new_end).max(min))
        }
        (ViewMode::Month, ResizeHandle::Start) => {
            let month = grid.month();
            let anchor = viewport.anchor();
            let start_px = month.date_to_pixel(anchor, start);
            let proposed = month.unit_start(month.pixel_to_date(anchor, (start_px + dx).max(0.0)));
            if proposed >= fixed_end {
                return None;
            }
            (proposed, weeks_spanned(proposed, fixed_end).max(min))
        }
    };

    Some(ResizeCommit {
        task_id: session.task_id.clone(),
        new_start,
        duration_weeks: u32::try_from(weeks).unwrap_or(u32::MAX),
    })
}

/// `ceil(days / 7)` for a forward span; zero for an empty or backward one.
fn weeks_spanned(from: NaiveDate, to: NaiveDate) -> i64 {
    let days = days_between(from, to);
    if days <= 0 {
        0
    } else {
        (days + 6) / 7
    }
}
