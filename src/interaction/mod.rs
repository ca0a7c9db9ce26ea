//! Pointer gestures on task bars.
//!
//! [`InteractionController`] owns both state machines and guarantees that at
//! most one gesture (a move or a resize) is active at a time.

pub mod drag;
pub mod resize;

use chrono::NaiveDate;
use tracing::debug;

pub use drag::{MoveCommit, MoveDrag};
pub use resize::{ResizeCommit, ResizeDrag, ResizeHandle};

use crate::error::{Result, TimelineError};
use crate::model::{Task, TimelineViewport};
use crate::store::TaskStore;

/// The kind of gesture currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Move,
    Resize,
}

impl GestureKind {
    fn name(self) -> &'static str {
        match self {
            GestureKind::Move => "move",
            GestureKind::Resize => "resize",
        }
    }
}

/// Single owner of the active gesture.
///
/// Starting a second gesture while one is active is rejected and leaves the
/// active one untouched.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    moving: MoveDrag,
    resizing: ResizeDrag,
}

impl InteractionController {
    pub fn active(&self) -> Option<GestureKind> {
        if self.moving.is_dragging() {
            Some(GestureKind::Move)
        } else if self.resizing.is_resizing() {
            Some(GestureKind::Resize)
        } else {
            None
        }
    }

    /// Id of the task under the active gesture.
    pub fn active_task_id(&self) -> Option<&str> {
        self.moving
            .active_task()
            .map(|task| task.id.as_str())
            .or_else(|| self.resizing.active().map(|(id, _)| id))
    }

    fn ensure_idle(&self) -> Result<()> {
        match self.active() {
            Some(kind) => Err(TimelineError::GestureInProgress(kind.name())),
            None => Ok(()),
        }
    }

    pub fn begin_move(&mut self, task: &Task) -> Result<()> {
        self.ensure_idle()?;
        debug!(task_id = %task.id, "move started");
        self.moving.begin(task);
        Ok(())
    }

    pub fn begin_resize(&mut self, task: &Task, handle: ResizeHandle, pointer_x: f32) -> Result<()> {
        self.ensure_idle()?;
        debug!(task_id = %task.id, ?handle, "resize started");
        self.resizing.begin(task, handle, pointer_x);
        Ok(())
    }

    /// Record a pointer sample; resize previews pick it up on the next frame.
    pub fn pointer_moved(&mut self, pointer_x: f32) {
        self.resizing.pointer_moved(pointer_x);
    }

    /// Start date a move would commit if released at `dx`.
    pub fn move_preview(&self, dx: f32, viewport: &TimelineViewport) -> Option<NaiveDate> {
        self.moving.proposed_start(dx, viewport)
    }

    /// Resize candidate for the current frame.
    pub fn resize_preview(&mut self, viewport: &TimelineViewport) -> Option<ResizeCommit> {
        self.resizing.frame(viewport).cloned()
    }

    /// Release a move at horizontal displacement `dx`. Returns whether the
    /// store accepted a change.
    pub fn finish_move(&mut self, dx: f32, viewport: &TimelineViewport, store: &mut impl TaskStore) -> bool {
        match self.moving.release(dx, viewport) {
            Some(commit) => store.move_task(&commit.task_id, commit.new_start),
            None => false,
        }
    }

    /// Release a resize at pointer position `pointer_x`. Returns whether the
    /// store accepted a change.
    pub fn finish_resize(
        &mut self,
        pointer_x: f32,
        viewport: &TimelineViewport,
        store: &mut impl TaskStore,
    ) -> bool {
        match self.resizing.release(pointer_x, viewport) {
            Some(commit) => store.resize_task(&commit.task_id, commit.new_start, commit.duration_weeks),
            None => false,
        }
    }

    /// Drop whatever gesture is active without committing.
    pub fn cancel(&mut self) {
        if let Some(kind) = self.active() {
            debug!(gesture = kind.name(), "gesture cancelled");
        }
        self.moving.cancel();
        self.resizing.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Grid;
    use crate::model::{TaskInput, ViewMode};
    use crate::store::TaskList;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Move(String, NaiveDate),
        Resize(String, NaiveDate, u32),
    }

    /// Store double recording the calls gestures make.
    #[derive(Default)]
    struct Recorder {
        tasks: Vec<Task>,
        calls: Vec<Call>,
    }

    impl TaskStore for Recorder {
        fn add_task(&mut self, input: TaskInput) -> String {
            let task = Task::from_input(input, &Grid::default());
            let id = task.id.clone();
            self.tasks.push(task);
            id
        }

        fn update_task(&mut self, _task: Task) -> bool {
            unreachable!("gestures never call update_task")
        }

        fn delete_task(&mut self, _id: &str) -> bool {
            unreachable!("gestures never call delete_task")
        }

        fn move_task(&mut self, id: &str, new_start: NaiveDate) -> bool {
            self.calls.push(Call::Move(id.to_string(), new_start));
            true
        }

        fn resize_task(&mut self, id: &str, new_start: NaiveDate, duration_weeks: u32) -> bool {
            self.calls.push(Call::Resize(id.to_string(), new_start, duration_weeks));
            true
        }

        fn get_task_by_id(&self, id: &str) -> Option<Task> {
            self.tasks.iter().find(|t| t.id == id).cloned()
        }
    }

    fn setup() -> (TimelineViewport, Recorder, Task) {
        let viewport = TimelineViewport::new(Grid::default(), ViewMode::Week, date(2024, 1, 1), date(2024, 6, 3));
        let mut store = Recorder::default();
        let id = store.add_task(TaskInput::new("Jan 8", date(2024, 1, 8), 4, "#3b82f6"));
        let task = store.get_task_by_id(&id).unwrap();
        (viewport, store, task)
    }

    #[test]
    fn drag_right_one_week_commits_move() {
        let (vp, mut store, task) = setup();
        let mut ctl = InteractionController::default();
        ctl.begin_move(&task).unwrap();
        assert_eq!(ctl.move_preview(100.0, &vp), Some(date(2024, 1, 15)));
        assert!(ctl.finish_move(100.0, &vp, &mut store));
        assert_eq!(store.calls, vec![Call::Move(task.id.clone(), date(2024, 1, 15))]);
        assert_eq!(ctl.active(), None);
    }

    #[test]
    fn click_without_move_makes_no_store_calls() {
        let (vp, mut store, task) = setup();
        let mut ctl = InteractionController::default();
        ctl.begin_move(&task).unwrap();
        assert!(!ctl.finish_move(49.0, &vp, &mut store));
        assert!(store.calls.is_empty());
    }

    #[test]
    fn end_resize_two_weeks_left() {
        let (vp, mut store, task) = setup();
        let mut ctl = InteractionController::default();
        ctl.begin_resize(&task, ResizeHandle::End, 400.0).unwrap();
        ctl.pointer_moved(300.0);
        assert_eq!(ctl.resize_preview(&vp).map(|c| c.duration_weeks), Some(3));
        assert!(ctl.finish_resize(200.0, &vp, &mut store));
        assert_eq!(store.calls, vec![Call::Resize(task.id.clone(), date(2024, 1, 8), 2)]);
    }

    #[test]
    fn end_resize_far_past_start_floors_at_one_week() {
        let (vp, mut store, task) = setup();
        let mut ctl = InteractionController::default();
        ctl.begin_resize(&task, ResizeHandle::End, 400.0).unwrap();
        assert!(ctl.finish_resize(-600.0, &vp, &mut store));
        assert_eq!(store.calls, vec![Call::Resize(task.id.clone(), date(2024, 1, 8), 1)]);
    }

    #[test]
    fn second_gesture_is_rejected() {
        let (vp, mut store, task) = setup();
        let mut ctl = InteractionController::default();
        ctl.begin_move(&task).unwrap();
        let err = ctl.begin_resize(&task, ResizeHandle::End, 0.0).unwrap_err();
        assert!(matches!(err, TimelineError::GestureInProgress("move")));
        assert!(ctl.begin_move(&task).is_err());
        // The first drag is still live and still commits.
        assert_eq!(ctl.active(), Some(GestureKind::Move));
        assert_eq!(ctl.active_task_id(), Some(task.id.as_str()));
        assert!(ctl.finish_move(200.0, &vp, &mut store));
        assert_eq!(store.calls, vec![Call::Move(task.id.clone(), date(2024, 1, 22))]);
        // Idle again, a new gesture may start.
        assert!(ctl.begin_resize(&task, ResizeHandle::Start, 0.0).is_ok());
    }

    #[test]
    fn cancel_never_commits() {
        let (vp, mut store, task) = setup();
        let mut ctl = InteractionController::default();
        ctl.begin_resize(&task, ResizeHandle::End, 0.0).unwrap();
        ctl.pointer_moved(800.0);
        ctl.cancel();
        assert_eq!(ctl.active(), None);
        assert!(!ctl.finish_resize(800.0, &vp, &mut store));
        assert!(!ctl.finish_move(800.0, &vp, &mut store));
        assert!(store.calls.is_empty());
    }

    #[test]
    fn commit_for_deleted_task_is_a_no_op() {
        let vp = TimelineViewport::new(Grid::default(), ViewMode::Week, date(2024, 1, 1), date(2024, 6, 3));
        let mut list = TaskList::new(Grid::default());
        let id = list.add_task(TaskInput::new("Doomed", date(2024, 1, 8), 4, "#3b82f6"));
        let task = list.get_task_by_id(&id).unwrap();

        let mut ctl = InteractionController::default();
        ctl.begin_move(&task).unwrap();
        list.delete_task(&id);
        assert!(!ctl.finish_move(300.0, &vp, &mut list));
        assert!(list.is_empty());
        assert_eq!(ctl.active(), None);
    }
}
