use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::layout::{stack_tasks, Grid};
use crate::model::{Task, TaskInput};

/// The task operations the timeline engine and the forms rely on.
///
/// The gesture machines only ever call [`TaskStore::move_task`] and
/// [`TaskStore::resize_task`]. Operations naming an unknown id do nothing and
/// return `false`.
pub trait TaskStore {
    fn add_task(&mut self, input: TaskInput) -> String;
    fn update_task(&mut self, task: Task) -> bool;
    fn delete_task(&mut self, id: &str) -> bool;
    /// Move keeping the duration; the end date is re-derived.
    fn move_task(&mut self, id: &str, new_start: NaiveDate) -> bool;
    fn resize_task(&mut self, id: &str, new_start: NaiveDate, duration_weeks: u32) -> bool;
    fn get_task_by_id(&self, id: &str) -> Option<Task>;
}

/// In-memory task store built from immutable snapshots.
///
/// Every mutation produces a new task vector and a freshly stacked copy of
/// it; readers holding an earlier [`Arc`] keep seeing their snapshot.
#[derive(Debug, Clone)]
pub struct TaskList {
    grid: Grid,
    stacked: Arc<Vec<Task>>,
}

impl TaskList {
    pub fn new(grid: Grid) -> Self {
        Self::with_tasks(grid, Vec::new())
    }

    /// Adopt persisted tasks, re-deriving end dates and lanes.
    pub fn with_tasks(grid: Grid, tasks: Vec<Task>) -> Self {
        let tasks = tasks.into_iter().map(|task| task.rederived(&grid)).collect();
        let mut list = Self {
            grid,
            stacked: Arc::default(),
        };
        list.replace(tasks);
        list
    }

    /// Current tasks, in insertion order, with lanes assigned.
    pub fn tasks(&self) -> Arc<Vec<Task>> {
        Arc::clone(&self.stacked)
    }

    pub fn len(&self) -> usize {
        self.stacked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacked.is_empty()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    fn replace(&mut self, tasks: Vec<Task>) {
        self.stacked = Arc::new(stack_tasks(&tasks));
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.stacked.iter().position(|task| task.id == id)
    }

    /// Swap one task for `f(task)`, or log and skip a stale id.
    fn modify(&mut self, id: &str, op: &'static str, f: impl FnOnce(&Task) -> Task) -> bool {
        let Some(index) = self.position(id) else {
            debug!(task_id = id, op, "ignoring operation on unknown task");
            return false;
        };
        let mut tasks: Vec<Task> = self.stacked.as_ref().clone();
        tasks[index] = f(&tasks[index]);
        self.replace(tasks);
        true
    }
}

impl TaskStore for TaskList {
    fn add_task(&mut self, input: TaskInput) -> String {
        let task = Task::from_input(input, &self.grid);
        let id = task.id.clone();
        debug!(task_id = %id, start = %task.start_date(), weeks = task.duration_weeks(), "task added");
        let mut tasks = self.stacked.as_ref().clone();
        tasks.push(task);
        self.replace(tasks);
        id
    }

    fn update_task(&mut self, task: Task) -> bool {
        let grid = self.grid.clone();
        let id = task.id.clone();
        self.modify(&id, "update", |_| {
            task.rescheduled(&grid, task.start_date(), task.duration_weeks())
        })
    }

    fn delete_task(&mut self, id: &str) -> bool {
        if self.position(id).is_none() {
            debug!(task_id = id, "ignoring delete of unknown task");
            return false;
        }
        let tasks = self.stacked.iter().filter(|task| task.id != id).cloned().collect();
        self.replace(tasks);
        true
    }

    fn move_task(&mut self, id: &str, new_start: NaiveDate) -> bool {
        let grid = self.grid.clone();
        self.modify(id, "move", |task| {
            task.rescheduled(&grid, new_start, task.duration_weeks())
        })
    }

    fn resize_task(&mut self, id: &str, new_start: NaiveDate, duration_weeks: u32) -> bool {
        let grid = self.grid.clone();
        self.modify(id, "resize", |task| task.rescheduled(&grid, new_start, duration_weeks))
    }

    fn get_task_by_id(&self, id: &str) -> Option<Task> {
        self.stacked.iter().find(|task| task.id == id).cloned()
    }
}
