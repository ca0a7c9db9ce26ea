pub mod coords;
pub mod grid;
pub mod stacking;

pub use coords::{CoordinateMap, TaskRect};
pub use grid::{days_between, days_in_month, Grid, MonthScale, TimeScale, WeekScale};
pub use stacking::{find_overlapping, group_overlapping, stack_tasks, tasks_overlap, timeline_height};
