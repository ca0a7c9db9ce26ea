//! Timeline geometry, lane stacking and pointer gestures for a week/month
//! task planner.
//!
//! The engine is pure: dates go in, pixels and lane indices come out. The
//! egui shell in the `taskline` binary is one consumer of it.

pub mod config;
pub mod error;
pub mod interaction;
pub mod io;
pub mod layout;
pub mod model;
pub mod store;

pub use config::TimelineConfig;
pub use error::{Result, TimelineError};
pub use interaction::{GestureKind, InteractionController, MoveCommit, ResizeCommit, ResizeHandle};
pub use io::Storage;
pub use layout::{CoordinateMap, Grid, TaskRect, TimeScale};
pub use model::{
    DateRange, Milestone, MilestoneInput, Task, TaskInput, TimelineViewport, ViewMode,
    ViewSettings,
};
pub use store::{MilestoneList, TaskList, TaskStore};
