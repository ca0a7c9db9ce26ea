pub mod milestones;
pub mod tasks;

pub use milestones::MilestoneList;
pub use tasks::{TaskList, TaskStore};
