pub mod milestone;
pub mod task;
pub mod timeline;

pub use milestone::{Milestone, MilestoneInput};
pub use task::{Task, TaskInput};
pub use timeline::{DateRange, TimelineViewport, ViewMode, ViewSettings};
