use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A labelled marker on one calendar week. At most one per week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    /// First day of the marked week.
    pub date: NaiveDate,
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Milestone {
    pub(crate) fn new(week_start: NaiveDate, label: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: format!("milestone-{}", Uuid::new_v4()),
            date: week_start,
            label: label.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn relabelled(&self, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            updated_at: Utc::now(),
            ..self.clone()
        }
    }
}

/// Fields supplied by the user when adding a milestone. `date` may be any
/// day of the target week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneInput {
    pub date: NaiveDate,
    pub label: String,
}

impl MilestoneInput {
    pub fn new(date: NaiveDate, label: impl Into<String>) -> Self {
        Self {
            date,
            label: label.into(),
        }
    }
}
