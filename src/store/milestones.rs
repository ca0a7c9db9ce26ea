use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::layout::{Grid, TimeScale};
use crate::model::{Milestone, MilestoneInput};

/// In-memory milestone store keeping at most one milestone per week.
#[derive(Debug, Clone)]
pub struct MilestoneList {
    grid: Grid,
    milestones: Arc<Vec<Milestone>>,
}

impl MilestoneList {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            milestones: Arc::default(),
        }
    }

    /// Adopt persisted milestones. Dates are snapped to week starts and only
    /// the first milestone of each week is kept.
    pub fn with_milestones(grid: Grid, loaded: Vec<Milestone>) -> Self {
        let mut milestones: Vec<Milestone> = Vec::with_capacity(loaded.len());
        for mut milestone in loaded {
            milestone.date = grid.week().unit_start(milestone.date);
            if milestones.iter().any(|m| m.date == milestone.date) {
                debug!(milestone_id = %milestone.id, week = %milestone.date, "dropping duplicate milestone");
                continue;
            }
            milestones.push(milestone);
        }
        Self {
            grid,
            milestones: Arc::new(milestones),
        }
    }

    pub fn milestones(&self) -> Arc<Vec<Milestone>> {
        Arc::clone(&self.milestones)
    }

    pub fn len(&self) -> usize {
        self.milestones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.milestones.is_empty()
    }

    /// Add a milestone for the week containing `input.date`, or relabel the
    /// one already there. Returns the id of the milestone now on that week.
    pub fn add_milestone(&mut self, input: MilestoneInput) -> String {
        let week = self.grid.week().unit_start(input.date);
        let mut milestones = self.milestones.as_ref().clone();
        let id = match milestones.iter_mut().find(|m| m.date == week) {
            Some(existing) => {
                *existing = existing.relabelled(input.label);
                existing.id.clone()
            }
            None => {
                let milestone = Milestone::new(week, input.label);
                let id = milestone.id.clone();
                milestones.push(milestone);
                id
            }
        };
        self.milestones = Arc::new(milestones);
        id
    }

    pub fn update_milestone(&mut self, id: &str, label: impl Into<String>) -> bool {
        let Some(index) = self.milestones.iter().position(|m| m.id == id) else {
            debug!(milestone_id = id, "ignoring update of unknown milestone");
            return false;
        };
        let mut milestones = self.milestones.as_ref().clone();
        milestones[index] = milestones[index].relabelled(label);
        self.milestones = Arc::new(milestones);
        true
    }

    pub fn delete_milestone(&mut self, id: &str) -> bool {
        if !self.milestones.iter().any(|m| m.id == id) {
            debug!(milestone_id = id, "ignoring delete of unknown milestone");
            return false;
        }
        let milestones = self.milestones.iter().filter(|m| m.id != id).cloned().collect();
        self.milestones = Arc::new(milestones);
        true
    }

    /// The milestone on the week containing `date`.
    pub fn milestone_for_date(&self, date: NaiveDate) -> Option<&Milestone> {
        let week = self.grid.week().unit_start(date);
        self.milestones.iter().find(|m| m.date == week)
    }
}
