//! Lane assignment for overlapping task bars.
//!
//! Every call works on the full task set and carries no state between calls,
//! so the same set always produces the same lanes.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::config::TimelineConfig;
use crate::model::Task;

/// Closed-interval overlap; ranges that share a single day overlap.
pub fn ranges_overlap(start1: NaiveDate, end1: NaiveDate, start2: NaiveDate, end2: NaiveDate) -> bool {
    start1 <= end2 && start2 <= end1
}

pub fn tasks_overlap(a: &Task, b: &Task) -> bool {
    ranges_overlap(a.start_date(), a.end_date(), b.start_date(), b.end_date())
}

/// Tasks in `others` overlapping `task`, excluding `task` itself.
pub fn find_overlapping<'a>(task: &Task, others: &'a [Task]) -> Vec<&'a Task> {
    others
        .iter()
        .filter(|other| other.id != task.id && tasks_overlap(task, other))
        .collect()
}

/// Split tasks into runs, ordered by start date, where each task overlaps at
/// least one earlier task of its run.
pub fn group_overlapping(tasks: &[Task]) -> Vec<Vec<&Task>> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by_key(|task| task.start_date());

    let mut groups: Vec<Vec<&Task>> = Vec::new();
    for task in sorted {
        match groups.last_mut() {
            Some(group) if group.iter().any(|member| tasks_overlap(task, member)) => group.push(task),
            _ => groups.push(vec![task]),
        }
    }
    groups
}

/// Assign every task the lowest lane not used by an overlapping task placed
/// before it.
///
/// Placement order is start date, then longer duration first, then id. The
/// result keeps the input order; only `stack_position` differs.
pub fn stack_tasks(tasks: &[Task]) -> Vec<Task> {
    let mut order: Vec<usize> = (0..tasks.len()).collect();
    order.sort_by(|&a, &b| {
        let (a, b) = (&tasks[a], &tasks[b]);
        (a.start_date(), Reverse(a.duration_weeks()), &a.id)
            .cmp(&(b.start_date(), Reverse(b.duration_weeks()), &b.id))
    });

    let mut lanes = vec![0u32; tasks.len()];
    let mut placed: Vec<usize> = Vec::with_capacity(tasks.len());
    for index in order {
        let task = &tasks[index];
        let used: BTreeSet<u32> = placed
            .iter()
            .filter(|&&other| tasks_overlap(task, &tasks[other]))
            .map(|&other| lanes[other])
            .collect();
        lanes[index] = (0..).find(|lane| !used.contains(lane)).unwrap_or(0);
        placed.push(index);
    }

    tasks
        .iter()
        .zip(lanes)
        .map(|(task, stack_position)| {
            let mut task = task.clone();
            task.stack_position = stack_position;
            task
        })
        .collect()
}

/// Height needed to draw every lane; one lane when there are no tasks.
pub fn timeline_height(tasks: &[Task], config: &TimelineConfig) -> f32 {
    let lanes = tasks
        .iter()
        .map(|task| task.stack_position)
        .max()
        .map_or(1, |max| max + 1);
    lanes as f32 * config.lane_height()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Grid;
    use crate::model::TaskInput;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(grid: &Grid, id: &str, start: NaiveDate, weeks: u32) -> Task {
        let mut task = Task::from_input(TaskInput::new(id, start, weeks, "#3b82f6"), grid);
        task.id = id.to_string();
        task
    }

    fn lanes(tasks: &[Task]) -> Vec<u32> {
        tasks.iter().map(|t| t.stack_position).collect()
    }

    #[test]
    fn touching_ranges_overlap() {
        assert!(ranges_overlap(date(2024, 1, 1), date(2024, 1, 10), date(2024, 1, 10), date(2024, 1, 20)));
        assert!(!ranges_overlap(date(2024, 1, 1), date(2024, 1, 10), date(2024, 1, 11), date(2024, 1, 20)));
        assert!(ranges_overlap(date(2024, 1, 1), date(2024, 1, 31), date(2024, 1, 10), date(2024, 1, 20)));
    }

    #[test]
    fn empty_set_has_one_row() {
        assert!(stack_tasks(&[]).is_empty());
        assert_eq!(timeline_height(&[], &TimelineConfig::default()), 44.0);
    }

    #[test]
    fn two_overlapping_tasks_take_two_lanes() {
        let grid = Grid::default();
        // [Jan 1 - Jan 14] and [Jan 8 - Jan 21]
        let tasks = vec![
            task(&grid, "a", date(2024, 1, 1), 2),
            task(&grid, "b", date(2024, 1, 8), 2),
        ];
        let stacked = stack_tasks(&tasks);
        let mut positions = lanes(&stacked);
        positions.sort();
        assert_eq!(positions, vec![0, 1]);
        assert_eq!(timeline_height(&stacked, grid.config()), 2.0 * 44.0);
    }

    #[test]
    fn freed_lane_is_reused() {
        let grid = Grid::default();
        let tasks = vec![
            task(&grid, "long", date(2024, 1, 1), 6),
            task(&grid, "early", date(2024, 1, 1), 1),
            task(&grid, "late", date(2024, 1, 15), 1),
        ];
        assert_eq!(lanes(&stack_tasks(&tasks)), vec![0, 1, 1]);
    }

    #[test]
    fn longer_task_claims_lower_lane_on_tie() {
        let grid = Grid::default();
        let tasks = vec![
            task(&grid, "short", date(2024, 1, 1), 1),
            task(&grid, "long", date(2024, 1, 1), 3),
        ];
        assert_eq!(lanes(&stack_tasks(&tasks)), vec![1, 0]);
    }

    #[test]
    fn output_preserves_input_order() {
        let grid = Grid::default();
        let tasks = vec![
            task(&grid, "c", date(2024, 3, 4), 1),
            task(&grid, "a", date(2024, 1, 1), 1),
            task(&grid, "b", date(2024, 2, 5), 1),
        ];
        let ids: Vec<_> = stack_tasks(&tasks).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn groups_split_on_gaps() {
        let grid = Grid::default();
        let tasks = vec![
            task(&grid, "a", date(2024, 1, 1), 2),
            task(&grid, "far", date(2024, 6, 3), 1),
            task(&grid, "b", date(2024, 1, 8), 1),
        ];
        let groups: Vec<Vec<&str>> = group_overlapping(&tasks)
            .into_iter()
            .map(|g| g.into_iter().map(|t| t.id.as_str()).collect())
            .collect();
        assert_eq!(groups, vec![vec!["a", "b"], vec!["far"]]);
        assert_eq!(find_overlapping(&tasks[0], &tasks).len(), 1);
    }

    fn arb_tasks() -> impl Strategy<Value = Vec<Task>> {
        prop::collection::vec((0i64..120, 1u32..8), 0..24).prop_map(|shapes| {
            let grid = Grid::default();
            shapes
                .into_iter()
                .enumerate()
                .map(|(i, (offset, weeks))| {
                    task(&grid, &format!("t{i}"), date(2024, 1, 1) + chrono::Duration::days(offset), weeks)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn stacking_is_idempotent(tasks in arb_tasks()) {
            let once = stack_tasks(&tasks);
            let twice = stack_tasks(&once);
            prop_assert_eq!(lanes(&once), lanes(&twice));
        }

        #[test]
        fn stacking_ignores_input_order(tasks in arb_tasks()) {
            let forward = stack_tasks(&tasks);
            let mut reversed = tasks.clone();
            reversed.reverse();
            let mut backward = stack_tasks(&reversed);
            backward.reverse();
            prop_assert_eq!(lanes(&forward), lanes(&backward));
        }

        #[test]
        fn overlapping_tasks_never_share_a_lane(tasks in arb_tasks()) {
            let stacked = stack_tasks(&tasks);
            for (i, a) in stacked.iter().enumerate() {
                for b in &stacked[i + 1..] {
                    if tasks_overlap(a, b) {
                        prop_assert_ne!(a.stack_position, b.stack_position);
                    }
                }
            }
        }

        #[test]
        fn lane_count_matches_largest_clique(tasks in arb_tasks()) {
            let stacked = stack_tasks(&tasks);
            // For intervals the largest clique is the deepest point of overlap,
            // reached at some task's start date.
            let clique = stacked
                .iter()
                .map(|t| {
                    stacked
                        .iter()
                        .filter(|o| o.start_date() <= t.start_date() && t.start_date() <= o.end_date())
                        .count()
                })
                .max()
                .unwrap_or(0);
            let max_lane = stacked.iter().map(|t| t.stack_position as usize + 1).max().unwrap_or(0);
            prop_assert!(max_lane <= clique);
        }
    }
}
