//! Bottom-up progress roll-up.

use crate::task::Task;

/// Effective progress of a task.
///
/// A leaf reports its own progress. A task with subtasks reports the plain
/// mean of its direct subtasks' effective progress: every subtask counts the
/// same regardless of its duration or how deep its own subtree goes.
pub fn aggregate(task: &Task) -> f64 {
    if task.subtasks.is_empty() {
        return task.progress;
    }
    let values: Vec<f64> = task.subtasks.iter().map(aggregate).collect();
    // Averaging offsets from the first value keeps a uniform set exact.
    let base = values[0];
    let offset: f64 = values.iter().map(|v| v - base).sum();
    base + offset / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, day).unwrap()
    }

    #[test]
    fn test_mean_of_two_leaves() {
        let root = Task::new("R", "x", d(1, 1), d(1, 10)).with_subtasks(vec![
            Task::new("A", "x", d(1, 1), d(1, 10)).with_progress(50.0),
            Task::new("B", "x", d(1, 5), d(1, 8)).with_progress(100.0),
        ]);
        assert_eq!(aggregate(&root), 75.0);
    }

    #[test]
    fn test_leaf_keeps_its_progress() {
        let leaf = Task::new("A", "x", d(1, 1), d(1, 2)).with_progress(33.0);
        assert_eq!(aggregate(&leaf), 33.0);
    }

    #[test]
    fn test_stale_parent_value_is_ignored_and_duration_does_not_weight() {
        let root = Task::new("R", "x", d(1, 1), d(3, 31))
            .with_progress(99.0)
            .with_subtasks(vec![
                Task::new("day", "x", d(1, 1), d(1, 1)).with_progress(0.0),
                Task::new("months", "x", d(1, 1), d(3, 31))
                    .with_subtasks(vec![
                        Task::new("m1", "x", d(1, 1), d(2, 1)).with_progress(100.0),
                        Task::new("m2", "x", d(2, 1), d(3, 31)).with_progress(50.0),
                    ]),
            ]);
        // (0 + (100 + 50) / 2) / 2
        assert_eq!(aggregate(&root), 37.5);
    }

    #[test]
    fn test_three_equal_leaves_keep_their_value() {
        let root = Task::new("R", "x", d(1, 1), d(1, 10)).with_subtasks(vec![
            Task::new("A", "x", d(1, 1), d(1, 3)).with_progress(10.7),
            Task::new("B", "x", d(1, 4), d(1, 6)).with_progress(10.7),
            Task::new("C", "x", d(1, 7), d(1, 10)).with_progress(10.7),
        ]);
        assert_eq!(aggregate(&root), 10.7);
    }

    fn uniform_tree(depth: u32, width: usize, p: f64) -> Task {
        let mut t = Task::new("n", "x", d(1, 1), d(1, 31)).with_progress(p);
        if depth > 0 {
            t.progress = 0.0;
            t.subtasks = (0..width).map(|_| uniform_tree(depth - 1, width, p)).collect();
        }
        t
    }

    proptest! {
        #[test]
        fn prop_uniform_leaves_roll_up_exactly(
            p in 0.0f64..=100.0,
            depth in 0u32..4,
            width in 1usize..4,
        ) {
            let tree = uniform_tree(depth, width, p);
            prop_assert_eq!(aggregate(&tree), p);
        }
    }
}
