//! Turning the task tree into the row order shown on the timeline.

use crate::task::Task;

/// A task reference tagged with its nesting depth (roots are depth 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatTask<'a> {
    pub task: &'a Task,
    pub depth: usize,
}

/// Pre-order walk: each task is followed immediately by its whole subtree.
pub fn flatten(tasks: &[Task], depth: usize) -> Vec<FlatTask<'_>> {
    let mut out = Vec::new();
    push_preorder(tasks, depth, &mut out);
    out
}

fn push_preorder<'a>(tasks: &'a [Task], depth: usize, out: &mut Vec<FlatTask<'a>>) {
    for task in tasks {
        out.push(FlatTask { task, depth });
        push_preorder(&task.subtasks, depth + 1, out);
    }
}

/// Latest-starting task first. The sort is stable and ignores the tree, so
/// a nested subtask can end up next to an unrelated root.
pub fn sort_for_display(flat: &mut [FlatTask<'_>]) {
    flat.sort_by(|a, b| b.task.start_date.cmp(&a.task.start_date));
}

/// Flatten then sort: the row order the layout engine expects.
pub fn timeline(tasks: &[Task]) -> Vec<FlatTask<'_>> {
    let mut flat = flatten(tasks, 0);
    sort_for_display(&mut flat);
    flat
}
