//! Recursive date and progress validation fused with the progress roll-up.
//!
//! Validation never touches its input. It builds a fresh tree and returns it
//! only once every task in the sequence has passed, so a failure anywhere
//! leaves the caller's data exactly as it was.

use tracing::trace;

use crate::aggregate::aggregate;
use crate::error::{Error, Result};
use crate::task::Task;

/// Validate `tasks` against `parent`'s interval and recompute progress.
///
/// Each task is checked before its subtasks (pre-order). Subtasks are then
/// validated against the task itself, and once they come back the task's
/// progress is replaced by the mean of theirs. Leaves keep their progress.
/// Task order is preserved.
pub fn validate(tasks: &[Task], parent: Option<&Task>) -> Result<Vec<Task>> {
    tasks.iter().map(|t| validate_task(t, parent)).collect()
}

fn validate_task(task: &Task, parent: Option<&Task>) -> Result<Task> {
    check_interval(task)?;
    if let Some(parent) = parent {
        check_containment(task, parent)?;
    }
    if task.is_leaf() {
        check_progress(task)?;
    }

    let subtasks = validate(&task.subtasks, Some(task))?;
    let mut validated = Task {
        subtasks,
        ..task.clone()
    };
    if !validated.is_leaf() {
        validated.progress = aggregate(&validated);
        trace!(task = %task.name, progress = validated.progress, "rolled up progress");
    }
    Ok(validated)
}

fn check_interval(task: &Task) -> Result<()> {
    if task.start_date > task.end_date {
        return Err(Error::DateRange {
            task: task.name.clone(),
            reason: format!(
                "starts {} after it ends {}",
                task.start_date, task.end_date
            ),
        });
    }
    Ok(())
}

fn check_containment(task: &Task, parent: &Task) -> Result<()> {
    if task.start_date < parent.start_date {
        return Err(Error::DateRange {
            task: task.name.clone(),
            reason: format!(
                "starts {} before its parent '{}' starts {}",
                task.start_date, parent.name, parent.start_date
            ),
        });
    }
    if task.end_date > parent.end_date {
        return Err(Error::DateRange {
            task: task.name.clone(),
            reason: format!(
                "ends {} after its parent '{}' ends {}",
                task.end_date, parent.name, parent.end_date
            ),
        });
    }
    Ok(())
}

fn check_progress(task: &Task) -> Result<()> {
    if !(0.0..=100.0).contains(&task.progress) {
        return Err(Error::ProgressRange {
            task: task.name.clone(),
            progress: task.progress,
        });
    }
    Ok(())
}
