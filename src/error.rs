//! Error types shared by the timeline pipeline, the store and the commands.
//!
//! Every variant is terminal for the pipeline run that produced it: nothing is
//! retried and nothing is partially written.

use std::io;

/// Errors raised while validating, laying out or persisting projects.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A task's own interval is empty or escapes its parent's interval.
    #[error("invalid dates for task '{task}': {reason}")]
    DateRange { task: String, reason: String },

    /// A leaf task's progress is outside `[0, 100]`.
    #[error("progress {progress} for task '{task}' is outside 0-100")]
    ProgressRange { task: String, progress: f64 },

    /// Progress was set directly on a task whose progress comes from its subtasks.
    #[error("progress of task '{0}' is derived from its subtasks")]
    DerivedProgress(String),

    /// A referenced project, task or dependency does not exist.
    #[error("{what} '{key}' not found")]
    NotFound { what: &'static str, key: String },

    /// Two tasks in the same project share an id.
    #[error("task id {0} is used more than once in the project")]
    DuplicateTaskId(u64),

    /// A name matched more than one project or task.
    #[error("multiple {what}s named '{name}': {candidates}. Use the id instead")]
    AmbiguousName {
        what: &'static str,
        name: String,
        candidates: String,
    },

    /// Layout was asked for a timeline with no rows.
    #[error("cannot lay out an empty timeline")]
    EmptyTimeline,

    /// A date argument could not be parsed.
    #[error("could not understand date '{0}'")]
    InvalidDate(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a missing project.
    pub fn project_not_found(key: impl ToString) -> Self {
        Error::NotFound {
            what: "project",
            key: key.to_string(),
        }
    }

    /// Shorthand for a missing task.
    pub fn task_not_found(key: impl ToString) -> Self {
        Error::NotFound {
            what: "task",
            key: key.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
