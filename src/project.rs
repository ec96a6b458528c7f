//! Projects and the validate / roll-up / layout pipeline run over them.
//!
//! A project owns an ordered list of top-level tasks, each the root of its own
//! subtask tree. Every create or update passes through [`Project::validated`],
//! which returns a new project and never edits the one it was given.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::flatten::timeline;
use crate::layout::{layout, DrawPlan};
use crate::task::Task;
use crate::tree;
use crate::validate::validate;

/// A named collection of task trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// Set once when the project is first stored.
    #[serde(default)]
    pub created_at: Option<NaiveDate>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Project {
            id: None,
            name: name.into(),
            description: None,
            tasks: Vec::new(),
            created_at: None,
        }
    }

    /// Run the full check over the project's task trees.
    ///
    /// Tasks without ids get fresh ones, parent links are rebuilt from the
    /// tree, ids and dependency references are checked, then dates and
    /// progress are validated and non-leaf progress is rolled up. The result
    /// is a fresh project; on error nothing has changed.
    pub fn validated(&self) -> Result<Project> {
        let mut staged = self.tasks.clone();
        tree::assign_ids(&mut staged);
        let linked = tree::link_parents(&staged, None);
        tree::check_unique_ids(&linked)?;
        tree::check_dependencies(&linked)?;
        let tasks = validate(&linked, None)?;
        debug!(project = %self.name, roots = tasks.len(), "validated project");
        Ok(Project {
            tasks,
            ..self.clone()
        })
    }

    /// Lay the project's tasks out on a timeline.
    pub fn draw_plan(&self) -> Result<DrawPlan> {
        layout(&timeline(&self.tasks))
    }

    /// Total number of tasks at every depth.
    pub fn task_count(&self) -> usize {
        self.tasks.iter().map(|t| 1 + t.descendant_count()).sum()
    }

    /// Mean progress of the top-level tasks, or `None` for an empty project.
    pub fn overall_progress(&self) -> Option<f64> {
        if self.tasks.is_empty() {
            return None;
        }
        let total: f64 = self.tasks.iter().map(|t| t.progress).sum();
        Some(total / self.tasks.len() as f64)
    }

    /// Earliest start and latest end across the top-level tasks.
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = self.tasks.iter().map(|t| t.start_date).min()?;
        let end = self.tasks.iter().map(|t| t.end_date).max()?;
        Some((start, end))
    }
}
