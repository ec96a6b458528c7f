//! Task data structure and related functionality.
//!
//! A `Task` is a node in an owned tree: each task holds its subtasks by value,
//! so a task can only ever sit in one place and the tree cannot contain cycles.
//! The `parent_id` back-reference is a plain id, never a pointer, and is
//! rewritten from the ownership chain by [`crate::tree::link_parents`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A unit of work with a date interval, an owner and a completion percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TaskRecord", into = "TaskRecord")]
pub struct Task {
    pub id: Option<u64>,
    pub name: String,
    pub responsible: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Authoritative for leaves, derived for tasks with subtasks.
    pub progress: f64,
    pub parent_id: Option<u64>,
    pub subtasks: Vec<Task>,
    pub dependencies: Vec<u64>,
}

impl Task {
    /// Create a top-level leaf task with no progress.
    pub fn new(
        name: impl Into<String>,
        responsible: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Task {
            id: None,
            name: name.into(),
            responsible: responsible.into(),
            start_date,
            end_date,
            progress: 0.0,
            parent_id: None,
            subtasks: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_subtasks(mut self, subtasks: Vec<Task>) -> Self {
        self.subtasks = subtasks;
        self
    }

    /// True iff the task hangs under another task.
    pub fn is_subtask(&self) -> bool {
        self.parent_id.is_some()
    }

    /// True iff the task has no subtasks, i.e. its progress is authoritative.
    pub fn is_leaf(&self) -> bool {
        self.subtasks.is_empty()
    }

    /// Number of tasks below this one, at any depth.
    pub fn descendant_count(&self) -> usize {
        self.subtasks
            .iter()
            .map(|t| 1 + t.descendant_count())
            .sum()
    }

    /// Length of the interval in days (zero for a single-day task).
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Label used in listings: `#id name` or just the name before an id is assigned.
    pub fn display_name(&self) -> String {
        match self.id {
            Some(id) => format!("#{} {}", id, self.name),
            None => self.name.clone(),
        }
    }
}

// Wire shape. Accepts the legacy capitalised keys and ignores any incoming
// `is_subtask`, which is recomputed from `parent_id` on the way out.
#[derive(Serialize, Deserialize)]
struct TaskRecord {
    #[serde(default)]
    id: Option<u64>,
    #[serde(alias = "Task")]
    name: String,
    #[serde(alias = "Responsibility")]
    responsible: String,
    #[serde(alias = "Start_date")]
    start_date: NaiveDate,
    #[serde(alias = "End_Date")]
    end_date: NaiveDate,
    #[serde(default)]
    progress: Option<f64>,
    #[serde(default)]
    parent_id: Option<u64>,
    #[serde(default)]
    subtasks: Vec<Task>,
    #[serde(default)]
    is_subtask: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dependencies: Option<Vec<u64>>,
}

impl From<TaskRecord> for Task {
    fn from(r: TaskRecord) -> Self {
        Task {
            id: r.id,
            name: r.name,
            responsible: r.responsible,
            start_date: r.start_date,
            end_date: r.end_date,
            progress: r.progress.unwrap_or(0.0),
            parent_id: r.parent_id,
            subtasks: r.subtasks,
            dependencies: r.dependencies.unwrap_or_default(),
        }
    }
}

impl From<Task> for TaskRecord {
    fn from(t: Task) -> Self {
        TaskRecord {
            is_subtask: t.is_subtask(),
            id: t.id,
            name: t.name,
            responsible: t.responsible,
            start_date: t.start_date,
            end_date: t.end_date,
            progress: Some(t.progress),
            parent_id: t.parent_id,
            subtasks: t.subtasks,
            dependencies: if t.dependencies.is_empty() {
                None
            } else {
                Some(t.dependencies)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_reads_legacy_record_keys() {
        let json = r#"{
            "id": 3,
            "Task": "Assembly",
            "Responsibility": "Jalath",
            "Start_date": "2025-02-20",
            "End_Date": "2025-03-05",
            "progress": null,
            "dependencies": [1, 2]
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, Some(3));
        assert_eq!(task.name, "Assembly");
        assert_eq!(task.responsible, "Jalath");
        assert_eq!(task.start_date, d("2025-02-20"));
        assert_eq!(task.progress, 0.0);
        assert_eq!(task.dependencies, vec![1, 2]);
        assert!(task.subtasks.is_empty());
    }

    #[test]
    fn test_is_subtask_follows_parent_id() {
        // A stale incoming flag is ignored.
        let json = r#"{"name":"a","responsible":"r","start_date":"2025-01-01",
                       "end_date":"2025-01-02","is_subtask":true}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(!task.is_subtask());

        let mut child = Task::new("b", "r", d("2025-01-01"), d("2025-01-01"));
        child.parent_id = Some(9);
        let value = serde_json::to_value(&child).unwrap();
        assert_eq!(value["is_subtask"], serde_json::Value::Bool(true));
        assert_eq!(value["start_date"], "2025-01-01");
        assert!(value.get("dependencies").is_none());
    }

    #[test]
    fn test_descendant_count_and_duration() {
        let tree = Task::new("root", "r", d("2025-01-01"), d("2025-01-31")).with_subtasks(vec![
            Task::new("a", "r", d("2025-01-01"), d("2025-01-10"))
                .with_subtasks(vec![Task::new("a1", "r", d("2025-01-02"), d("2025-01-03"))]),
            Task::new("b", "r", d("2025-01-11"), d("2025-01-31")),
        ]);
        assert_eq!(tree.descendant_count(), 3);
        assert_eq!(tree.duration_days(), 30);
        assert!(!tree.is_leaf());
        assert!(tree.subtasks[1].is_leaf());
    }
}
