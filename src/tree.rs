//! Structural helpers over the owned task tree.
//!
//! The tree owns its nodes; the only parent relation kept outside the
//! ownership chain is [`ParentIndex`], a plain id-to-id map rebuilt on demand.

use std::collections::{BTreeMap, HashSet};

use tracing::warn;

use crate::error::{Error, Result};
use crate::task::Task;

/// Rewrite every `parent_id` from the ownership chain.
///
/// Top-level tasks get `parent`; each subtask gets its owner's id. Returns a
/// new tree so callers can stage the result.
pub fn link_parents(tasks: &[Task], parent: Option<u64>) -> Vec<Task> {
    tasks
        .iter()
        .map(|t| {
            let mut linked = t.clone();
            if t.parent_id.is_some() && t.parent_id != parent {
                warn!(task = %t.name, stated = ?t.parent_id, actual = ?parent, "parent_id overwritten from tree position");
            }
            linked.parent_id = parent;
            linked.subtasks = link_parents(&t.subtasks, t.id);
            linked
        })
        .collect()
}

/// Non-owning map from task id to the id of its parent (`None` for roots).
#[derive(Debug, Default, Clone)]
pub struct ParentIndex {
    parents: BTreeMap<u64, Option<u64>>,
}

impl ParentIndex {
    /// Build the index from the owned tree. Tasks without ids are skipped.
    pub fn build(tasks: &[Task]) -> Self {
        let mut index = ParentIndex::default();
        index.fill(tasks, None);
        index
    }

    fn fill(&mut self, tasks: &[Task], parent: Option<u64>) {
        for t in tasks {
            if let Some(id) = t.id {
                self.parents.insert(id, parent);
            }
            self.fill(&t.subtasks, t.id);
        }
    }

    pub fn contains(&self, id: u64) -> bool {
        self.parents.contains_key(&id)
    }

    /// Parent of `id`, or `None` for roots and unknown ids.
    pub fn parent_of(&self, id: u64) -> Option<u64> {
        self.parents.get(&id).copied().flatten()
    }

    /// Ancestor chain of `id`, closest first.
    pub fn ancestors(&self, id: u64) -> Vec<u64> {
        let mut chain = Vec::new();
        let mut cur = self.parent_of(id);
        while let Some(p) = cur {
            chain.push(p);
            cur = self.parent_of(p);
        }
        chain
    }
}

/// Highest id present anywhere in the tree.
pub fn max_id(tasks: &[Task]) -> Option<u64> {
    tasks
        .iter()
        .flat_map(|t| t.id.into_iter().chain(max_id(&t.subtasks)))
        .max()
}

/// Give every id-less task a fresh id, pre-order, counting up from the
/// current maximum. Existing ids are left alone.
pub fn assign_ids(tasks: &mut [Task]) {
    let mut next = max_id(tasks).unwrap_or(0) + 1;
    assign_from(tasks, &mut next);
}

fn assign_from(tasks: &mut [Task], next: &mut u64) {
    for t in tasks.iter_mut() {
        if t.id.is_none() {
            t.id = Some(*next);
            *next += 1;
        }
        assign_from(&mut t.subtasks, next);
    }
}

/// Fail if two tasks anywhere in the tree carry the same id.
pub fn check_unique_ids(tasks: &[Task]) -> Result<()> {
    fn visit(tasks: &[Task], seen: &mut HashSet<u64>) -> Result<()> {
        for t in tasks {
            if let Some(id) = t.id {
                if !seen.insert(id) {
                    return Err(Error::DuplicateTaskId(id));
                }
            }
            visit(&t.subtasks, seen)?;
        }
        Ok(())
    }
    visit(tasks, &mut HashSet::new())
}

/// Every dependency must name a task in the same project.
pub fn check_dependencies(tasks: &[Task]) -> Result<()> {
    let index = ParentIndex::build(tasks);
    fn visit(tasks: &[Task], index: &ParentIndex) -> Result<()> {
        for t in tasks {
            if let Some(missing) = t.dependencies.iter().find(|d| !index.contains(**d)) {
                return Err(Error::NotFound {
                    what: "dependency",
                    key: format!("{} (of task '{}')", missing, t.name),
                });
            }
            visit(&t.subtasks, index)?;
        }
        Ok(())
    }
    visit(tasks, &index)
}

pub fn find(tasks: &[Task], id: u64) -> Option<&Task> {
    for t in tasks {
        if t.id == Some(id) {
            return Some(t);
        }
        if let Some(found) = find(&t.subtasks, id) {
            return Some(found);
        }
    }
    None
}

pub fn find_mut(tasks: &mut [Task], id: u64) -> Option<&mut Task> {
    for t in tasks.iter_mut() {
        if t.id == Some(id) {
            return Some(t);
        }
        if let Some(found) = find_mut(&mut t.subtasks, id) {
            return Some(found);
        }
    }
    None
}

/// Resolve a task identifier (either id or name) to a task id.
/// Names match case-insensitively; more than one match is an error.
pub fn resolve_task(tasks: &[Task], identifier: &str) -> Result<u64> {
    if let Ok(id) = identifier.parse::<u64>() {
        return find(tasks, id)
            .map(|_| id)
            .ok_or_else(|| Error::task_not_found(id));
    }

    let wanted = identifier.to_lowercase();
    let mut matches = Vec::new();
    collect_named(tasks, &wanted, &mut matches);

    match matches.as_slice() {
        [] => Err(Error::task_not_found(identifier)),
        [only] => only.id.ok_or_else(|| Error::task_not_found(identifier)),
        many => Err(Error::AmbiguousName {
            what: "task",
            name: identifier.to_string(),
            candidates: many
                .iter()
                .map(|t| t.display_name())
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

fn collect_named<'a>(tasks: &'a [Task], wanted: &str, out: &mut Vec<&'a Task>) {
    for t in tasks {
        if t.name.to_lowercase() == wanted {
            out.push(t);
        }
        collect_named(&t.subtasks, wanted, out);
    }
}
