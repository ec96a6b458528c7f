//! Project store and date helpers.
//!
//! This module provides the `Database` struct, which keeps every project in a
//! single JSON file, along with parsing helpers for the date arguments the
//! commands accept. Every write goes through the validation pipeline first,
//! so a rejected project never reaches disk.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::project::Project;

/// In-memory copy of the project file.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl Database {
    /// Load the store from a JSON file. A missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no project file yet, starting empty");
            return Ok(Database::default());
        }
        let buf = fs::read_to_string(path)?;
        let db: Database = serde_json::from_str(&buf)?;
        debug!(path = %path.display(), projects = db.projects.len(), "loaded project file");
        Ok(db)
    }

    /// Save the store to a JSON file using atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(self)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// Generate the next available project id.
    pub fn next_id(&self) -> u64 {
        self.projects.iter().filter_map(|p| p.id).max().unwrap_or(0) + 1
    }

    /// Get a project by id.
    pub fn get(&self, id: u64) -> Result<&Project> {
        self.projects
            .iter()
            .find(|p| p.id == Some(id))
            .ok_or_else(|| Error::project_not_found(id))
    }

    fn position(&self, id: u64) -> Result<usize> {
        self.projects
            .iter()
            .position(|p| p.id == Some(id))
            .ok_or_else(|| Error::project_not_found(id))
    }

    /// Resolve a project identifier (either id or name) to a project id.
    pub fn resolve(&self, identifier: &str) -> Result<u64> {
        if let Ok(id) = identifier.parse::<u64>() {
            return self.get(id).map(|_| id);
        }
        let wanted = identifier.to_lowercase();
        let matches: Vec<&Project> = self
            .projects
            .iter()
            .filter(|p| p.name.to_lowercase() == wanted)
            .collect();
        match matches.as_slice() {
            [] => Err(Error::project_not_found(identifier)),
            [only] => only.id.ok_or_else(|| Error::project_not_found(identifier)),
            many => Err(Error::AmbiguousName {
                what: "project",
                name: identifier.to_string(),
                candidates: many
                    .iter()
                    .map(|p| format!("#{}", p.id.unwrap_or_default()))
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    /// Validate and store a new project, returning its id.
    ///
    /// The project gets the next id, ids for every task that lacks one and
    /// today's date as `created_at`.
    pub fn create(&mut self, project: Project) -> Result<u64> {
        let mut project = project.validated()?;
        let id = self.next_id();
        project.id = Some(id);
        project.created_at = Some(Local::now().date_naive());
        info!(id, name = %project.name, tasks = project.task_count(), "created project");
        self.projects.push(project);
        Ok(id)
    }

    /// Replace a project wholesale, keeping its id and creation date.
    pub fn update(&mut self, id: u64, project: Project) -> Result<&Project> {
        let idx = self.position(id)?;
        let mut project = project.validated()?;
        project.id = Some(id);
        project.created_at = self.projects[idx].created_at;
        info!(id, name = %project.name, tasks = project.task_count(), "updated project");
        self.projects[idx] = project;
        Ok(&self.projects[idx])
    }

    /// Apply `change` to a copy of a project and store it if it still validates.
    pub fn edit<F>(&mut self, id: u64, change: F) -> Result<&Project>
    where
        F: FnOnce(&mut Project) -> Result<()>,
    {
        let mut staged = self.get(id)?.clone();
        change(&mut staged)?;
        self.update(id, staged)
    }

    /// Delete a project by id.
    pub fn delete(&mut self, id: u64) -> Result<Project> {
        let idx = self.position(id)?;
        let removed = self.projects.remove(idx);
        info!(id, name = %removed.name, "deleted project");
        Ok(removed)
    }
}

/// Parse human-readable date input.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "monday" / "next monday" and the short "mon" forms
/// - "end of week", "end of month"
/// - "in 3d", "in 2w", "in 1m"
/// - "YYYY-MM-DD" format
pub fn parse_date_input(s: &str) -> Result<NaiveDate> {
    parse_date_relative(s, Local::now().date_naive()).ok_or_else(|| Error::InvalidDate(s.to_string()))
}

/// Same as [`parse_date_input`] with an explicit "today".
pub fn parse_date_relative(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        "end of week" | "eow" => {
            let (_, end) = start_end_of_week(today);
            return Some(end);
        }
        "end of month" | "eom" => {
            let (year, month) = if today.month() == 12 {
                (today.year() + 1, 1)
            } else {
                (today.year(), today.month() + 1)
            };
            return NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt();
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        let rest = rest.trim();
        let unit = rest.chars().last()?;
        let count: i64 = rest[..rest.len() - unit.len_utf8()].trim().parse().ok()?;
        return match unit {
            'd' => today.checked_add_signed(Duration::try_days(count)?),
            'w' => today.checked_add_signed(Duration::try_weeks(count)?),
            // Approximate: 30 days per month
            'm' => today.checked_add_signed(Duration::try_days(count.checked_mul(30)?)?),
            _ => None,
        };
    }

    let weekdays = [
        ("monday", 0), ("tuesday", 1), ("wednesday", 2), ("thursday", 3),
        ("friday", 4), ("saturday", 5), ("sunday", 6),
        ("mon", 0), ("tue", 1), ("wed", 2), ("thu", 3),
        ("fri", 4), ("sat", 5), ("sun", 6),
    ];
    let current = today.weekday().num_days_from_monday() as i64;
    for (name, target) in weekdays {
        let ahead = (target + 7 - current) % 7;
        if s == name || s == format!("this {name}") {
            return Some(today + Duration::days(ahead));
        }
        if s == format!("next {name}") {
            let ahead = if ahead == 0 { 7 } else { ahead + 7 };
            return Some(today + Duration::days(ahead));
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Start and end of the ISO week (Monday to Sunday) containing `today`.
pub fn start_end_of_week(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let weekday = today.weekday().num_days_from_monday() as i64;
    let start = today - Duration::days(weekday);
    (start, start + Duration::days(6))
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, day).unwrap()
    }

    fn sample_project(name: &str) -> Project {
        let mut p = Project::new(name);
        p.tasks = vec![Task::new("Root", "Ann", d(1, 1), d(1, 31)).with_subtasks(vec![
            Task::new("A", "Ann", d(1, 1), d(1, 10)).with_progress(50.0),
            Task::new("B", "Bo", d(1, 5), d(1, 8)).with_progress(100.0),
        ])];
        p
    }

    #[test]
    fn test_create_assigns_ids_and_rolls_up() {
        let mut db = Database::default();
        let first = db.create(sample_project("One")).unwrap();
        let second = db.create(sample_project("Two")).unwrap();
        assert_eq!((first, second), (1, 2));

        let p = db.get(first).unwrap();
        assert!(p.created_at.is_some());
        assert_eq!(p.tasks[0].id, Some(1));
        assert_eq!(p.tasks[0].subtasks[1].id, Some(3));
        assert_eq!(p.tasks[0].subtasks[1].parent_id, Some(1));
        assert_eq!(p.tasks[0].progress, 75.0);
    }

    #[test]
    fn test_rejected_create_leaves_store_untouched() {
        let mut db = Database::default();
        let mut bad = sample_project("Bad");
        bad.tasks[0].subtasks[0].start_date = d(12, 1);
        bad.tasks[0].subtasks[0].end_date = d(12, 2);
        assert!(matches!(db.create(bad), Err(Error::DateRange { .. })));
        assert!(db.projects.is_empty());
        assert_eq!(db.next_id(), 1);
    }

    #[test]
    fn test_update_preserves_id_and_created_at() {
        let mut db = Database::default();
        let id = db.create(sample_project("One")).unwrap();
        db.projects[0].created_at = Some(d(1, 1));

        let mut replacement = sample_project("Renamed");
        replacement.created_at = Some(d(6, 6));
        replacement.id = Some(99);
        let updated = db.update(id, replacement).unwrap();
        assert_eq!(updated.id, Some(id));
        assert_eq!(updated.created_at, Some(d(1, 1)));
        assert_eq!(updated.name, "Renamed");

        assert!(matches!(db.update(42, sample_project("x")), Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_failed_edit_is_discarded() {
        let mut db = Database::default();
        let id = db.create(sample_project("One")).unwrap();
        let before = db.get(id).unwrap().clone();
        let result = db.edit(id, |p| {
            p.tasks[0].subtasks[0].progress = 250.0;
            Ok(())
        });
        assert!(matches!(result, Err(Error::ProgressRange { .. })));
        assert_eq!(db.get(id).unwrap(), &before);
    }

    #[test]
    fn test_delete_and_resolve() {
        let mut db = Database::default();
        let a = db.create(sample_project("Alpha")).unwrap();
        let b = db.create(sample_project("Beta")).unwrap();
        assert_eq!(db.resolve("beta").unwrap(), b);
        assert_eq!(db.resolve(&a.to_string()).unwrap(), a);

        db.create(sample_project("beta")).unwrap();
        assert!(matches!(db.resolve("Beta"), Err(Error::AmbiguousName { .. })));

        db.delete(a).unwrap();
        assert!(matches!(db.delete(a), Err(Error::NotFound { .. })));
        assert!(db.get(a).is_err());
        // Ids keep counting up from the highest remaining.
        assert_eq!(db.next_id(), 4);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("projects.json");
        assert!(Database::load(&path).unwrap().projects.is_empty());

        let mut db = Database::default();
        db.create(sample_project("One")).unwrap();
        db.save(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"start_date\": \"2025-01-01\""));
        assert!(text.contains("\"is_subtask\": true"));

        let loaded = Database::load(&path).unwrap();
        assert_eq!(loaded.projects, db.projects);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Database::load(&path), Err(Error::Json(_))));
    }

    #[test]
    fn test_parse_date_relative() {
        let wed = d(1, 15);
        assert_eq!(parse_date_relative("today", wed), Some(wed));
        assert_eq!(parse_date_relative("Tomorrow", wed), Some(d(1, 16)));
        assert_eq!(parse_date_relative("in 3d", wed), Some(d(1, 18)));
        assert_eq!(parse_date_relative("in 2w", wed), Some(d(1, 29)));
        assert_eq!(parse_date_relative("friday", wed), Some(d(1, 17)));
        assert_eq!(parse_date_relative("next wed", wed), Some(d(1, 22)));
        assert_eq!(parse_date_relative("eow", wed), Some(d(1, 19)));
        assert_eq!(parse_date_relative("eom", wed), Some(d(1, 31)));
        assert_eq!(parse_date_relative("eom", NaiveDate::from_ymd_opt(2024, 12, 3).unwrap()), Some(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()));
        assert_eq!(parse_date_relative("2025-03-01", wed), Some(d(3, 1)));
        assert_eq!(parse_date_relative("someday", wed), None);
        assert!(matches!(parse_date_input("01/03/2025"), Err(Error::InvalidDate(_))));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long task name", 6), "a lon…");
    }
}
