//! Command implementations for the CLI interface.
//!
//! Each handler loads what it needs from the store, runs the pipeline through
//! the store's create/update/edit calls and saves only when those succeed.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use clap_complete::{generate, Shell};
use tracing::{debug, info};

use crate::db::*;
use crate::error::{Error, Result};
use crate::project::Project;
use crate::task::Task;
use crate::tree::{self, ParentIndex};
use crate::tui::run::run_chart;

#[derive(Subcommand)]
pub enum Commands {
    /// List stored projects.
    List,

    /// Show a project and its task tree.
    View {
        /// Project ID or name.
        project: String,
    },

    /// Create a project from a JSON record, or an empty one by name.
    Create {
        /// Project record (JSON). Omit to create an empty project.
        file: Option<PathBuf>,
        /// Project name. Overrides the name in the record.
        #[arg(long, required_unless_present = "file")]
        name: Option<String>,
        /// Optional description.
        #[arg(long)]
        desc: Option<String>,
    },

    /// Replace a project with a JSON record, keeping its id and creation date.
    Update {
        /// Project ID or name.
        project: String,
        /// Project record (JSON).
        file: PathBuf,
    },

    /// Delete a project and all of its tasks.
    Delete {
        /// Project ID or name.
        project: String,
    },

    /// Add a task to a project, at the top level or under a parent task.
    AddTask {
        /// Project ID or name.
        project: String,
        /// Task name.
        name: String,
        /// Responsible party.
        #[arg(long)]
        responsible: String,
        /// Start date: YYYY-MM-DD, "today", "tomorrow", "in Nd", a weekday.
        #[arg(long)]
        start: String,
        /// End date, same forms as --start.
        #[arg(long)]
        end: String,
        /// Progress percentage (0-100).
        #[arg(long, default_value_t = 0.0)]
        progress: f64,
        /// Parent task ID or name.
        #[arg(long)]
        parent: Option<String>,
        /// Task this one depends on (ID or name). May be repeated.
        #[arg(long = "depends-on")]
        depends_on: Vec<String>,
    },

    /// Set the progress of a leaf task; parent progress is recomputed.
    Progress {
        /// Project ID or name.
        project: String,
        /// Task ID or name.
        task: String,
        /// Progress percentage (0-100).
        value: f64,
    },

    /// Check a JSON project record without storing it.
    Validate {
        /// Project record (JSON).
        file: PathBuf,
        /// Print the validated record as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Write a project's timeline draw plan as JSON.
    Plan {
        /// Project ID or name.
        project: String,
        /// Output file path (default: stdout).
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show a project's Gantt chart in the terminal.
    Chart {
        /// Project ID or name.
        project: String,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Read a project record from a JSON file.
pub fn read_project_file(path: &Path) -> Result<Project> {
    let text = fs::read_to_string(path)?;
    let project = serde_json::from_str(&text)?;
    debug!(path = %path.display(), "read project record");
    Ok(project)
}

/// List all projects in a table.
pub fn cmd_list(db: &Database) -> Result<()> {
    println!(
        "{:<5} {:<24} {:>6} {:<11} {:<23} {:>8}",
        "ID", "Name", "Tasks", "Created", "Span", "Progress"
    );
    for p in &db.projects {
        let created = p.created_at.map(|d| d.to_string()).unwrap_or_else(|| "-".into());
        let span = p
            .span()
            .map(|(s, e)| format!("{s}..{e}"))
            .unwrap_or_else(|| "-".into());
        let progress = p
            .overall_progress()
            .map(|v| format!("{v:.1}%"))
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<5} {:<24} {:>6} {:<11} {:<23} {:>8}",
            p.id.unwrap_or_default(),
            truncate(&p.name, 24),
            p.task_count(),
            created,
            span,
            progress
        );
    }
    Ok(())
}

/// View a project's details and its indented task tree.
pub fn cmd_view(db: &Database, project: &str) -> Result<()> {
    let p = db.get(db.resolve(project)?)?;
    println!("ID:           {}", p.id.unwrap_or_default());
    println!("Name:         {}", p.name);
    println!("Description:  {}", p.description.as_deref().unwrap_or("-"));
    println!("Created:      {}", p.created_at.map(|d| d.to_string()).unwrap_or_else(|| "-".into()));
    println!("Tasks:        {}", p.task_count());
    println!(
        "Progress:     {}",
        p.overall_progress().map(|v| format!("{v:.1}%")).unwrap_or_else(|| "-".into())
    );
    println!("Task tree:");
    if p.tasks.is_empty() {
        println!("  -");
    }
    print_tree(&p.tasks, 1);
    Ok(())
}

/// Print tasks depth-first, two spaces of indent per level.
pub fn print_tree(tasks: &[Task], depth: usize) {
    for t in tasks {
        let deps = if t.dependencies.is_empty() {
            String::new()
        } else {
            let ids: Vec<String> = t.dependencies.iter().map(|d| format!("#{d}")).collect();
            format!(" after {}", ids.join(","))
        };
        println!(
            "{}- {} [{}] {}..{} {:.1}%{}",
            "  ".repeat(depth),
            t.display_name(),
            t.responsible,
            t.start_date,
            t.end_date,
            t.progress,
            deps
        );
        print_tree(&t.subtasks, depth + 1);
    }
}

/// Create a project from a record file or from flags alone.
pub fn cmd_create(
    db: &mut Database,
    db_path: &Path,
    file: Option<PathBuf>,
    name: Option<String>,
    desc: Option<String>,
) -> Result<()> {
    let mut project = match file {
        Some(path) => read_project_file(&path)?,
        None => Project::new(String::new()),
    };
    if let Some(name) = name {
        project.name = name;
    }
    if desc.is_some() {
        project.description = desc;
    }
    let id = db.create(project)?;
    db.save(db_path)?;
    println!("Created project {}", id);
    Ok(())
}

/// Replace a project wholesale from a record file.
pub fn cmd_update(db: &mut Database, db_path: &Path, project: &str, file: &Path) -> Result<()> {
    let id = db.resolve(project)?;
    let record = read_project_file(file)?;
    db.update(id, record)?;
    db.save(db_path)?;
    println!("Updated project {}", id);
    Ok(())
}

/// Delete a project.
pub fn cmd_delete(db: &mut Database, db_path: &Path, project: &str) -> Result<()> {
    let id = db.resolve(project)?;
    let removed = db.delete(id)?;
    db.save(db_path)?;
    println!("Deleted project {} ({})", id, removed.name);
    Ok(())
}

/// A task to insert, with its placement still given as identifiers.
pub struct NewTask {
    pub task: Task,
    pub parent: Option<String>,
    pub depends_on: Vec<String>,
}

/// Insert a task into a project's tree. The caller validates the result.
pub fn insert_task(project: &mut Project, new: NewTask) -> Result<u64> {
    let NewTask { mut task, parent, depends_on } = new;
    task.dependencies = depends_on
        .iter()
        .map(|d| tree::resolve_task(&project.tasks, d))
        .collect::<Result<_>>()?;

    let id = tree::max_id(&project.tasks).unwrap_or(0) + 1;
    task.id = Some(id);

    match parent {
        Some(parent) => {
            let parent_id = tree::resolve_task(&project.tasks, &parent)?;
            let parent = tree::find_mut(&mut project.tasks, parent_id)
                .ok_or_else(|| Error::task_not_found(parent_id))?;
            task.parent_id = Some(parent_id);
            parent.subtasks.push(task);
        }
        None => project.tasks.push(task),
    }
    Ok(id)
}

/// Add a task to a stored project.
pub fn cmd_add_task(db: &mut Database, db_path: &Path, project: &str, new: NewTask) -> Result<()> {
    let id = db.resolve(project)?;
    let mut task_id = 0;
    db.edit(id, |p| {
        task_id = insert_task(p, new)?;
        Ok(())
    })?;
    db.save(db_path)?;
    let stored = db.get(id)?;
    let index = ParentIndex::build(&stored.tasks);
    match index.parent_of(task_id) {
        Some(parent) => println!("Added task {} under task {} in project {}", task_id, parent, id),
        None => println!("Added task {} to project {}", task_id, id),
    }
    Ok(())
}

/// Set a leaf task's progress in place. Validation happens afterwards.
pub fn set_progress(project: &mut Project, task: &str, value: f64) -> Result<u64> {
    let task_id = tree::resolve_task(&project.tasks, task)?;
    let task = tree::find_mut(&mut project.tasks, task_id)
        .ok_or_else(|| Error::task_not_found(task_id))?;
    if !task.is_leaf() {
        return Err(Error::DerivedProgress(task.name.clone()));
    }
    task.progress = value;
    Ok(task_id)
}

/// Update a leaf's progress and report the recomputed ancestors.
pub fn cmd_progress(
    db: &mut Database,
    db_path: &Path,
    project: &str,
    task: &str,
    value: f64,
) -> Result<()> {
    let id = db.resolve(project)?;
    let mut task_id = 0;
    db.edit(id, |p| {
        task_id = set_progress(p, task, value)?;
        Ok(())
    })?;
    db.save(db_path)?;

    let stored = db.get(id)?;
    println!("Task {} progress set to {:.1}%", task_id, value);
    let index = ParentIndex::build(&stored.tasks);
    for ancestor in index.ancestors(task_id) {
        if let Some(t) = tree::find(&stored.tasks, ancestor) {
            println!("  {} now {:.1}%", t.display_name(), t.progress);
        }
    }
    Ok(())
}

/// Run the pipeline over a record file without touching the store.
pub fn cmd_validate(file: &Path, json: bool) -> Result<()> {
    let project = read_project_file(file)?.validated()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&project)?);
    } else {
        println!("Project '{}' is valid ({} tasks)", project.name, project.task_count());
        print_tree(&project.tasks, 1);
    }
    Ok(())
}

/// Export the draw plan as JSON.
pub fn cmd_plan(db: &Database, project: &str, output: Option<PathBuf>) -> Result<()> {
    let p = db.get(db.resolve(project)?)?;
    let plan = p.draw_plan()?;
    let data = serde_json::to_string_pretty(&plan)?;
    match output {
        Some(path) => {
            fs::write(&path, data)?;
            info!(path = %path.display(), rows = plan.rows.len(), "wrote draw plan");
            println!("Wrote draw plan for project {} to {}", p.id.unwrap_or_default(), path.display());
        }
        None => println!("{data}"),
    }
    Ok(())
}

/// Launch the terminal chart for a project.
pub fn cmd_chart(db: &Database, project: &str) -> Result<()> {
    let p = db.get(db.resolve(project)?)?;
    let plan = p.draw_plan()?;
    run_chart(&plan, &p.name)?;
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, day).unwrap()
    }

    fn stored() -> (Database, u64) {
        let mut p = Project::new("Printer");
        p.tasks = vec![Task::new("Build", "Jalath", d(2, 1), d(3, 31)).with_subtasks(vec![
            Task::new("Assembly", "Jalath", d(2, 20), d(3, 5)).with_progress(40.0),
            Task::new("Pilot print", "Jalath", d(3, 10), d(3, 12)),
        ])];
        let mut db = Database::default();
        let id = db.create(p).unwrap();
        (db, id)
    }

    fn new_task(name: &str, start: NaiveDate, end: NaiveDate, parent: Option<&str>) -> NewTask {
        NewTask {
            task: Task::new(name, "Rohit", start, end).with_progress(100.0),
            parent: parent.map(str::to_string),
            depends_on: Vec::new(),
        }
    }

    #[test]
    fn test_add_subtask_recomputes_parent() {
        let (mut db, id) = stored();
        let mut added = 0;
        let p = db
            .edit(id, |p| {
                added = insert_task(p, new_task("Wiring", d(2, 2), d(2, 10), Some("build")))?;
                Ok(())
            })
            .unwrap();
        assert_eq!(added, 4);
        let build = &p.tasks[0];
        assert_eq!(build.subtasks.len(), 3);
        assert_eq!(build.subtasks[2].parent_id, Some(1));
        // (40 + 0 + 100) / 3
        assert!((build.progress - 140.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_add_subtask_outside_parent_is_rejected() {
        let (mut db, id) = stored();
        let before = db.get(id).unwrap().clone();
        let err = db
            .edit(id, |p| insert_task(p, new_task("Late", d(3, 20), d(4, 2), Some("1"))).map(|_| ()))
            .unwrap_err();
        assert!(matches!(err, Error::DateRange { task, .. } if task == "Late"));
        assert_eq!(db.get(id).unwrap(), &before);
    }

    #[test]
    fn test_add_task_resolves_dependencies() {
        let (mut db, id) = stored();
        let mut new = new_task("Ship", d(4, 1), d(4, 2), None);
        new.depends_on = vec!["pilot print".into()];
        db.edit(id, |p| insert_task(p, new).map(|_| ())).unwrap();
        let p = db.get(id).unwrap();
        assert_eq!(p.tasks[1].dependencies, vec![3]);
        assert!(!p.tasks[1].is_subtask());

        let mut missing = new_task("Party", d(4, 3), d(4, 3), None);
        missing.depends_on = vec!["nothing".into()];
        assert!(matches!(
            db.edit(id, |p| insert_task(p, missing).map(|_| ())),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_set_progress_on_leaf_only() {
        let (mut db, id) = stored();
        let p = db
            .edit(id, |p| set_progress(p, "pilot print", 60.0).map(|_| ()))
            .unwrap();
        assert_eq!(p.tasks[0].progress, 50.0);

        assert!(matches!(
            db.edit(id, |p| set_progress(p, "Build", 10.0).map(|_| ())),
            Err(Error::DerivedProgress(name)) if name == "Build"
        ));
        assert!(matches!(
            db.edit(id, |p| set_progress(p, "Assembly", -1.0).map(|_| ())),
            Err(Error::ProgressRange { .. })
        ));
    }

    #[test]
    fn test_progress_reports_save_failure() {
        let (mut db, id) = stored();
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let err = cmd_progress(&mut db, &blocker.join("projects.json"), "1", "Assembly", 80.0);
        assert!(matches!(err, Err(Error::Io(_))));

        let db_path = dir.path().join("projects.json");
        cmd_progress(&mut db, &db_path, "1", "Assembly", 90.0).unwrap();
        let loaded = Database::load(&db_path).unwrap();
        assert_eq!(loaded.projects[0].tasks[0].progress, 45.0);
    }

    #[test]
    fn test_create_and_validate_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let record = dir.path().join("printer.json");
        fs::write(
            &record,
            r#"{"name": "Printer", "tasks": [
                {"Task": "Design", "Responsibility": "Lalanthika",
                 "Start_date": "2024-11-01", "End_Date": "2024-12-15",
                 "subtasks": [{"name": "Drawings", "responsible": "Lalanthika",
                               "start_date": "2024-12-01", "end_date": "2024-12-15",
                               "progress": 30}]}
            ]}"#,
        )
        .unwrap();

        cmd_validate(&record, false).unwrap();

        let db_path = dir.path().join("projects.json");
        let mut db = Database::default();
        cmd_create(&mut db, &db_path, Some(record), None, Some("desc".into())).unwrap();
        let loaded = Database::load(&db_path).unwrap();
        let p = &loaded.projects[0];
        assert_eq!(p.name, "Printer");
        assert_eq!(p.description.as_deref(), Some("desc"));
        assert_eq!(p.tasks[0].progress, 30.0);
        assert_eq!(p.tasks[0].subtasks[0].id, Some(2));
    }

    #[test]
    fn test_plan_written_to_file() {
        let (db, id) = stored();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("plan.json");
        cmd_plan(&db, &id.to_string(), Some(out.clone())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(value["rows"].as_array().unwrap().len(), 3);
        assert_eq!(value["axis_bounds"]["min"], "2025-01-31");
        assert_eq!(value["legend"][0]["label"], "Jalath");
    }
}
