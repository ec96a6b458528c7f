//! # gantt - Hierarchical project timelines
//!
//! A command-line tool for tracking project tasks with nested subtasks and
//! drawing them as a Gantt chart in the terminal.
//!
//! ## Key Features
//!
//! - **Task Trees**: Tasks own their subtasks; a subtask's dates must sit inside its parent's
//! - **Progress Roll-up**: A parent's progress is always the mean of its subtasks'
//! - **Validation on Every Write**: Bad dates or progress reject the whole change, nothing is half-saved
//! - **Timeline Layout**: Rows ordered latest-start first, colored by responsible party
//! - **Terminal Chart**: Scrollable Gantt view with progress overlays and a legend
//! - **Draw Plan Export**: The layout as JSON for any other renderer
//!
//! ## Quick Start
//!
//! ```bash
//! # Create a project
//! gantt create --name "Sand Printer"
//!
//! # Add a task and a subtask
//! gantt add-task "Sand Printer" "Structure Design" --responsible Lalanthika \
//!     --start 2024-11-01 --end 2024-12-30
//! gantt add-task "Sand Printer" "Design Drawings" --responsible Lalanthika \
//!     --start 2024-12-15 --end 2024-12-30 --parent "Structure Design"
//!
//! # Record progress and look at the chart
//! gantt progress "Sand Printer" "Design Drawings" 40
//! gantt chart "Sand Printer"
//! ```
//!
//! Data is stored in `~/.gantt/projects.json` unless `--db` or `$GANTT_DB` says otherwise.

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

pub mod aggregate;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod db;
pub mod error;
pub mod flatten;
pub mod layout;
pub mod palette;
pub mod project;
pub mod task;
pub mod tree;
pub mod validate;
pub mod tui {
    pub mod chart;
    pub mod colors;
    pub mod run;
}

use cli::Cli;
use cmd::*;
use config::Config;
use db::*;
use task::Task;

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let config = Config::from_env(cli.db.clone(), cli.verbose);
    init_tracing(&config);

    if let Err(e) = run(cli.command, &config) {
        error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Commands, config: &Config) -> error::Result<()> {
    // Commands that never touch the store.
    match &command {
        Commands::Completions { shell } => {
            cmd_completions(*shell);
            return Ok(());
        }
        Commands::Validate { file, json } => return cmd_validate(file, *json),
        _ => {}
    }

    let db_path = config.db_path.as_path();
    debug!(db = %db_path.display(), dir = %config.data_dir().display(), "using project file");
    let mut db = Database::load(db_path)?;

    match command {
        Commands::List => cmd_list(&db),
        Commands::View { project } => cmd_view(&db, &project),
        Commands::Create { file, name, desc } => cmd_create(&mut db, db_path, file, name, desc),
        Commands::Update { project, file } => cmd_update(&mut db, db_path, &project, &file),
        Commands::Delete { project } => cmd_delete(&mut db, db_path, &project),
        Commands::AddTask {
            project, name, responsible, start, end, progress, parent, depends_on,
        } => {
            let task = Task::new(name, responsible, parse_date_input(&start)?, parse_date_input(&end)?)
                .with_progress(progress);
            cmd_add_task(&mut db, db_path, &project, NewTask { task, parent, depends_on })
        }
        Commands::Progress { project, task, value } => {
            cmd_progress(&mut db, db_path, &project, &task, value)
        }
        Commands::Plan { project, output } => cmd_plan(&db, &project, output),
        Commands::Chart { project } => cmd_chart(&db, &project),
        Commands::Completions { .. } | Commands::Validate { .. } => {
            unreachable!("handled before the store is loaded")
        }
    }
}
