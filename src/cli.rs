use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// File-backed project timeline CLI.
/// Storage defaults to ~/.gantt/projects.json, $GANTT_DB, or a path passed via --db.
#[derive(Parser)]
#[command(name = "gantt", version, about = "Hierarchical project tasks on a Gantt timeline")]
pub struct Cli {
    /// Path to the JSON project file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}
