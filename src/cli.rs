use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Work-breakdown-structure planner.
/// Projects are stored as JSON files in ~/.wbs, or the directory given by --dir.
#[derive(Parser)]
#[command(name = "wbs", version, about = "Plan hierarchical, dependency-linked project tasks")]
pub struct Cli {
    /// Data directory holding one JSON file per project.
    #[arg(long, global = true, env = "WBS_HOME")]
    pub dir: Option<PathBuf>,

    /// Project name or id. Defaults to the most recently saved project.
    #[arg(long, short, global = true)]
    pub project: Option<String>,

    /// Log engine decisions to stderr.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
