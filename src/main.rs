//! # wbs - Work-Breakdown-Structure planner
//!
//! A command-line front end for the `wbs_planner` engine: hierarchical tasks
//! numbered `1.0`, `1.1`, `1.1.1`..., finish-to-start dependencies whose date
//! changes cascade through dependent tasks, and a workload analyzer that
//! flags orphaned, unassigned, blocked and overallocated work.
//!
//! ## Quick Start
//!
//! ```bash
//! # Create a project
//! wbs new "Cabin" --start 2025-03-01 --end 2025-06-30 --workers "Alex, Sam"
//!
//! # Print the generation request, then import the generator's reply
//! wbs prompt > request.txt
//! wbs import reply.json
//!
//! # Or build the tree by hand
//! wbs add "Design" --duration 10
//! wbs add "Survey" --parent 1.0 --duration 3 --assign Sam
//! wbs deps "Survey" --on "Design+2"
//!
//! # Review
//! wbs list --all
//! wbs analyze
//! wbs calendar
//! ```
//!
//! Data is stored in `~/.wbs/` (or `$WBS_HOME`, or `--dir`) with each project
//! as a separate JSON file. Set `RUST_LOG=wbs_planner=debug` or pass `-v` to
//! see renumbering and cascade decisions on stderr.

use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wbs_planner::config::{default_data_dir, Config};
use wbs_planner::db::FileStore;

pub mod cli;
pub mod cmd;

use cli::Cli;
use cmd::*;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("wbs_planner=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wbs_planner=warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let data_dir = cli.dir.clone().unwrap_or_else(default_data_dir);
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        eprintln!("Failed to create data directory {}: {}", data_dir.display(), e);
        std::process::exit(1);
    }
    let config = match Config::load(&data_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to read config in {}: {}", data_dir.display(), e);
            std::process::exit(1);
        }
    };
    let store = FileStore::new(&data_dir);

    let open = || {
        let id = select_project(&store, cli.project.as_deref());
        let plan = load_plan(&store, &id);
        (id, plan)
    };

    match cli.command {
        Commands::New {
            name, start, end, workers, desc, project_type, complexity, deliverables, constraints,
        } => cmd_new(&store, name, start, end, workers, desc, project_type, complexity, deliverables, constraints),

        Commands::Projects => cmd_projects(&store),

        Commands::Completions { shell } => cmd_completions(shell),

        Commands::Import { input, force, no_backup } => {
            let (id, plan) = open();
            cmd_import(&store, &id, plan, input, force, no_backup)
        }

        Commands::Prompt { question, answer } => cmd_prompt(&open().1, question, answer),

        Commands::List { all, limit } => cmd_list(&open().1, all, limit),

        Commands::Show { task } => cmd_show(&open().1, &task),

        Commands::Add { name, parent, duration, start, assign, status, notes } =>
            cmd_add(&store, &config, open().1, name, parent, duration, start, assign, status, notes),

        Commands::Delete { task, cascade } => cmd_delete(&store, open().1, &task, cascade),

        Commands::Promote { task } => cmd_promote(&store, open().1, &task),

        Commands::Demote { task } => cmd_demote(&store, open().1, &task),

        Commands::Move { task, to } => cmd_move(&store, open().1, &task, &to),

        Commands::Edit { task, name, start, end, assign, status, notes } =>
            cmd_edit(&store, open().1, &task, name, start, end, assign, status, notes),

        Commands::Deps { task, on, clear, candidates } =>
            cmd_deps(&store, open().1, &task, on, clear, candidates),

        Commands::Expand { task, all } => cmd_toggle(&store, open().1, task, all, true),

        Commands::Collapse { task, all } => cmd_toggle(&store, open().1, task, all, false),

        Commands::Analyze { json } => cmd_analyze(&open().1, &config, json),

        Commands::Calendar { days } => cmd_calendar(&open().1, &config, days),

        Commands::Check => cmd_check(&open().1),

        Commands::Settings { name, start, end, workers, desc } =>
            cmd_settings(&store, open().1, name, start, end, workers, desc),

        Commands::Backup => cmd_backup(&store, &open().0),
    }
}
