//! Command implementations for the CLI interface.
//!
//! Each handler loads the selected project, runs one engine operation and
//! saves the result. Rejections are printed to stderr with exit status 1, and
//! the stored project is only rewritten after an operation succeeds.

use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use clap_complete::{generate, Shell};

use wbs_planner::cascade::dependents_of;
use wbs_planner::config::Config;
use wbs_planner::dates::{format_date, format_short_date, parse_date_input};
use wbs_planner::db::{save_plan, FileStore, ProjectRecord, ProjectStore};
use wbs_planner::edit::FieldEdit;
use wbs_planner::fields::*;
use wbs_planner::generate::{ask_about, assistant_prompt, generate_plan, generation_prompt, SavedResponse};
use wbs_planner::plan::Plan;
use wbs_planner::project::{sanitize_project_name, Project, ProjectSettings};
use wbs_planner::task::{Dependency, NewTask, Task, TaskId};
use wbs_planner::validate::{parse_assignees, validate_tasks};
use wbs_planner::workload::{analyze_with_threshold, workload_calendar, Load};

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new, empty project.
    New {
        /// Project display name.
        name: String,
        /// First day: YYYY-MM-DD, "today", "next monday" or "in 2w".
        #[arg(long)]
        start: String,
        /// Last day of the project.
        #[arg(long)]
        end: String,
        /// Comma-separated team roster.
        #[arg(long, default_value = "")]
        workers: String,
        #[arg(long, default_value = "")]
        desc: String,
        /// Project type, e.g. "Construction".
        #[arg(long = "type")]
        project_type: Option<String>,
        #[arg(long)]
        complexity: Option<String>,
        #[arg(long)]
        deliverables: Option<String>,
        #[arg(long)]
        constraints: Option<String>,
    },

    /// List stored projects.
    Projects,

    /// Replace the project's tasks with a saved plan-generator reply.
    Import {
        /// File holding the reply: plan JSON, optionally fenced or wrapped.
        input: PathBuf,
        /// Replace tasks the project already has.
        #[arg(long)]
        force: bool,
        /// Skip the backup taken before replacing tasks.
        #[arg(long)]
        no_backup: bool,
    },

    /// Print the plan-generation request, or an assistant question, for the project.
    Prompt {
        #[arg(long)]
        question: Option<String>,
        /// Saved assistant reply to print as the answer to --question.
        #[arg(long, requires = "question")]
        answer: Option<PathBuf>,
    },

    /// Show the task tree.
    List {
        /// Include children of collapsed tasks.
        #[arg(long)]
        all: bool,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// View a single task by id, WBS code or name.
    Show {
        task: String,
    },

    /// Add a task.
    Add {
        name: String,
        /// Parent task id, WBS code or name.
        #[arg(long)]
        parent: Option<String>,
        /// Duration in days. Defaults to the configured default.
        #[arg(long)]
        duration: Option<u32>,
        /// Start date. Defaults to the project start.
        #[arg(long)]
        start: Option<String>,
        /// Comma-separated assignees.
        #[arg(long, default_value = "")]
        assign: String,
        #[arg(long, value_enum, default_value_t = Status::NotStarted)]
        status: Status,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a task.
    Delete {
        task: String,
        /// Also delete the task's descendants.
        #[arg(long)]
        cascade: bool,
    },

    /// Move a task up one level, directly after its former parent.
    Promote {
        task: String,
    },

    /// Move a task under the sibling directly above it.
    Demote {
        task: String,
    },

    /// Move a task into a sibling's position.
    Move {
        task: String,
        /// Sibling whose position the task takes.
        #[arg(long)]
        to: String,
    },

    /// Edit task fields. Date changes reschedule dependent tasks.
    Edit {
        task: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        /// Comma-separated assignees. Replaces the current list.
        #[arg(long)]
        assign: Option<String>,
        #[arg(long, value_enum)]
        status: Option<Status>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Show or replace a task's finish-to-start dependencies.
    Deps {
        task: String,
        /// Predecessor as TASK or TASK+LAG. May be repeated.
        #[arg(long = "on")]
        on: Vec<String>,
        /// Remove all dependencies.
        #[arg(long, conflicts_with = "on")]
        clear: bool,
        /// List the tasks this task may depend on.
        #[arg(long)]
        candidates: bool,
    },

    /// Show a task's children in the tree.
    Expand {
        task: Option<String>,
        #[arg(long, conflicts_with = "task")]
        all: bool,
    },

    /// Hide a task's children in the tree.
    Collapse {
        task: Option<String>,
        #[arg(long, conflicts_with = "task")]
        all: bool,
    },

    /// Report orphaned, unassigned, overallocated and blocked work.
    Analyze {
        /// Print findings as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Per-worker daily load from the project start.
    Calendar {
        /// Number of days. Defaults to the configured calendar length.
        #[arg(long)]
        days: Option<usize>,
    },

    /// Check the tasks for structural and scheduling problems.
    Check,

    /// Change project settings.
    Settings {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        /// Comma-separated team roster.
        #[arg(long)]
        workers: Option<String>,
        #[arg(long)]
        desc: Option<String>,
    },

    /// Create a timestamped backup of the project.
    Backup,

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn die(msg: String) -> ! {
    eprintln!("{msg}");
    std::process::exit(1);
}

/// Project id named by `--project`, else the most recently saved project.
pub fn select_project(store: &FileStore, project: Option<&str>) -> String {
    if let Some(name) = project {
        return sanitize_project_name(name);
    }
    match store.most_recent() {
        Ok(Some(id)) => id,
        Ok(None) => die(format!(
            "No projects in {}. Create one with `wbs new`.",
            store.dir().display()
        )),
        Err(e) => die(format!("Failed to read projects: {e}")),
    }
}

pub fn load_plan(store: &FileStore, project_id: &str) -> Plan {
    let record = match store.load(project_id) {
        Ok(Some(record)) => record,
        Ok(None) => die(format!("No project '{}' in {}.", project_id, store.dir().display())),
        Err(e) => die(format!("Failed to load project '{project_id}': {e}")),
    };
    match record.into_plan() {
        Ok(plan) => plan,
        Err(e) => die(format!("Project '{project_id}' is inconsistent: {e}")),
    }
}

fn persist(store: &FileStore, plan: &Plan) {
    if let Err(e) = save_plan(store, plan) {
        die(format!("Failed to save project: {e}"));
    }
}

fn resolve(plan: &Plan, identifier: &str) -> TaskId {
    plan.resolve(identifier)
        .unwrap_or_else(|e| die(format!("Error resolving task: {e}")))
}

fn parse_date_arg(s: &str) -> NaiveDate {
    parse_date_input(s).unwrap_or_else(|| {
        die(format!(
            "Could not parse date '{s}'. Use YYYY-MM-DD, \"today\", \"next friday\" or \"in 3d\"."
        ))
    })
}

/// Split `TASK+LAG` into the task reference and the lag in days.
fn split_lag(arg: &str) -> Result<(&str, u32), String> {
    match arg.rsplit_once('+') {
        Some((task, lag)) if !lag.trim().is_empty() && lag.trim().chars().all(|c| c.is_ascii_digit()) => lag
            .trim()
            .parse()
            .map(|lag| (task.trim(), lag))
            .map_err(|e| format!("Invalid lag in '{arg}': {e}")),
        _ => Ok((arg.trim(), 0)),
    }
}

fn label(task: &Task) -> String {
    format!("{} {}", task.wbs, task.name)
}

fn label_of(plan: &Plan, id: &TaskId) -> String {
    plan.get(id).map(label).unwrap_or_else(|| id.to_string())
}

/// Tasks in tree order with their depth. Children of collapsed tasks are
/// skipped unless `all` is set.
fn tree_rows(plan: &Plan, all: bool) -> Vec<(&Task, usize)> {
    let mut rows = Vec::new();
    let mut stack: Vec<(&Task, usize)> = plan.children(None).into_iter().rev().map(|t| (t, 0)).collect();
    while let Some((task, depth)) = stack.pop() {
        rows.push((task, depth));
        if all || plan.is_expanded(&task.id) {
            stack.extend(plan.children(Some(&task.id)).into_iter().rev().map(|t| (t, depth + 1)));
        }
    }
    rows
}

/// Print tasks in a formatted table with tree indentation.
///
/// `+` marks a collapsed parent and `-` an expanded one.
pub fn print_table(plan: &Plan, rows: &[(&Task, usize)]) {
    println!(
        "{:<9} {:<12} {:<7} {:<7} {:>4}  {:<16} {}",
        "WBS", "Status", "Start", "End", "Days", "Assigned", "Name"
    );
    for (t, depth) in rows {
        let marker = if !plan.has_children(&t.id) {
            ' '
        } else if plan.is_expanded(&t.id) {
            '-'
        } else {
            '+'
        };
        let assigned = if t.assigned_to.is_empty() {
            "-".to_string()
        } else {
            t.assigned_to.join(",")
        };
        println!(
            "{:<9} {:<12} {:<7} {:<7} {:>4}  {:<16} {}{} {}",
            t.wbs,
            format_status(t.status),
            format_short_date(t.start_date),
            format_short_date(t.end_date),
            t.duration,
            truncate(&assigned, 16),
            "  ".repeat(*depth),
            marker,
            t.name
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_new(
    store: &FileStore,
    name: String,
    start: String,
    end: String,
    workers: String,
    desc: String,
    project_type: Option<String>,
    complexity: Option<String>,
    deliverables: Option<String>,
    constraints: Option<String>,
) {
    let start_date = parse_date_arg(&start);
    let end_date = parse_date_arg(&end);

    let mut brief = Project::new(name.clone(), start_date, end_date);
    brief.project_type = project_type;
    brief.complexity = complexity;
    brief.deliverables = deliverables;
    brief.constraints = constraints;
    let project = match brief.update_settings(ProjectSettings {
        name,
        start_date,
        end_date,
        workers,
        description: desc,
    }) {
        Ok(project) => project,
        Err(e) => die(format!("Invalid project: {e}")),
    };

    let id = project.id();
    if id.is_empty() {
        die("Project name must contain at least one letter or digit.".to_string());
    }
    let plan = match Plan::new(project, Vec::new()) {
        Ok(plan) => plan,
        Err(e) => die(format!("Invalid project: {e}")),
    };
    if let Err(e) = Config::init(store.dir()) {
        die(format!("Failed to write config: {e}"));
    }
    if let Err(e) = store.create(&id, &ProjectRecord::from_plan(&plan, Utc::now())) {
        die(format!("Failed to create project: {e}"));
    }
    println!(
        "Created project '{}' ({}), {} to {}.",
        plan.project.name,
        id,
        format_date(start_date),
        format_date(end_date)
    );
}

pub fn cmd_projects(store: &FileStore) {
    let ids = match store.list() {
        Ok(ids) => ids,
        Err(e) => die(format!("Failed to read projects: {e}")),
    };
    if ids.is_empty() {
        println!("No projects in {}.", store.dir().display());
        return;
    }
    let recent = store.most_recent().ok().flatten();
    println!("  {:<24} {:<28} {:>5}  {}", "ID", "Name", "Tasks", "Window");
    for id in ids {
        match store.load(&id) {
            Ok(Some(record)) => println!(
                "{} {:<24} {:<28} {:>5}  {} - {}",
                if recent.as_deref() == Some(id.as_str()) { '*' } else { ' ' },
                truncate(&id, 24),
                truncate(&record.metadata.name, 28),
                record.tasks.len(),
                format_date(record.metadata.start_date),
                format_date(record.metadata.end_date)
            ),
            Ok(None) => {}
            Err(e) => eprintln!("Skipping {id}: {e}"),
        }
    }
}

pub fn cmd_import(store: &FileStore, project_id: &str, plan: Plan, input: PathBuf, force: bool, no_backup: bool) {
    if !plan.tasks.is_empty() && !force {
        die(format!(
            "Project '{}' already has {} task(s). Use --force to replace them.",
            project_id,
            plan.tasks.len()
        ));
    }
    let generated = match generate_plan(&SavedResponse { path: input }, &plan.project) {
        Ok(generated) => generated,
        Err(e) => die(format!("Import failed: {e}")),
    };
    if !plan.tasks.is_empty() && !no_backup {
        match store.backup(project_id) {
            Ok(path) => println!("Backup created: {}", path.display()),
            Err(e) => die(format!("Failed to create backup: {e}")),
        }
    }
    persist(store, &generated);
    println!("Imported {} task(s) into '{}'.", generated.tasks.len(), generated.project.name);

    let issues = validate_tasks(&generated.project, &generated.tasks);
    if !issues.is_empty() {
        println!("{} scheduling issue(s) found. Run `wbs check` for details.", issues.len());
    }
}

pub fn cmd_prompt(plan: &Plan, question: Option<String>, answer: Option<PathBuf>) {
    match (question, answer) {
        (Some(q), Some(path)) => match ask_about(&SavedResponse { path }, &q, plan) {
            Ok(text) => println!("{text}"),
            Err(e) => die(format!("Assistant reply unusable: {e}")),
        },
        (Some(q), None) => println!("{}", assistant_prompt(&q, &plan.project, plan.tasks.len())),
        (None, _) => println!("{}", generation_prompt(&plan.project)),
    }
}

pub fn cmd_list(plan: &Plan, all: bool, limit: Option<usize>) {
    if plan.tasks.is_empty() {
        println!("No tasks. Add one with `wbs add` or import a generated plan.");
        return;
    }
    let mut rows = tree_rows(plan, all);
    let hidden = plan.tasks.len() - rows.len();
    if let Some(n) = limit {
        rows.truncate(n);
    }
    print_table(plan, &rows);
    if hidden > 0 {
        println!("\n{hidden} task(s) under collapsed parents. Use --all to show them.");
    }
}

pub fn cmd_show(plan: &Plan, task: &str) {
    let id = resolve(plan, task);
    let Some(t) = plan.get(&id) else {
        die(format!("Task {id} not found."));
    };
    let or_dash = |s: String| if s.is_empty() { "-".to_string() } else { s };

    println!("ID:           {}", t.id);
    println!("WBS:          {}", t.wbs);
    println!("Name:         {}", t.name);
    println!("Status:       {}", format_status(t.status));
    println!("Start:        {}", format_date(t.start_date));
    println!("End:          {}", format_date(t.end_date));
    println!("Duration:     {} day(s)", t.duration);
    println!("Assigned:     {}", or_dash(t.assigned_to.join(", ")));
    println!(
        "Parent:       {}",
        t.parent_id.as_ref().map(|p| label_of(plan, p)).unwrap_or_else(|| "-".into())
    );
    println!(
        "Depends on:   {}",
        or_dash(
            t.dependencies
                .iter()
                .map(|d| format!("{} (+{}d)", label_of(plan, &d.predecessor_id), d.lag))
                .collect::<Vec<_>>()
                .join(", ")
        )
    );
    println!(
        "Dependents:   {}",
        or_dash(dependents_of(&plan.tasks, &id).map(label).collect::<Vec<_>>().join(", "))
    );

    let chain = plan.ancestors(&id);
    if !chain.is_empty() {
        println!(
            "Ancestors (closest first): {}",
            chain.iter().map(|a| label_of(plan, a)).collect::<Vec<_>>().join(" -> ")
        );
    }
    let children = plan.children(Some(&id));
    if !children.is_empty() {
        println!("Children:");
        for c in children {
            println!("  - {} [{}]", label(c), format_status(c.status));
        }
    }
    println!("Notes:\n{}", t.notes.clone().unwrap_or_else(|| "-".into()));
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_add(
    store: &FileStore,
    config: &Config,
    plan: Plan,
    name: String,
    parent: Option<String>,
    duration: Option<u32>,
    start: Option<String>,
    assign: String,
    status: Status,
    notes: Option<String>,
) {
    let start_date = start.map(|s| parse_date_arg(&s)).unwrap_or(plan.project.start_date);
    let mut new = NewTask::new(name, duration.unwrap_or(config.default_duration), start_date)
        .assigned(parse_assignees(&assign));
    if let Some(p) = parent {
        new = new.under(resolve(&plan, &p));
    }
    new.status = status;
    new.notes = notes;

    let (plan, id) = match plan.add_task(new) {
        Ok(added) => added,
        Err(e) => die(format!("Cannot add task: {e}")),
    };
    persist(store, &plan);
    println!("Added {} (id {}).", label_of(&plan, &id), id);
}

pub fn cmd_delete(store: &FileStore, plan: Plan, task: &str, cascade: bool) {
    let id = resolve(&plan, task);
    let below = plan.descendants(&id);
    if !below.is_empty() && !cascade {
        die(format!(
            "Task {} has {} descendant(s). Use --cascade to delete all.",
            label_of(&plan, &id),
            below.len()
        ));
    }
    let (plan, removed) = match plan.delete_task(&id) {
        Ok(done) => done,
        Err(e) => die(format!("Cannot delete task: {e}")),
    };
    persist(store, &plan);
    println!("Deleted {} task(s).", removed.len());
}

pub fn cmd_promote(store: &FileStore, plan: Plan, task: &str) {
    let id = resolve(&plan, task);
    let plan = match plan.promote(&id) {
        Ok(plan) => plan,
        Err(e) => die(format!("Cannot promote: {e}")),
    };
    persist(store, &plan);
    println!("Promoted to {}.", label_of(&plan, &id));
}

pub fn cmd_demote(store: &FileStore, plan: Plan, task: &str) {
    let id = resolve(&plan, task);
    let plan = match plan.demote(&id) {
        Ok(plan) => plan,
        Err(e) => die(format!("Cannot demote: {e}")),
    };
    persist(store, &plan);
    println!("Demoted to {}.", label_of(&plan, &id));
}

pub fn cmd_move(store: &FileStore, plan: Plan, task: &str, to: &str) {
    let dragged = resolve(&plan, task);
    let target = resolve(&plan, to);
    let plan = match plan.reorder(&dragged, &target) {
        Ok(plan) => plan,
        Err(e) => die(format!("Cannot move: {e}")),
    };
    persist(store, &plan);
    println!("Moved to {}.", label_of(&plan, &dragged));
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_edit(
    store: &FileStore,
    plan: Plan,
    task: &str,
    name: Option<String>,
    start: Option<String>,
    end: Option<String>,
    assign: Option<String>,
    status: Option<Status>,
    notes: Option<String>,
) {
    let id = resolve(&plan, task);
    let mut edits = Vec::new();
    if let Some(name) = name {
        edits.push(FieldEdit::Name(name));
    }
    match (start.map(|s| parse_date_arg(&s)), end.map(|s| parse_date_arg(&s))) {
        // Apply in whichever order keeps start before end at every step.
        (Some(s), Some(e)) if plan.get(&id).map_or(true, |t| s < t.end_date) => {
            edits.push(FieldEdit::StartDate(s));
            edits.push(FieldEdit::EndDate(e));
        }
        (Some(s), Some(e)) => {
            edits.push(FieldEdit::EndDate(e));
            edits.push(FieldEdit::StartDate(s));
        }
        (Some(s), None) => edits.push(FieldEdit::StartDate(s)),
        (None, Some(e)) => edits.push(FieldEdit::EndDate(e)),
        (None, None) => {}
    }
    if let Some(assign) = assign {
        edits.push(FieldEdit::AssignedTo(assign));
    }
    if let Some(status) = status {
        edits.push(FieldEdit::Status(status));
    }
    if let Some(notes) = notes {
        edits.push(FieldEdit::Notes(notes));
    }
    if edits.is_empty() {
        die("Nothing to change. Pass at least one field flag.".to_string());
    }

    let mut updated = plan.clone();
    for edit in edits {
        updated = match updated.apply_edit(&id, edit) {
            Ok(next) => next,
            Err(e) => die(format!("Edit rejected: {e}")),
        };
    }
    persist(store, &updated);

    let moved = updated
        .tasks
        .iter()
        .filter(|t| t.id != id && plan.get(&t.id).is_some_and(|old| old.start_date != t.start_date))
        .count();
    println!("Updated {}.", label_of(&updated, &id));
    if moved > 0 {
        println!("Rescheduled {moved} dependent task(s).");
    }
}

pub fn cmd_deps(store: &FileStore, plan: Plan, task: &str, on: Vec<String>, clear: bool, candidates: bool) {
    let id = resolve(&plan, task);
    if candidates {
        for t in plan.dependency_candidates(&id) {
            println!("{:<9} {}", t.wbs, t.name);
        }
        return;
    }
    if on.is_empty() && !clear {
        let Some(t) = plan.get(&id) else {
            die(format!("Task {id} not found."));
        };
        if t.dependencies.is_empty() {
            println!("{} has no dependencies.", label(t));
        }
        for dep in &t.dependencies {
            println!("FS  {}  +{}d", label_of(&plan, &dep.predecessor_id), dep.lag);
        }
        return;
    }

    let mut deps = Vec::new();
    for arg in &on {
        let (reference, lag) = split_lag(arg).unwrap_or_else(|e| die(e));
        deps.push(Dependency::finish_to_start(resolve(&plan, reference), lag));
    }
    let updated = match plan.set_dependencies(&id, deps) {
        Ok(updated) => updated,
        Err(e) => die(format!("Dependencies rejected: {e}")),
    };
    persist(store, &updated);
    if let Some(t) = updated.get(&id) {
        println!(
            "{} now depends on {} task(s), {} to {}.",
            label(t),
            t.dependencies.len(),
            format_date(t.start_date),
            format_date(t.end_date)
        );
    }
}

pub fn cmd_toggle(store: &FileStore, mut plan: Plan, task: Option<String>, all: bool, expand: bool) {
    match (task, all) {
        (_, true) if expand => plan.expand_all(),
        (_, true) => plan.collapse_all(),
        (Some(task), false) => {
            let id = resolve(&plan, &task);
            if !plan.has_children(&id) {
                die(format!("Task {} has no children.", label_of(&plan, &id)));
            }
            if expand {
                plan.expand(&id);
            } else {
                plan.collapse(&id);
            }
        }
        (None, false) => die("Name a task or pass --all.".to_string()),
    }
    persist(store, &plan);
    cmd_list(&plan, false, None);
}

pub fn cmd_analyze(plan: &Plan, config: &Config, json: bool) {
    let findings = analyze_with_threshold(&plan.tasks, config.overallocation_threshold);
    if json {
        match serde_json::to_string_pretty(&findings) {
            Ok(out) => println!("{out}"),
            Err(e) => die(format!("Failed to serialize findings: {e}")),
        }
        return;
    }
    if findings.is_empty() {
        println!("No findings.");
        return;
    }
    for f in &findings {
        println!("[{:<7}] {}", format_severity(f.severity), f.message);
    }
    let alerts = findings.iter().filter(|f| f.severity == Severity::Alert).count();
    println!("\n{} finding(s), {} alert(s).", findings.len(), alerts);
}

pub fn cmd_calendar(plan: &Plan, config: &Config, days: Option<usize>) {
    if plan.project.workers.is_empty() {
        println!("Project has no workers. Set them with `wbs settings --workers`.");
        return;
    }
    let rows = match workload_calendar(&plan.project, &plan.tasks, days.unwrap_or(config.calendar_days)) {
        Ok(rows) => rows,
        Err(e) => die(format!("Cannot build calendar: {e}")),
    };
    let Some(first) = rows.first() else {
        return;
    };

    print!("{:<16}", "");
    for day in &first.days {
        print!("{:>4}", day.date.format("%d").to_string());
    }
    println!();
    for row in &rows {
        print!("{:<16}", truncate(&row.person, 16));
        for day in &row.days {
            let cell = match day.load {
                Load::Free => ".".to_string(),
                Load::Overloaded => format!("{}!", day.codes.len()),
                Load::Light | Load::Busy => day.codes.len().to_string(),
            };
            print!("{cell:>4}");
        }
        println!();
    }
    println!("\n. free   1 light   2 busy   3! overloaded");
}

pub fn cmd_check(plan: &Plan) {
    let issues = validate_tasks(&plan.project, &plan.tasks);
    if issues.is_empty() {
        println!("No issues found in {} task(s).", plan.tasks.len());
        return;
    }
    for issue in &issues {
        println!("- {issue}");
    }
    std::process::exit(1);
}

pub fn cmd_settings(
    store: &FileStore,
    plan: Plan,
    name: Option<String>,
    start: Option<String>,
    end: Option<String>,
    workers: Option<String>,
    desc: Option<String>,
) {
    let current = &plan.project;
    let settings = ProjectSettings {
        name: name.unwrap_or_else(|| current.name.clone()),
        start_date: start.map(|s| parse_date_arg(&s)).unwrap_or(current.start_date),
        end_date: end.map(|s| parse_date_arg(&s)).unwrap_or(current.end_date),
        workers: workers.unwrap_or_else(|| current.workers.join(", ")),
        description: desc.unwrap_or_else(|| current.description.clone()),
    };
    let project = match current.update_settings(settings) {
        Ok(project) => project,
        Err(e) => die(format!("Invalid settings: {e}")),
    };

    let old_id = current.id();
    let new_id = project.id();
    if new_id.is_empty() {
        die("Project name must contain at least one letter or digit.".to_string());
    }
    if new_id != old_id && store.path_for(&new_id).exists() {
        die(format!("Project '{new_id}' already exists."));
    }

    let updated = Plan { project, ..plan };
    persist(store, &updated);
    if new_id != old_id {
        if let Err(e) = store.remove(&old_id) {
            die(format!("Saved as '{new_id}' but failed to remove '{old_id}': {e}"));
        }
        println!("Renamed project to '{new_id}'.");
    }
    println!("Settings saved.");

    let outside = updated
        .tasks
        .iter()
        .filter(|t| !updated.project.contains(t.start_date) || !updated.project.contains(t.end_date))
        .count();
    if outside > 0 {
        println!("{outside} task(s) now fall outside the project window.");
    }
}

pub fn cmd_backup(store: &FileStore, project_id: &str) {
    match store.backup(project_id) {
        Ok(path) => println!("Backup created: {}", path.display()),
        Err(e) => die(format!("Failed to create backup: {e}")),
    }
}

pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}
