//! # wbs_planner
//!
//! A Work-Breakdown-Structure planning engine. A plan is a project window
//! plus an ordered collection of hierarchical tasks; the engine keeps the
//! derived state of that collection consistent as it is edited:
//!
//! - **WBS numbering**: codes like `2.1.3` are recomputed from the tree after
//!   every structural change (`wbs`, `hierarchy`).
//! - **Date cascades**: changing a task's dates reschedules every task that
//!   depends on it, transitively, using finish-to-start links with lag
//!   (`cascade`, `edit`).
//! - **Workload analysis**: orphaned, unassigned, blocked and overallocated
//!   work is reported without touching the plan (`workload`).
//!
//! Operations take a `&Plan` and return a new `Plan` or a typed rejection, so
//! a failed edit never leaves a half-applied change behind.
//!
//! ```no_run
//! use wbs_planner::dates::parse_date_input;
//! use wbs_planner::plan::Plan;
//! use wbs_planner::project::Project;
//! use wbs_planner::task::NewTask;
//!
//! let start = parse_date_input("2025-03-01").unwrap();
//! let end = parse_date_input("2025-06-30").unwrap();
//! let plan = Plan::new(Project::new("Cabin", start, end), Vec::new()).unwrap();
//! let (plan, design) = plan.add_task(NewTask::new("Design", 10, start)).unwrap();
//! let (plan, _) = plan.add_task(NewTask::new("Survey", 3, start).under(design)).unwrap();
//! assert_eq!(plan.tasks[1].wbs, "1.1");
//! ```
//!
//! Projects are persisted as JSON records through `db::ProjectStore`; the
//! `wbs` binary stores them under `~/.wbs/` by default.

pub mod cascade;
pub mod config;
pub mod dates;
pub mod db;
pub mod edit;
pub mod error;
pub mod fields;
pub mod generate;
pub mod hierarchy;
pub mod plan;
pub mod project;
pub mod task;
pub mod validate;
pub mod wbs;
pub mod workload;

#[cfg(test)]
mod test_support;
