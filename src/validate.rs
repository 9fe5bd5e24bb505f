//! Validation helpers shared by the plan operations.
//!
//! Edit validators run before any mutation and return the rejection reason;
//! `validate_structure` guards plan construction; `validate_tasks` produces the
//! full advisory report shown by `wbs check`.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use thiserror::Error;

use crate::dates::days_between;
use crate::error::{EditRejection, ValidationError};
use crate::project::Project;
use crate::task::{Task, TaskId};

/// A scheduling or structural problem found in a task collection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error(transparent)]
    Structure(#[from] ValidationError),

    #[error("Task {0} has a blank name")]
    BlankName(TaskId),

    #[error("Task {0} has a zero duration")]
    ZeroDuration(TaskId),

    #[error("Task {task} spans {actual} days but its duration is {duration}")]
    DurationMismatch { task: TaskId, duration: u32, actual: u32 },

    #[error("Task {task} date {date} lies outside the project window")]
    OutsideProjectWindow { task: TaskId, date: NaiveDate },

    #[error("Task {task} depends on unknown task {predecessor}")]
    UnknownPredecessor { task: TaskId, predecessor: TaskId },

    #[error("Task {0} depends on itself")]
    SelfDependency(TaskId),
}

/// Split a comma-separated list of names, trimming blanks and duplicates.
/// Order of first appearance is preserved.
pub fn parse_assignees(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split(',')
        .map(|part| part.trim())
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.to_string()))
        .map(|name| name.to_string())
        .collect()
}

/// Trimmed, non-blank task name.
pub fn validate_name(name: &str) -> Result<String, EditRejection> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(EditRejection::BlankName)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Check a new start date for `task` against the window and its end date.
pub fn validate_start_edit(project: &Project, task: &Task, start: NaiveDate) -> Result<(), EditRejection> {
    project.check_window(start)?;
    if start >= task.end_date {
        return Err(EditRejection::StartNotBeforeEnd { start, end: task.end_date });
    }
    Ok(())
}

/// Check a new end date for `task` against the window and its start date.
pub fn validate_end_edit(project: &Project, task: &Task, end: NaiveDate) -> Result<(), EditRejection> {
    project.check_window(end)?;
    if end <= task.start_date {
        return Err(EditRejection::EndNotAfterStart { start: task.start_date, end });
    }
    Ok(())
}

/// Check that ids are unique, every parent exists and no task is its own ancestor.
pub fn validate_structure(tasks: &[Task]) -> Result<(), ValidationError> {
    structural_issues(tasks).into_iter().next().map_or(Ok(()), Err)
}

fn structural_issues(tasks: &[Task]) -> Vec<ValidationError> {
    let mut issues = Vec::new();
    let mut parents: HashMap<&TaskId, Option<&TaskId>> = HashMap::new();
    for t in tasks {
        if parents.insert(&t.id, t.parent_id.as_ref()).is_some() {
            issues.push(ValidationError::DuplicateId(t.id.clone()));
        }
    }
    for t in tasks {
        if let Some(parent) = &t.parent_id {
            if !parents.contains_key(parent) {
                issues.push(ValidationError::MissingParent {
                    task: t.id.clone(),
                    parent: parent.clone(),
                });
            }
        }
    }
    for t in tasks {
        let mut seen = HashSet::new();
        let mut cur = t.parent_id.as_ref();
        while let Some(p) = cur {
            if p == &t.id || !seen.insert(p) {
                issues.push(ValidationError::ParentCycle(t.id.clone()));
                break;
            }
            cur = parents.get(p).copied().flatten();
        }
    }
    issues
}

/// Full report of everything wrong with a task collection.
pub fn validate_tasks(project: &Project, tasks: &[Task]) -> Vec<ValidationIssue> {
    let mut issues: Vec<ValidationIssue> = structural_issues(tasks).into_iter().map(Into::into).collect();
    let ids: HashSet<&TaskId> = tasks.iter().map(|t| &t.id).collect();

    for t in tasks {
        if t.name.trim().is_empty() {
            issues.push(ValidationIssue::BlankName(t.id.clone()));
        }
        if t.duration == 0 {
            issues.push(ValidationIssue::ZeroDuration(t.id.clone()));
        }
        let actual = days_between(t.start_date, t.end_date);
        if t.end_date < t.start_date || actual != t.duration {
            issues.push(ValidationIssue::DurationMismatch {
                task: t.id.clone(),
                duration: t.duration,
                actual,
            });
        }
        for date in [t.start_date, t.end_date] {
            if !project.contains(date) {
                issues.push(ValidationIssue::OutsideProjectWindow { task: t.id.clone(), date });
            }
        }
        for dep in &t.dependencies {
            if dep.predecessor_id == t.id {
                issues.push(ValidationIssue::SelfDependency(t.id.clone()));
            } else if !ids.contains(&dep.predecessor_id) {
                issues.push(ValidationIssue::UnknownPredecessor {
                    task: t.id.clone(),
                    predecessor: dep.predecessor_id.clone(),
                });
            }
        }
    }
    issues
}
