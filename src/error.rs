//! Error and rejection types.
//!
//! Rejections are ordinary values: an operation that returns `Err` has not
//! touched the caller's plan, so the previous snapshot stays authoritative.

use chrono::NaiveDate;
use thiserror::Error;

use crate::task::TaskId;

/// Calendar arithmetic that left the representable date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Date out of range: {date} moved by {days} days")]
pub struct DateOutOfRange {
    pub date: NaiveDate,
    pub days: i64,
}

/// A direct field edit or task addition that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditRejection {
    #[error("Task {0} not found")]
    TaskNotFound(TaskId),

    #[error("Task name cannot be blank")]
    BlankName,

    #[error("Project name cannot be empty")]
    BlankProjectName,

    #[error("Duration must be at least one day")]
    InvalidDuration,

    #[error("Date {date} must be between {window_start} and {window_end}")]
    OutsideProjectWindow {
        date: NaiveDate,
        window_start: NaiveDate,
        window_end: NaiveDate,
    },

    #[error("Start date {start} must be before end date {end}")]
    StartNotBeforeEnd { start: NaiveDate, end: NaiveDate },

    #[error("End date {end} must be after start date {start}")]
    EndNotAfterStart { start: NaiveDate, end: NaiveDate },

    #[error("Parent task {0} not found")]
    UnknownParent(TaskId),

    #[error("Predecessor {0} not found")]
    UnknownPredecessor(TaskId),

    #[error("Task {0} cannot depend on itself")]
    SelfDependency(TaskId),

    #[error("Task {task} cannot depend on its own subtask {predecessor}")]
    DescendantDependency { task: TaskId, predecessor: TaskId },

    #[error(transparent)]
    DateOutOfRange(#[from] DateOutOfRange),

    #[error(transparent)]
    Dependency(#[from] DependencyError),
}

/// A promote, demote, reorder or delete whose preconditions were not met.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveRejection {
    #[error("Task {0} not found")]
    TaskNotFound(TaskId),

    #[error("The first task (1.0) is fixed and cannot be moved or deleted")]
    FixedRoot,

    #[error("Task {0} is already at the top level")]
    AlreadyTopLevel(TaskId),

    #[error("Demoting task {0} would nest tasks {1} levels deep; the limit is 3")]
    MaxDepth(TaskId, usize),

    #[error("Task {0} has no sibling directly above it to nest under")]
    NoPrecedingSibling(TaskId),

    #[error("Tasks can only be reordered within the same level")]
    DifferentParents,

    #[error("A task cannot be dropped onto itself")]
    SameTask,

    #[error("Moving task {0} would make it its own ancestor")]
    WouldCreateCycle(TaskId),
}

/// Problems in the finish-to-start dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyError {
    #[error("Dependency cycle detected: {}", format_path(.path))]
    Cycle { path: Vec<TaskId> },

    #[error("Task {0} not found")]
    TaskNotFound(TaskId),

    #[error("Rescheduling task {task} failed: {source}")]
    DateOutOfRange { task: TaskId, source: DateOutOfRange },
}

fn format_path(path: &[TaskId]) -> String {
    path.iter().map(|id| id.as_str()).collect::<Vec<_>>().join(" -> ")
}

/// Structural problems that make a task collection unusable as a plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Duplicate task id {0}")]
    DuplicateId(TaskId),

    #[error("Task {task} references missing parent {parent}")]
    MissingParent { task: TaskId, parent: TaskId },

    #[error("Task {0} is its own ancestor")]
    ParentCycle(TaskId),
}

/// Persistence failures. The in-memory plan is unaffected by these.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored project is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Project '{0}' already exists")]
    AlreadyExists(String),

    #[error("No project named '{0}'")]
    NotFound(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Failures at the plan-generation or assistant boundary.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Unexpected response format")]
    UnexpectedResponse,

    #[error("Failed to parse generated plan: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Generated plan is inconsistent: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Generation service failed: {0}")]
    Service(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_path() {
        let err = DependencyError::Cycle {
            path: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "Dependency cycle detected: a -> b -> a");
    }

    #[test]
    fn test_edit_rejection_wraps_dependency_error() {
        let err: EditRejection = DependencyError::TaskNotFound("x".into()).into();
        assert_eq!(err.to_string(), "Task x not found");
    }
}
