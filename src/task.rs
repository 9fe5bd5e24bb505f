//! Task data structure and related functionality.
//!
//! This module defines the core `Task` struct that represents a single node of
//! the work breakdown structure, its finish-to-start `Dependency` edges, and the
//! `NewTask` draft used when adding tasks to a plan.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::fields::*;

/// Opaque, immutable task identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        TaskId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId(s.to_string())
    }
}

/// A finish-to-start edge held by the dependent task, pointing at its predecessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub predecessor_id: TaskId,
    #[serde(rename = "type", default)]
    pub kind: DependencyType,
    /// Day offset between the predecessor's end and the dependent's start.
    #[serde(default)]
    pub lag: u32,
}

impl Dependency {
    pub fn finish_to_start(predecessor_id: TaskId, lag: u32) -> Self {
        Dependency {
            predecessor_id,
            kind: DependencyType::FinishToStart,
            lag,
        }
    }
}

/// A single work item in the breakdown structure.
///
/// Field names on the wire are camelCase; this is both the format the plan
/// generator returns and the persisted format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    /// Hierarchical code, recomputed by `wbs::renumber`.
    #[serde(default)]
    pub wbs: String,
    pub name: String,
    pub duration: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub assigned_to: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    #[serde(default)]
    pub parent_id: Option<TaskId>,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Task {
    /// The fixed first top-level task. It cannot be moved or deleted.
    pub fn is_fixed_root(&self) -> bool {
        self.wbs == crate::wbs::FIXED_ROOT
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether this task holds a dependency on `predecessor`.
    pub fn depends_on(&self, predecessor: &TaskId) -> bool {
        self.dependencies.iter().any(|d| &d.predecessor_id == predecessor)
    }

    pub fn is_assigned_to(&self, person: &str) -> bool {
        self.assigned_to.iter().any(|p| p == person)
    }

    /// Whether `day` lies within the task's inclusive date span.
    pub fn spans(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }
}

/// Caller-supplied fields for a task about to be added to a plan.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub name: String,
    pub duration: u32,
    pub start_date: NaiveDate,
    pub assigned_to: Vec<String>,
    pub parent_id: Option<TaskId>,
    pub status: Status,
    pub notes: Option<String>,
}

impl NewTask {
    pub fn new(name: impl Into<String>, duration: u32, start_date: NaiveDate) -> Self {
        NewTask {
            name: name.into(),
            duration,
            start_date,
            assigned_to: Vec::new(),
            parent_id: None,
            status: Status::NotStarted,
            notes: None,
        }
    }

    pub fn under(mut self, parent: TaskId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    pub fn assigned(mut self, people: Vec<String>) -> Self {
        self.assigned_to = people;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generator_shape() {
        let json = r#"{
            "id": "task-2",
            "wbs": "1.1",
            "name": "Sub-task Name",
            "duration": 5,
            "startDate": "2025-01-15",
            "endDate": "2025-01-20",
            "assignedTo": ["Worker Name"],
            "dependencies": [{"predecessorId": "task-1", "type": "FS", "lag": 0}],
            "parentId": "task-1"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, TaskId::from("task-2"));
        assert_eq!(task.parent_id, Some(TaskId::from("task-1")));
        assert_eq!(task.status, Status::NotStarted);
        assert_eq!(task.dependencies[0].kind, DependencyType::FinishToStart);
        assert_eq!(task.end_date, NaiveDate::from_ymd_opt(2025, 1, 20).unwrap());
        assert!(task.notes.is_none());
    }

    #[test]
    fn test_missing_lag_defaults_to_zero() {
        let dep: Dependency = serde_json::from_str(r#"{"predecessorId": "a", "type": "FS"}"#).unwrap();
        assert_eq!(dep.lag, 0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let task = Task {
            id: TaskId::from("t"),
            wbs: "1.0".into(),
            name: "Kickoff".into(),
            duration: 1,
            start_date: start,
            end_date: start.succ_opt().unwrap(),
            assigned_to: vec![],
            dependencies: vec![],
            parent_id: None,
            status: Status::Complete,
            notes: None,
        };
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["startDate"], "2025-03-01");
        assert_eq!(value["parentId"], serde_json::Value::Null);
        assert_eq!(value["status"], "complete");
        assert!(task.is_fixed_root());
    }
}
