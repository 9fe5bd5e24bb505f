//! Direct field edits and dependency editing.
//!
//! Each edit validates the new value first; a rejection leaves the plan as it
//! was. Accepted date edits recompute the task's duration and push the change
//! through its dependents.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::cascade::{cascade, find_cycle};
use crate::dates::{add_days, days_between};
use crate::error::{DependencyError, EditRejection};
use crate::fields::{DependencyType, Status};
use crate::plan::Plan;
use crate::task::{Dependency, Task, TaskId};
use crate::validate::{parse_assignees, validate_end_edit, validate_name, validate_start_edit};

/// A single direct edit to one task field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Name(String),
    StartDate(NaiveDate),
    EndDate(NaiveDate),
    /// Comma-separated list of names as typed.
    AssignedTo(String),
    Status(Status),
    Notes(String),
}

impl Plan {
    fn edit_target(&self, id: &TaskId) -> Result<(usize, &Task), EditRejection> {
        self.position(id)
            .map(|i| (i, &self.tasks[i]))
            .ok_or_else(|| EditRejection::TaskNotFound(id.clone()))
    }

    /// Apply one field edit, returning the updated plan or the rejection reason.
    pub fn apply_edit(&self, id: &TaskId, edit: FieldEdit) -> Result<Plan, EditRejection> {
        let (i, task) = self.edit_target(id)?;
        let mut updated = task.clone();

        match edit {
            FieldEdit::Name(name) => {
                updated.name = validate_name(&name).inspect_err(|e| warn!(task = %id, "{e}"))?;
            }
            FieldEdit::StartDate(start) => {
                validate_start_edit(&self.project, task, start).inspect_err(|e| warn!(task = %id, "{e}"))?;
                updated.start_date = start;
                updated.duration = days_between(start, updated.end_date);
                return self.replace_and_cascade(i, updated);
            }
            FieldEdit::EndDate(end) => {
                validate_end_edit(&self.project, task, end).inspect_err(|e| warn!(task = %id, "{e}"))?;
                updated.end_date = end;
                updated.duration = days_between(updated.start_date, end);
                return self.replace_and_cascade(i, updated);
            }
            FieldEdit::AssignedTo(raw) => updated.assigned_to = parse_assignees(&raw),
            FieldEdit::Status(status) => updated.status = status,
            FieldEdit::Notes(notes) => {
                updated.notes = if notes.trim().is_empty() { None } else { Some(notes) };
            }
        }

        let mut tasks = self.tasks.clone();
        tasks[i] = updated;
        Ok(self.with_tasks(tasks))
    }

    fn replace_and_cascade(&self, i: usize, updated: Task) -> Result<Plan, EditRejection> {
        let id = updated.id.clone();
        let mut tasks = self.tasks.clone();
        tasks[i] = updated;
        let tasks = cascade(&id, &tasks)?;
        info!(task = %id, "rescheduled task");
        Ok(self.with_tasks(tasks))
    }

    pub fn rename(&self, id: &TaskId, name: &str) -> Result<Plan, EditRejection> {
        self.apply_edit(id, FieldEdit::Name(name.to_string()))
    }

    pub fn set_start_date(&self, id: &TaskId, start: NaiveDate) -> Result<Plan, EditRejection> {
        self.apply_edit(id, FieldEdit::StartDate(start))
    }

    pub fn set_end_date(&self, id: &TaskId, end: NaiveDate) -> Result<Plan, EditRejection> {
        self.apply_edit(id, FieldEdit::EndDate(end))
    }

    /// Tasks `id` may depend on: anything except itself and its own descendants.
    pub fn dependency_candidates(&self, id: &TaskId) -> Vec<&Task> {
        let below = self.descendants(id);
        self.tasks
            .iter()
            .filter(|t| &t.id != id && !below.contains(&t.id))
            .collect()
    }

    /// Replace the dependency list of `id`.
    ///
    /// Entries with an empty predecessor id are dropped. If the new list adds
    /// a predecessor that was not there before, the task is rescheduled from
    /// the last finish-to-start entry in the list, then its dependents are
    /// cascaded. Rejects unknown, self and descendant predecessors, and any
    /// list that would close a dependency cycle.
    pub fn set_dependencies(&self, id: &TaskId, dependencies: Vec<Dependency>) -> Result<Plan, EditRejection> {
        let (i, task) = self.edit_target(id)?;
        let dependencies: Vec<Dependency> = dependencies
            .into_iter()
            .filter(|d| !d.predecessor_id.as_str().trim().is_empty())
            .collect();

        let below = self.descendants(id);
        for dep in &dependencies {
            if &dep.predecessor_id == id {
                return Err(EditRejection::SelfDependency(id.clone()));
            }
            if self.get(&dep.predecessor_id).is_none() {
                return Err(EditRejection::UnknownPredecessor(dep.predecessor_id.clone()));
            }
            if below.contains(&dep.predecessor_id) {
                return Err(EditRejection::DescendantDependency {
                    task: id.clone(),
                    predecessor: dep.predecessor_id.clone(),
                });
            }
        }

        let added = dependencies.iter().any(|d| !task.depends_on(&d.predecessor_id));
        let mut updated = task.clone();
        updated.dependencies = dependencies;

        if added {
            if let Some((predecessor, dep)) = updated
                .dependencies
                .iter()
                .rev()
                .filter(|d| d.kind == DependencyType::FinishToStart)
                .find_map(|d| self.get(&d.predecessor_id).map(|p| (p, d)))
            {
                updated.start_date = add_days(predecessor.end_date, dep.lag as i64)?;
                updated.end_date = add_days(updated.start_date, updated.duration as i64)?;
            }
        }

        let mut tasks = self.tasks.clone();
        tasks[i] = updated;
        if let Some(path) = find_cycle(&tasks, Some(id)) {
            warn!(task = %id, "dependency change would create a cycle");
            return Err(DependencyError::Cycle { path }.into());
        }
        let tasks = cascade(id, &tasks)?;
        info!(task = %id, "updated dependencies");
        Ok(self.with_tasks(tasks))
    }
}
