//! The plan: a project and its ordered task collection.
//!
//! A `Plan` is a value. Every operation in `hierarchy`, `edit` and `cascade`
//! reads a plan and returns a new one, so a caller holds one current snapshot
//! and swaps it for the result only when the operation succeeds.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::error::ValidationError;
use crate::project::Project;
use crate::task::{Task, TaskId};
use crate::validate::validate_structure;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub project: Project,
    /// Tasks in display order. Sibling order is the relative order here.
    pub tasks: Vec<Task>,
    /// Tasks whose children are shown in tree views.
    pub expanded: BTreeSet<TaskId>,
}

impl Plan {
    /// Build a plan, rejecting duplicate ids, missing parents and parent cycles.
    pub fn new(project: Project, tasks: Vec<Task>) -> Result<Self, ValidationError> {
        validate_structure(&tasks)?;
        Ok(Plan {
            project,
            tasks,
            expanded: BTreeSet::new(),
        })
    }

    /// Same project and display state with a different task collection.
    pub(crate) fn with_tasks(&self, tasks: Vec<Task>) -> Plan {
        Plan {
            project: self.project.clone(),
            tasks,
            expanded: self.expanded.clone(),
        }
    }

    /// Map task ids to their positions in the tasks vector.
    pub fn index(&self) -> HashMap<&TaskId, usize> {
        self.tasks.iter().enumerate().map(|(i, t)| (&t.id, i)).collect()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == id)
    }

    /// Generate the next unused `task-N` identifier.
    pub fn next_id(&self) -> TaskId {
        let n = self
            .tasks
            .iter()
            .filter_map(|t| t.id.as_str().strip_prefix("task-")?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        TaskId(format!("task-{}", n + 1))
    }

    /// Direct children of `parent` (or top-level tasks for `None`), in order.
    pub fn children(&self, parent: Option<&TaskId>) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.parent_id.as_ref() == parent).collect()
    }

    pub fn has_children(&self, id: &TaskId) -> bool {
        self.tasks.iter().any(|t| t.parent_id.as_ref() == Some(id))
    }

    /// Every task below `root` in the hierarchy.
    pub fn descendants(&self, root: &TaskId) -> HashSet<TaskId> {
        let mut child_map: HashMap<&TaskId, Vec<&TaskId>> = HashMap::new();
        for t in &self.tasks {
            if let Some(p) = &t.parent_id {
                child_map.entry(p).or_default().push(&t.id);
            }
        }
        let mut out = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            for &c in child_map.get(id).into_iter().flatten() {
                if out.insert(c.clone()) {
                    stack.push(c);
                }
            }
        }
        out
    }

    /// Ancestor ids, closest first.
    pub fn ancestors(&self, id: &TaskId) -> Vec<TaskId> {
        let index = self.index();
        let mut chain = Vec::new();
        let mut cur = index.get(id).and_then(|&i| self.tasks[i].parent_id.as_ref());
        while let Some(p) = cur {
            if chain.contains(p) {
                break;
            }
            chain.push(p.clone());
            cur = index.get(p).and_then(|&i| self.tasks[i].parent_id.as_ref());
        }
        chain
    }

    /// Nesting depth: the number of ancestors. Top-level tasks are at depth 0.
    pub fn depth(&self, id: &TaskId) -> usize {
        self.ancestors(id).len()
    }

    /// Resolve a task id, WBS code or (case-insensitive) name to a task id.
    /// Returns an error if a name matches several tasks.
    pub fn resolve(&self, identifier: &str) -> Result<TaskId, String> {
        let ident = identifier.trim();
        if let Some(t) = self.tasks.iter().find(|t| t.id.as_str() == ident) {
            return Ok(t.id.clone());
        }
        if let Some(t) = self.tasks.iter().find(|t| t.wbs == ident) {
            return Ok(t.id.clone());
        }

        let matches: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.name.to_lowercase() == ident.to_lowercase())
            .collect();

        match matches.len() {
            0 => Err(format!("No task found with id, code or name '{}'", ident)),
            1 => Ok(matches[0].id.clone()),
            _ => {
                let mut error_msg = format!("Multiple tasks found with name '{}':\n", ident);
                for task in matches {
                    error_msg.push_str(&format!("  {} {} (id {})\n", task.wbs, task.name, task.id));
                }
                error_msg.push_str("Please use the WBS code or id instead.");
                Err(error_msg)
            }
        }
    }

    pub fn is_expanded(&self, id: &TaskId) -> bool {
        self.expanded.contains(id)
    }

    pub fn expand(&mut self, id: &TaskId) {
        self.expanded.insert(id.clone());
    }

    pub fn collapse(&mut self, id: &TaskId) {
        self.expanded.remove(id);
    }

    pub fn expand_all(&mut self) {
        self.expanded = self.tasks.iter().map(|t| t.id.clone()).collect();
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }
}
