//! Structural edits: add, delete, promote, demote and reorder.
//!
//! Every operation checks its preconditions first and returns a rejection
//! without building anything if they fail. Moves keep the single-parent tree
//! intact: a task is never re-parented under itself or one of its descendants.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::dates::add_days;
use crate::error::{EditRejection, MoveRejection};
use crate::plan::Plan;
use crate::task::{NewTask, Task, TaskId};
use crate::validate::validate_name;
use crate::wbs::{next_wbs, renumber, FIXED_ROOT};

/// Deepest nesting (in ancestors) a task may be demoted into.
pub const MAX_DEPTH: usize = 3;

impl Plan {
    fn require(&self, id: &TaskId) -> Result<&Task, MoveRejection> {
        self.get(id).ok_or_else(|| MoveRejection::TaskNotFound(id.clone()))
    }

    /// Add a task at the end of the collection, numbered after its future siblings.
    ///
    /// Returns the new plan and the generated id. Adding under a parent marks
    /// that parent expanded.
    pub fn add_task(&self, new: NewTask) -> Result<(Plan, TaskId), EditRejection> {
        let name = validate_name(&new.name)?;
        if new.duration == 0 {
            return Err(EditRejection::InvalidDuration);
        }
        let wbs = match &new.parent_id {
            Some(parent) => next_wbs(&self.tasks, Some(parent))
                .ok_or_else(|| EditRejection::UnknownParent(parent.clone()))?,
            None => next_wbs(&self.tasks, None).unwrap_or_else(|| FIXED_ROOT.to_string()),
        };
        let end_date = add_days(new.start_date, new.duration as i64)?;
        self.project.check_window(new.start_date)?;
        self.project.check_window(end_date)?;

        let id = self.next_id();
        let task = Task {
            id: id.clone(),
            wbs,
            name,
            duration: new.duration,
            start_date: new.start_date,
            end_date,
            assigned_to: new.assigned_to,
            dependencies: Vec::new(),
            parent_id: new.parent_id,
            status: new.status,
            notes: new.notes,
        };

        let parent = task.parent_id.clone();
        let mut tasks = self.tasks.clone();
        tasks.push(task);
        let mut plan = self.with_tasks(tasks);
        if let Some(parent) = parent {
            plan.expand(&parent);
        }
        info!(task = %id, "added task");
        Ok((plan, id))
    }

    /// Delete a task together with all of its descendants.
    ///
    /// Dependencies on removed tasks are dropped from the survivors, and the
    /// remaining tree is renumbered. Returns the removed ids.
    pub fn delete_task(&self, id: &TaskId) -> Result<(Plan, HashSet<TaskId>), MoveRejection> {
        let task = self.require(id)?;
        if task.is_fixed_root() {
            warn!(task = %id, "refused to delete the fixed first task");
            return Err(MoveRejection::FixedRoot);
        }

        let mut removed = self.descendants(id);
        removed.insert(id.clone());

        let mut tasks: Vec<Task> = self.tasks.iter().filter(|t| !removed.contains(&t.id)).cloned().collect();
        for t in tasks.iter_mut() {
            t.dependencies.retain(|d| !removed.contains(&d.predecessor_id));
        }

        let mut plan = self.with_tasks(renumber(&tasks));
        plan.expanded.retain(|e| !removed.contains(e));
        info!(task = %id, removed = removed.len(), "deleted task and descendants");
        Ok((plan, removed))
    }

    /// Check whether `id` may move one level up.
    pub fn can_promote(&self, id: &TaskId) -> Result<(), MoveRejection> {
        let task = self.require(id)?;
        if task.is_fixed_root() {
            return Err(MoveRejection::FixedRoot);
        }
        if task.parent_id.is_none() || task.wbs.ends_with(".0") {
            return Err(MoveRejection::AlreadyTopLevel(id.clone()));
        }
        Ok(())
    }

    /// Move a task one level up: it becomes a sibling of its former parent,
    /// placed directly after it.
    pub fn promote(&self, id: &TaskId) -> Result<Plan, MoveRejection> {
        self.can_promote(id)?;
        let parent_id = self.require(id)?.parent_id.clone().ok_or_else(|| MoveRejection::AlreadyTopLevel(id.clone()))?;
        let grandparent = self.require(&parent_id)?.parent_id.clone();

        let mut tasks = self.tasks.clone();
        let Some(from) = tasks.iter().position(|t| &t.id == id) else {
            return Err(MoveRejection::TaskNotFound(id.clone()));
        };
        let mut moved = tasks.remove(from);
        moved.parent_id = grandparent;
        let after = tasks.iter().position(|t| t.id == parent_id).map_or(tasks.len(), |p| p + 1);
        tasks.insert(after, moved);

        info!(task = %id, "promoted task");
        Ok(self.with_tasks(renumber(&tasks)))
    }

    /// The task directly above `id` in collection order, if it has the same parent.
    ///
    /// When the row above is a descendant of an earlier sibling there is no
    /// task to nest under.
    pub fn demote_parent(&self, id: &TaskId) -> Option<&Task> {
        let pos = self.position(id)?;
        let above = self.tasks.get(pos.checked_sub(1)?)?;
        (above.parent_id == self.tasks[pos].parent_id).then_some(above)
    }

    /// Levels below `id` in its own subtree; 0 for a leaf.
    fn subtree_height(&self, id: &TaskId) -> usize {
        let depth = self.depth(id);
        self.descendants(id)
            .iter()
            .map(|d| self.depth(d).saturating_sub(depth))
            .max()
            .unwrap_or(0)
    }

    /// Check whether `id` may move one level down.
    ///
    /// The whole subtree moves with it, so the deepest descendant must still
    /// be within `MAX_DEPTH` afterwards.
    pub fn can_demote(&self, id: &TaskId) -> Result<(), MoveRejection> {
        let task = self.require(id)?;
        if task.is_fixed_root() {
            return Err(MoveRejection::FixedRoot);
        }
        let deepest = self.depth(id) + 1 + self.subtree_height(id);
        if deepest > MAX_DEPTH {
            return Err(MoveRejection::MaxDepth(id.clone(), deepest));
        }
        if self.demote_parent(id).is_none() {
            return Err(MoveRejection::NoPrecedingSibling(id.clone()));
        }
        Ok(())
    }

    /// Move a task one level down under the row directly above it, which is
    /// marked expanded. The task keeps its place in the collection.
    pub fn demote(&self, id: &TaskId) -> Result<Plan, MoveRejection> {
        self.can_demote(id)?;
        let new_parent = self
            .demote_parent(id)
            .map(|t| t.id.clone())
            .ok_or_else(|| MoveRejection::NoPrecedingSibling(id.clone()))?;
        if self.descendants(id).contains(&new_parent) {
            return Err(MoveRejection::WouldCreateCycle(id.clone()));
        }

        let mut tasks = self.tasks.clone();
        let Some(moved) = tasks.iter_mut().find(|t| &t.id == id) else {
            return Err(MoveRejection::TaskNotFound(id.clone()));
        };
        moved.parent_id = Some(new_parent.clone());

        let mut plan = self.with_tasks(renumber(&tasks));
        plan.expand(&new_parent);
        info!(task = %id, parent = %new_parent, "demoted task");
        Ok(plan)
    }

    /// Drag `dragged` onto `target` within the same parent.
    ///
    /// The dragged task is removed from the sibling list and reinserted at the
    /// target's former position, so dragging down lands after the target and
    /// dragging up lands before it.
    pub fn reorder(&self, dragged: &TaskId, target: &TaskId) -> Result<Plan, MoveRejection> {
        let dragged_task = self.require(dragged)?;
        let target_task = self.require(target)?;
        if dragged_task.is_fixed_root() || target_task.is_fixed_root() {
            return Err(MoveRejection::FixedRoot);
        }
        if dragged == target {
            return Err(MoveRejection::SameTask);
        }
        if dragged_task.parent_id != target_task.parent_id {
            warn!(dragged = %dragged, target = %target, "refused to reorder across levels");
            return Err(MoveRejection::DifferentParents);
        }

        let slots: Vec<usize> = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, s)| s.parent_id == dragged_task.parent_id)
            .map(|(i, _)| i)
            .collect();
        let mut order: Vec<usize> = slots.clone();
        let from = order.iter().position(|&i| &self.tasks[i].id == dragged).ok_or_else(|| MoveRejection::TaskNotFound(dragged.clone()))?;
        let to = order.iter().position(|&i| &self.tasks[i].id == target).ok_or_else(|| MoveRejection::TaskNotFound(target.clone()))?;
        let moving = order.remove(from);
        order.insert(to.min(order.len()), moving);

        let mut tasks = self.tasks.clone();
        for (&slot, &source) in slots.iter().zip(&order) {
            tasks[slot] = self.tasks[source].clone();
        }

        info!(dragged = %dragged, target = %target, "reordered siblings");
        Ok(self.with_tasks(renumber(&tasks)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    fn ids(plan: &Plan) -> Vec<String> {
        plan.tasks.iter().map(|t| format!("{} {}", t.wbs, t.id)).collect()
    }

    #[test]
    fn test_add_top_level_and_nested() {
        let plan = sample_plan();
        let (plan, top) = plan.add_task(NewTask::new("Handover", 2, d(4, 1))).unwrap();
        assert_eq!(wbs_of(&plan, top.as_str()), "3.0");
        let t = plan.get(&top).unwrap();
        assert_eq!(t.end_date, d(4, 3));
        assert!(t.dependencies.is_empty());

        let (plan, child) = plan
            .add_task(NewTask::new("Paint", 3, d(3, 20)).under("build".into()))
            .unwrap();
        assert_eq!(wbs_of(&plan, child.as_str()), "2.3");
        assert!(plan.is_expanded(&"build".into()));
        assert_eq!(plan.tasks.last().map(|t| t.id.clone()), Some(child));
    }

    #[test]
    fn test_add_rejections() {
        let plan = sample_plan();
        assert_eq!(
            plan.add_task(NewTask::new("  ", 2, d(4, 1))).unwrap_err(),
            EditRejection::BlankName
        );
        assert_eq!(
            plan.add_task(NewTask::new("x", 0, d(4, 1))).unwrap_err(),
            EditRejection::InvalidDuration
        );
        assert!(matches!(
            plan.add_task(NewTask::new("x", 2, d(4, 1)).under("ghost".into())),
            Err(EditRejection::UnknownParent(_))
        ));
        assert!(matches!(
            plan.add_task(NewTask::new("x", 5, d(6, 28))),
            Err(EditRejection::OutsideProjectWindow { .. })
        ));
        assert!(matches!(
            plan.add_task(NewTask::new("x", 4_000_000_000, d(3, 1))),
            Err(EditRejection::DateOutOfRange(_))
        ));
    }

    #[test]
    fn test_delete_cascades_to_descendants() {
        let plan = sample_plan();
        let (plan, grandchild) = plan
            .add_task(NewTask::new("Trusses", 2, d(3, 12)).under("frame".into()))
            .unwrap();
        let before = plan.tasks.len();

        let (after, removed) = plan.delete_task(&"build".into()).unwrap();
        assert_eq!(removed.len(), 4);
        assert!(removed.contains(&grandchild));
        assert_eq!(after.tasks.len(), before - 4);
        assert_eq!(ids(&after), vec!["1.0 design", "1.1 survey", "1.2 drawings"]);
    }

    #[test]
    fn test_delete_strips_dangling_dependencies() {
        let plan = sample_plan();
        let (after, _) = plan.delete_task(&"survey".into()).unwrap();
        let drawings = after.get(&"drawings".into()).unwrap();
        assert!(drawings.dependencies.is_empty());
        assert_eq!(drawings.wbs, "1.1");
    }

    #[test]
    fn test_fixed_root_is_immovable() {
        let plan = sample_plan();
        let root = TaskId::from("design");
        assert_eq!(plan.delete_task(&root).unwrap_err(), MoveRejection::FixedRoot);
        assert_eq!(plan.promote(&root).unwrap_err(), MoveRejection::FixedRoot);
        assert_eq!(plan.demote(&root).unwrap_err(), MoveRejection::FixedRoot);
        assert_eq!(plan.reorder(&root, &"build".into()).unwrap_err(), MoveRejection::FixedRoot);
        assert_eq!(plan.reorder(&"build".into(), &root).unwrap_err(), MoveRejection::FixedRoot);
    }

    #[test]
    fn test_promote() {
        let plan = sample_plan();
        assert_eq!(
            plan.promote(&"build".into()).unwrap_err(),
            MoveRejection::AlreadyTopLevel("build".into())
        );

        let after = plan.promote(&"survey".into()).unwrap();
        assert_eq!(
            ids(&after),
            vec!["1.0 design", "1.1 drawings", "2.0 survey", "3.0 build", "3.1 frame", "3.2 roof"]
        );
        assert_eq!(after.get(&"survey".into()).unwrap().parent_id, None);
    }

    #[test]
    fn test_demote_under_row_above() {
        let plan = sample_plan();
        assert_eq!(
            plan.demote(&"frame".into()).unwrap_err(),
            MoveRejection::NoPrecedingSibling("frame".into())
        );

        let after = plan.demote(&"roof".into()).unwrap();
        assert_eq!(after.get(&"roof".into()).unwrap().parent_id, Some("frame".into()));
        assert_eq!(wbs_of(&after, "roof"), "2.1.1");
        assert!(after.is_expanded(&"frame".into()));

        let after = plan.demote(&"drawings".into()).unwrap();
        assert_eq!(
            ids(&after),
            vec!["1.0 design", "1.1 survey", "1.1.1 drawings", "2.0 build", "2.1 frame", "2.2 roof"]
        );
    }

    #[test]
    fn test_demote_refused_below_nested_row() {
        // The row above build is drawings, a child of design.
        let plan = sample_plan();
        assert_eq!(plan.demote_parent(&"build".into()), None);
        assert_eq!(
            plan.demote(&"build".into()).unwrap_err(),
            MoveRejection::NoPrecedingSibling("build".into())
        );
        assert_eq!(wbs_of(&plan, "build"), "2.0");
    }

    #[test]
    fn test_demote_depth_bound() {
        let plan = sample_plan();
        let (plan, a) = plan.add_task(NewTask::new("a", 1, d(4, 1)).under("roof".into())).unwrap();
        let (plan, b) = plan.add_task(NewTask::new("b", 1, d(4, 1)).under("roof".into())).unwrap();
        assert_eq!(plan.depth(&b), 2);

        let plan = plan.demote(&b).unwrap();
        assert_eq!(plan.depth(&b), 3);
        assert_eq!(wbs_of(&plan, b.as_str()), "2.2.1.1");

        let (plan, c) = plan.add_task(NewTask::new("c", 1, d(4, 1)).under(a)).unwrap();
        assert_eq!(plan.demote(&c).unwrap_err(), MoveRejection::MaxDepth(c.clone(), 4));
        assert!(plan.tasks.iter().all(|t| plan.depth(&t.id) <= MAX_DEPTH));
    }

    #[test]
    fn test_demote_counts_the_moving_subtree() {
        let plan = sample_plan();
        let (plan, _a) = plan.add_task(NewTask::new("a", 1, d(4, 1)).under("roof".into())).unwrap();
        let (plan, b) = plan.add_task(NewTask::new("b", 1, d(4, 1)).under("roof".into())).unwrap();
        let (plan, c) = plan.add_task(NewTask::new("c", 1, d(4, 1)).under(b.clone())).unwrap();
        assert_eq!(plan.depth(&c), 3);

        assert_eq!(plan.demote(&b).unwrap_err(), MoveRejection::MaxDepth(b.clone(), 4));
        assert!(plan.tasks.iter().all(|t| plan.depth(&t.id) <= MAX_DEPTH));

        // roof carries a, b and c down with it.
        assert_eq!(plan.demote(&"roof".into()).unwrap_err(), MoveRejection::MaxDepth("roof".into(), 4));
    }

    #[test]
    fn test_reorder_within_siblings() {
        let plan = sample_plan();
        let (plan, paint) = plan.add_task(NewTask::new("Paint", 1, d(4, 1)).under("build".into())).unwrap();

        // Drag paint (2.3) up onto frame (2.1): lands before frame.
        let after = plan.reorder(&paint, &"frame".into()).unwrap();
        assert_eq!(wbs_of(&after, paint.as_str()), "2.1");
        assert_eq!(wbs_of(&after, "frame"), "2.2");
        assert_eq!(wbs_of(&after, "roof"), "2.3");

        // Drag frame down onto roof: lands after roof.
        let after = after.reorder(&"frame".into(), &"roof".into()).unwrap();
        assert_eq!(wbs_of(&after, "roof"), "2.2");
        assert_eq!(wbs_of(&after, "frame"), "2.3");
        assert_eq!(wbs_of(&after, "design"), "1.0");
    }

    #[test]
    fn test_reorder_rejections() {
        let plan = sample_plan();
        assert_eq!(
            plan.reorder(&"frame".into(), &"drawings".into()).unwrap_err(),
            MoveRejection::DifferentParents
        );
        assert_eq!(plan.reorder(&"frame".into(), &"frame".into()).unwrap_err(), MoveRejection::SameTask);
    }
}
