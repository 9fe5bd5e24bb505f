//! Hierarchical work-breakdown codes.
//!
//! Top-level tasks are numbered `1.0, 2.0, ...`; children of a task append
//! their sibling ordinal to the parent's code with any trailing `.0` removed,
//! so the children of `2.0` are `2.1, 2.2, ...` and the children of `2.1`
//! are `2.1.1, 2.1.2, ...`.

use std::collections::HashMap;

use tracing::debug;

use crate::task::{Task, TaskId};

/// Code of the fixed first top-level task.
pub const FIXED_ROOT: &str = "1.0";

/// Strip the trailing `.0` that marks a top-level code.
pub fn strip_top_level_suffix(code: &str) -> &str {
    code.strip_suffix(".0").unwrap_or(code)
}

/// Number of dot-separated segments after the first.
///
/// `1.0` and `1.2` are both level 1, `1.2.3` is level 2.
pub fn wbs_level(code: &str) -> usize {
    code.split('.').count().saturating_sub(1)
}

fn child_code(prefix: &str, ordinal: usize) -> String {
    if prefix.is_empty() {
        format!("{ordinal}.0")
    } else {
        format!("{prefix}.{ordinal}")
    }
}

/// Recompute every task's code from the parent links.
///
/// Siblings keep their relative order from `tasks`. The result is in
/// pre-order: each task is followed by its whole subtree. Tasks that cannot
/// be reached from a top-level task (dangling or cyclic parent links) are
/// appended unchanged.
pub fn renumber(tasks: &[Task]) -> Vec<Task> {
    let mut children: HashMap<Option<&TaskId>, Vec<usize>> = HashMap::new();
    for (i, t) in tasks.iter().enumerate() {
        children.entry(t.parent_id.as_ref()).or_default().push(i);
    }

    let mut out = Vec::with_capacity(tasks.len());
    let mut placed = vec![false; tasks.len()];
    let mut stack: Vec<(usize, String)> = Vec::new();

    let push_level = |stack: &mut Vec<(usize, String)>, siblings: Option<&Vec<usize>>, prefix: &str| {
        if let Some(siblings) = siblings {
            for (n, &i) in siblings.iter().enumerate().rev() {
                stack.push((i, child_code(prefix, n + 1)));
            }
        }
    };

    push_level(&mut stack, children.get(&None), "");
    while let Some((i, code)) = stack.pop() {
        if placed[i] {
            continue;
        }
        placed[i] = true;
        let mut task = tasks[i].clone();
        task.wbs = code.clone();
        out.push(task);
        push_level(
            &mut stack,
            children.get(&Some(&tasks[i].id)),
            strip_top_level_suffix(&code),
        );
    }

    let unreachable = placed.iter().filter(|p| !**p).count();
    if unreachable > 0 {
        debug!(unreachable, "tasks left unnumbered: not reachable from a top-level task");
    }
    out.extend(
        tasks
            .iter()
            .zip(&placed)
            .filter(|(_, placed)| !**placed)
            .map(|(t, _)| t.clone()),
    );
    debug!(count = out.len(), "renumbered work breakdown");
    out
}

/// Code to offer for a new task added under `parent` (or at the top level).
///
/// Returns `None` if `parent` is not in the collection.
pub fn next_wbs(tasks: &[Task], parent: Option<&TaskId>) -> Option<String> {
    match parent {
        None => {
            let max = tasks
                .iter()
                .filter(|t| t.parent_id.is_none())
                .filter_map(|t| t.wbs.split('.').next()?.parse::<u32>().ok())
                .max()
                .unwrap_or(0);
            Some(format!("{}.0", max + 1))
        }
        Some(pid) => {
            let parent = tasks.iter().find(|t| &t.id == pid)?;
            let max = tasks
                .iter()
                .filter(|t| t.parent_id.as_ref() == Some(pid))
                .filter_map(|t| t.wbs.rsplit('.').next()?.parse::<u32>().ok())
                .max()
                .unwrap_or(0);
            Some(child_code(strip_top_level_suffix(&parent.wbs), max as usize + 1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    fn codes(tasks: &[Task]) -> Vec<(String, String)> {
        tasks.iter().map(|t| (t.id.to_string(), t.wbs.clone())).collect()
    }

    #[test]
    fn test_renumber_nested() {
        let start = d(3, 1);
        // Deliberately scrambled collection order and stale codes.
        let tasks = vec![
            task("c1", Some("b"), start, 1),
            task("a", None, start, 1),
            task("b", None, start, 1),
            task("b1", Some("b"), start, 1),
            task("c1x", Some("c1"), start, 1),
            task("a1", Some("a"), start, 1),
        ];
        let out = renumber(&tasks);
        assert_eq!(
            codes(&out),
            vec![
                ("a".into(), "1.0".into()),
                ("a1".into(), "1.1".into()),
                ("b".into(), "2.0".into()),
                ("c1".into(), "2.1".into()),
                ("c1x".into(), "2.1.1".into()),
                ("b1".into(), "2.2".into()),
            ]
        );
    }

    #[test]
    fn test_renumber_idempotent_and_deterministic() {
        let plan = sample_plan();
        let once = renumber(&plan.tasks);
        let twice = renumber(&once);
        assert_eq!(once, twice);
        assert_eq!(renumber(&plan.tasks), once);
    }

    #[test]
    fn test_renumber_keeps_unreachable_tasks() {
        let start = d(3, 1);
        let mut orphan = task("x", Some("ghost"), start, 1);
        orphan.wbs = "9.9".into();
        let tasks = vec![orphan, task("a", None, start, 1)];
        let out = renumber(&tasks);
        assert_eq!(codes(&out), vec![("a".into(), "1.0".into()), ("x".into(), "9.9".into())]);
    }

    #[test]
    fn test_next_wbs() {
        let tasks = renumber(&sample_plan().tasks);
        assert_eq!(next_wbs(&tasks, None).as_deref(), Some("3.0"));
        assert_eq!(next_wbs(&tasks, Some(&"design".into())).as_deref(), Some("1.3"));
        assert_eq!(next_wbs(&tasks, Some(&"frame".into())).as_deref(), Some("2.1.1"));
        assert_eq!(next_wbs(&tasks, Some(&"ghost".into())), None);
        assert_eq!(next_wbs(&[], None).as_deref(), Some("1.0"));
    }

    #[test]
    fn test_code_helpers() {
        assert_eq!(strip_top_level_suffix("3.0"), "3");
        assert_eq!(strip_top_level_suffix("3.10"), "3.10");
        assert_eq!(strip_top_level_suffix("3.1.2"), "3.1.2");
        assert_eq!(wbs_level("1.0"), 1);
        assert_eq!(wbs_level("1.2.3"), 2);
    }
}
