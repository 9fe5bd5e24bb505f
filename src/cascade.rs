//! Finish-to-start date propagation.
//!
//! When a task's dates change, every task holding a dependency on it is
//! rescheduled to start `lag` days after the predecessor's end, keeping its
//! duration, and the change continues through that task's own dependents.
//! Propagation is depth-first: one dependent's whole chain is settled before
//! the next direct dependent is visited. In a diamond the last write wins.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::dates::add_days;
use crate::error::DependencyError;
use crate::fields::DependencyType;
use crate::task::{Task, TaskId};

/// Tasks that hold a dependency on `id`, in collection order.
pub fn dependents_of<'a>(tasks: &'a [Task], id: &'a TaskId) -> impl Iterator<Item = &'a Task> + 'a {
    tasks.iter().filter(move |t| t.depends_on(id))
}

/// For every task position, the positions of the tasks that depend on it.
fn successor_table(tasks: &[Task]) -> Vec<Vec<usize>> {
    let index: HashMap<&TaskId, usize> = tasks.iter().enumerate().map(|(i, t)| (&t.id, i)).collect();
    let mut successors = vec![Vec::new(); tasks.len()];
    for (j, t) in tasks.iter().enumerate() {
        for dep in &t.dependencies {
            if let Some(&i) = index.get(&dep.predecessor_id) {
                if !successors[i].contains(&j) {
                    successors[i].push(j);
                }
            }
        }
    }
    successors
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Settled,
}

/// Find a dependency cycle, searching from `start` or from every task.
///
/// The returned path starts and ends with the same task id.
pub fn find_cycle(tasks: &[Task], start: Option<&TaskId>) -> Option<Vec<TaskId>> {
    let successors = successor_table(tasks);
    let roots: Vec<usize> = match start {
        Some(id) => vec![tasks.iter().position(|t| &t.id == id)?],
        None => (0..tasks.len()).collect(),
    };

    let mut mark = vec![Mark::Unvisited; tasks.len()];
    for root in roots {
        if mark[root] != Mark::Unvisited {
            continue;
        }
        mark[root] = Mark::OnPath;
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;
            let Some(&succ) = successors[node].get(next) else {
                mark[node] = Mark::Settled;
                stack.pop();
                continue;
            };
            frame.1 += 1;
            match mark[succ] {
                Mark::Unvisited => {
                    mark[succ] = Mark::OnPath;
                    stack.push((succ, 0));
                }
                Mark::OnPath => {
                    let from = stack.iter().position(|&(n, _)| n == succ).unwrap_or(0);
                    let mut path: Vec<TaskId> = stack[from..].iter().map(|&(n, _)| tasks[n].id.clone()).collect();
                    path.push(tasks[succ].id.clone());
                    return Some(path);
                }
                Mark::Settled => {}
            }
        }
    }
    None
}

/// Reschedule everything downstream of `changed`.
///
/// Fails without touching anything if `changed` is unknown, if a
/// dependency cycle is reachable from it, or if a lag pushes a dependent
/// past the last representable date.
pub fn cascade(changed: &TaskId, tasks: &[Task]) -> Result<Vec<Task>, DependencyError> {
    let Some(origin) = tasks.iter().position(|t| &t.id == changed) else {
        return Err(DependencyError::TaskNotFound(changed.clone()));
    };
    if let Some(path) = find_cycle(tasks, Some(changed)) {
        warn!(task = %changed, "dependency cycle blocks date propagation");
        return Err(DependencyError::Cycle { path });
    }

    let successors = successor_table(tasks);
    let mut out = tasks.to_vec();
    // (dependent, predecessor) pairs still to settle; top of stack goes next.
    let mut pending: Vec<(usize, usize)> = successors[origin].iter().rev().map(|&j| (j, origin)).collect();
    let mut writes = 0usize;

    while let Some((j, p)) = pending.pop() {
        let predecessor = &out[p];
        let Some(dep) = out[j].dependencies.iter().find(|d| d.predecessor_id == predecessor.id) else {
            continue;
        };
        let out_of_range = |source| DependencyError::DateOutOfRange { task: out[j].id.clone(), source };
        let new_start = match dep.kind {
            DependencyType::FinishToStart => add_days(predecessor.end_date, dep.lag as i64).map_err(out_of_range)?,
        };
        let new_end = add_days(new_start, out[j].duration as i64).map_err(out_of_range)?;

        let task = &mut out[j];
        task.start_date = new_start;
        task.end_date = new_end;
        debug!(task = %task.id, start = %task.start_date, end = %task.end_date, "rescheduled dependent");
        writes += 1;

        pending.extend(successors[j].iter().rev().map(|&k| (k, j)));
    }

    debug!(origin = %changed, writes, "cascade settled");
    Ok(out)
}
