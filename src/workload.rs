//! Workload and plan-health analysis.
//!
//! `analyze` is a pure function over a settled task collection: it never
//! mutates tasks and is simply re-run after every change. Findings come out
//! grouped by check, in this order: orphan dependencies, unassigned tasks,
//! overallocation, blocked tasks.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::dates::{add_days, format_short_date, iter_days};
use crate::error::DateOutOfRange;
use crate::fields::*;
use crate::project::Project;
use crate::task::{Task, TaskId};

/// Number of simultaneous tasks on one day at which a person is overallocated.
pub const OVERALLOCATION_THRESHOLD: usize = 3;

/// One person's collision on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overallocation {
    pub person: String,
    pub date: NaiveDate,
    /// WBS codes of the colliding tasks, in collection order.
    pub codes: Vec<String>,
}

/// An advisory finding about the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub severity: Severity,
    pub kind: FindingKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overallocation: Option<Overallocation>,
}

impl Finding {
    fn for_task(kind: FindingKind, task: &Task, message: String) -> Self {
        Finding {
            severity: kind.severity(),
            kind,
            task_id: Some(task.id.clone()),
            message,
            overallocation: None,
        }
    }
}

/// Analyze with the default overallocation threshold.
pub fn analyze(tasks: &[Task]) -> Vec<Finding> {
    analyze_with_threshold(tasks, OVERALLOCATION_THRESHOLD)
}

pub fn analyze_with_threshold(tasks: &[Task], threshold: usize) -> Vec<Finding> {
    let mut findings = Vec::new();
    let parents: HashSet<&TaskId> = tasks.iter().filter_map(|t| t.parent_id.as_ref()).collect();

    for task in tasks {
        if !task.is_fixed_root() && task.dependencies.is_empty() && !parents.contains(&task.id) {
            findings.push(Finding::for_task(
                FindingKind::OrphanDependency,
                task,
                format!("Task \"{} {}\" has no dependencies. Does it depend on another task?", task.wbs, task.name),
            ));
        }
    }

    for task in tasks {
        if task.assigned_to.is_empty() {
            findings.push(Finding::for_task(
                FindingKind::Unassigned,
                task,
                format!("Task \"{} {}\" has no one assigned.", task.wbs, task.name),
            ));
        }
    }

    findings.extend(overallocations(tasks, threshold).into_iter().map(|o| Finding {
        severity: FindingKind::Overallocation.severity(),
        kind: FindingKind::Overallocation,
        task_id: None,
        message: format!(
            "{} has {} tasks on {}: {}",
            o.person,
            o.codes.len(),
            format_short_date(o.date),
            o.codes.join(", ")
        ),
        overallocation: Some(o),
    }));

    for task in tasks {
        if task.status == Status::Blocked {
            findings.push(Finding::for_task(
                FindingKind::Blocked,
                task,
                format!("Task \"{} {}\" is blocked. Review and resolve.", task.wbs, task.name),
            ));
        }
    }

    findings
}

/// Every (person, day) with at least `threshold` overlapping tasks.
///
/// People appear in order of first assignment; days ascend per person.
pub fn overallocations(tasks: &[Task], threshold: usize) -> Vec<Overallocation> {
    let mut people: Vec<&str> = Vec::new();
    let mut load: HashMap<&str, BTreeMap<NaiveDate, Vec<&str>>> = HashMap::new();

    for task in tasks {
        let mut seen = HashSet::new();
        for person in task.assigned_to.iter().map(String::as_str) {
            if !seen.insert(person) {
                continue;
            }
            let days = load.entry(person).or_insert_with(|| {
                people.push(person);
                BTreeMap::new()
            });
            for day in iter_days(task.start_date, task.end_date) {
                days.entry(day).or_default().push(task.wbs.as_str());
            }
        }
    }

    let mut out = Vec::new();
    for person in people {
        for (date, codes) in &load[person] {
            if codes.len() >= threshold {
                out.push(Overallocation {
                    person: person.to_string(),
                    date: *date,
                    codes: codes.iter().map(|c| c.to_string()).collect(),
                });
            }
        }
    }
    out
}

/// Load band for one calendar cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Load {
    Free,
    Light,
    Busy,
    Overloaded,
}

impl Load {
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => Load::Free,
            1 => Load::Light,
            2 => Load::Busy,
            _ => Load::Overloaded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayLoad {
    pub date: NaiveDate,
    pub codes: Vec<String>,
    pub load: Load,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerLoad {
    pub person: String,
    pub days: Vec<DayLoad>,
}

/// Per-worker task counts for the first `days` days of the project.
///
/// Rows follow the project roster, so people assigned to tasks but missing
/// from `project.workers` do not appear. A range running past the last
/// representable date is refused before any row is built.
pub fn workload_calendar(project: &Project, tasks: &[Task], days: usize) -> Result<Vec<WorkerLoad>, DateOutOfRange> {
    let span = i64::try_from(days).map_err(|_| DateOutOfRange { date: project.start_date, days: i64::MAX })?;
    if span > 0 {
        add_days(project.start_date, span - 1)?;
    }
    let dates = (0..span).map(|i| add_days(project.start_date, i)).collect::<Result<Vec<NaiveDate>, _>>()?;
    Ok(project
        .workers
        .iter()
        .map(|person| WorkerLoad {
            person: person.clone(),
            days: dates
                .iter()
                .map(|&date| {
                    let codes: Vec<String> = tasks
                        .iter()
                        .filter(|t| t.is_assigned_to(person) && t.spans(date))
                        .map(|t| t.wbs.clone())
                        .collect();
                    DayLoad { date, load: Load::from_count(codes.len()), codes }
                })
                .collect(),
        })
        .collect())
}
