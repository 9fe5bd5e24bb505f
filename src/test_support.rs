//! Fixtures shared by the unit tests.

use chrono::NaiveDate;

use crate::dates::add_days;
use crate::fields::Status;
use crate::plan::Plan;
use crate::project::Project;
use crate::task::{Dependency, Task, TaskId};

pub fn d(m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, day).unwrap()
}

pub fn task(id: &str, parent: Option<&str>, start: NaiveDate, duration: u32) -> Task {
    Task {
        id: id.into(),
        wbs: String::new(),
        name: format!("Task {id}"),
        duration,
        start_date: start,
        end_date: add_days(start, duration as i64).unwrap(),
        assigned_to: vec![],
        dependencies: vec![],
        parent_id: parent.map(TaskId::from),
        status: Status::NotStarted,
        notes: None,
    }
}

pub fn with_dep(mut t: Task, predecessor: &str, lag: u32) -> Task {
    t.dependencies.push(Dependency::finish_to_start(predecessor.into(), lag));
    t
}

pub fn assigned(mut t: Task, people: &[&str]) -> Task {
    t.assigned_to = people.iter().map(|p| p.to_string()).collect();
    t
}

pub fn project() -> Project {
    let mut p = Project::new("Cabin", d(3, 1), d(6, 30));
    p.workers = vec!["Alex".into(), "Sam".into()];
    p
}

/// Two phases with two children each, numbered and linked.
///
/// ```text
/// 1.0 design    3/1..3/11
///   1.1 survey    3/1..3/4
///   1.2 drawings  3/4..3/9   FS survey
/// 2.0 build     3/11..3/31   FS design
///   2.1 frame     3/11..3/18 FS drawings +2
///   2.2 roof      3/18..3/23 FS frame
/// ```
pub fn sample_plan() -> Plan {
    let tasks = vec![
        assigned(task("design", None, d(3, 1), 10), &["Alex"]),
        assigned(task("survey", Some("design"), d(3, 1), 3), &["Sam"]),
        assigned(with_dep(task("drawings", Some("design"), d(3, 4), 5), "survey", 0), &["Alex"]),
        with_dep(task("build", None, d(3, 11), 20), "design", 0),
        assigned(with_dep(task("frame", Some("build"), d(3, 11), 7), "drawings", 2), &["Sam"]),
        assigned(with_dep(task("roof", Some("build"), d(3, 18), 5), "frame", 0), &["Sam"]),
    ];
    Plan::new(project(), crate::wbs::renumber(&tasks)).unwrap()
}

pub fn wbs_of(plan: &Plan, id: &str) -> String {
    plan.get(&id.into()).map(|t| t.wbs.clone()).unwrap_or_default()
}
