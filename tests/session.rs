use chrono::NaiveDate;
use tempfile::TempDir;

use wbs_planner::db::{save_plan, FileStore, ProjectStore};
use wbs_planner::error::{EditRejection, GenerateError};
use wbs_planner::fields::{FindingKind, Severity};
use wbs_planner::generate::{generate_plan, parse_plan_response, PlanGenerator};
use wbs_planner::project::Project;
use wbs_planner::task::{NewTask, Task, TaskId};
use wbs_planner::workload::analyze;

const REPLY: &str = r#"```json
{"tasks": [
  {"id": "task-1", "wbs": "9.9", "name": "Plan", "duration": 5,
   "startDate": "2025-03-01", "endDate": "2025-03-06",
   "assignedTo": ["Alex"], "dependencies": [], "parentId": null},
  {"id": "task-2", "wbs": "9.9", "name": "Permits", "duration": 3,
   "startDate": "2025-03-01", "endDate": "2025-03-04",
   "assignedTo": ["Alex"], "dependencies": [], "parentId": "task-1"},
  {"id": "task-3", "wbs": "9.9", "name": "Site prep", "duration": 2,
   "startDate": "2025-03-05", "endDate": "2025-03-07",
   "assignedTo": [],
   "dependencies": [{"predecessorId": "task-2", "type": "FS", "lag": 1}],
   "parentId": "task-1"},
  {"id": "task-4", "wbs": "9.9", "name": "Build", "duration": 10,
   "startDate": "2025-03-06", "endDate": "2025-03-16",
   "assignedTo": ["Sam"],
   "dependencies": [{"predecessorId": "task-1", "type": "FS", "lag": 0}],
   "parentId": null},
  {"id": "task-5", "wbs": "9.9", "name": "Inspect", "duration": 2,
   "startDate": "2025-03-07", "endDate": "2025-03-09",
   "assignedTo": ["Sam"],
   "dependencies": [{"predecessorId": "task-3", "type": "FS", "lag": 0}],
   "parentId": "task-4"}
]}
```"#;

struct Replay(&'static str);

impl PlanGenerator for Replay {
    fn generate(&self, _project: &Project) -> Result<Vec<Task>, GenerateError> {
        parse_plan_response(self.0)
    }
}

fn d(m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, day).unwrap()
}

fn brief() -> Project {
    let mut p = Project::new("Garage Build", d(3, 1), d(5, 31));
    p.workers = vec!["Alex".into(), "Sam".into()];
    p
}

fn codes(tasks: &[Task]) -> Vec<(&str, &str)> {
    tasks.iter().map(|t| (t.id.as_str(), t.wbs.as_str())).collect()
}

#[test]
fn test_import_edit_analyze_save_load() {
    let plan = generate_plan(&Replay(REPLY), &brief()).unwrap();
    assert_eq!(
        codes(&plan.tasks),
        vec![("task-1", "1.0"), ("task-2", "1.1"), ("task-3", "1.2"), ("task-4", "2.0"), ("task-5", "2.1")]
    );

    // Permits slips two days; site prep and the inspection follow.
    let plan = plan.set_end_date(&"task-2".into(), d(3, 6)).unwrap();
    let site = plan.get(&"task-3".into()).unwrap();
    assert_eq!((site.start_date, site.end_date), (d(3, 7), d(3, 9)));
    let inspect = plan.get(&"task-5".into()).unwrap();
    assert_eq!((inspect.start_date, inspect.end_date), (d(3, 9), d(3, 11)));

    // A rejected edit leaves the plan it was applied to alone.
    let before = plan.clone();
    assert!(matches!(
        plan.set_start_date(&"task-5".into(), d(2, 1)),
        Err(EditRejection::OutsideProjectWindow { .. })
    ));
    assert_eq!(plan, before);

    let findings = analyze(&plan.tasks);
    let summary: Vec<(FindingKind, Option<&str>)> = findings
        .iter()
        .map(|f| (f.kind, f.task_id.as_ref().map(TaskId::as_str)))
        .collect();
    assert_eq!(
        summary,
        vec![(FindingKind::OrphanDependency, Some("task-2")), (FindingKind::Unassigned, Some("task-3"))]
    );
    assert!(findings.iter().all(|f| f.severity != Severity::Alert));

    let (plan, punch) = plan
        .add_task(NewTask::new("Punch list", 2, d(3, 12)).under("task-4".into()).assigned(vec!["Sam".into()]))
        .unwrap();
    assert_eq!(plan.get(&punch).unwrap().wbs, "2.2");
    assert!(plan.is_expanded(&"task-4".into()));

    let plan = plan.promote(&punch).unwrap();
    assert_eq!(plan.get(&punch).unwrap().wbs, "3.0");

    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());
    let id = save_plan(&store, &plan).unwrap();
    assert_eq!(id, "garage_build");
    assert_eq!(store.list().unwrap(), vec!["garage_build"]);

    let loaded = store.load(&id).unwrap().unwrap().into_plan().unwrap();
    assert_eq!(loaded, plan);
}

#[test]
fn test_failed_generation_leaves_nothing_behind() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());
    let err = generate_plan(&Replay("I could not produce a plan."), &brief()).unwrap_err();
    assert!(matches!(err, GenerateError::Json(_)));
    assert!(store.list().unwrap().is_empty());
}
