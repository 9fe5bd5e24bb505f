//! Boundary with the external plan-generation and assistant services.
//!
//! The engine only needs two things from the outside: an initial task list for
//! a project brief, and free-text answers to questions about a plan. Both are
//! expressed as traits; this module also renders the requests and parses the
//! generator's reply. A failure here never touches an existing plan.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::GenerateError;
use crate::plan::Plan;
use crate::project::Project;
use crate::task::Task;
use crate::wbs::renumber;

/// Fewest and most tasks the generator is asked for.
pub const TASK_RANGE: (usize, usize) = (15, 25);

/// Produces an initial task list for a project brief.
pub trait PlanGenerator {
    fn generate(&self, project: &Project) -> Result<Vec<Task>, GenerateError>;
}

/// Answers free-text questions about a plan.
pub trait Assistant {
    fn ask(&self, question: &str, project: &Project, task_count: usize) -> Result<String, GenerateError>;
}

#[derive(Debug, Deserialize)]
struct GeneratedPlan {
    tasks: Vec<Task>,
}

fn or_blank(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

/// Render the plan-generation request for a project brief.
pub fn generation_prompt(project: &Project) -> String {
    format!(
        r#"You are a professional project manager. Generate a detailed project plan in JSON format.

Project Details:
- Name: {name}
- Type: {kind}
- Complexity: {complexity}
- Duration: {start} to {end}
- Deliverables: {deliverables}
- Description: {description}
- Constraints: {constraints}
- Team: {team}

Create a comprehensive Work Breakdown Structure (WBS) with:
1. Major phases (numbered 1.0, 2.0, etc.)
2. Sub-phases and detailed tasks (1.1, 1.1.1, etc.)
3. Realistic durations in days
4. Logical Finish-to-Start dependencies
5. Resource assignments from the team

Return ONLY valid JSON (no markdown, no backticks) in this exact structure:
{{
  "tasks": [
    {{
      "id": "task-1",
      "wbs": "1.0",
      "name": "Phase Name",
      "duration": 10,
      "startDate": "{start}",
      "endDate": "{start}",
      "assignedTo": ["Worker Name"],
      "dependencies": [],
      "parentId": null
    }},
    {{
      "id": "task-2",
      "wbs": "1.1",
      "name": "Sub-task Name",
      "duration": 5,
      "startDate": "{start}",
      "endDate": "{start}",
      "assignedTo": ["Worker Name"],
      "dependencies": [{{"predecessorId": "task-1", "type": "FS", "lag": 0}}],
      "parentId": "task-1"
    }}
  ]
}}

Generate {min}-{max} tasks with proper hierarchy."#,
        name = project.name,
        kind = or_blank(&project.project_type),
        complexity = or_blank(&project.complexity),
        start = project.start_date,
        end = project.end_date,
        deliverables = or_blank(&project.deliverables),
        description = project.description,
        constraints = or_blank(&project.constraints),
        team = project.workers.join(", "),
        min = TASK_RANGE.0,
        max = TASK_RANGE.1,
    )
}

/// Render an assistant question with a short project summary.
pub fn assistant_prompt(question: &str, project: &Project, task_count: usize) -> String {
    format!(
        "You are a friendly project assistant. Help with this question about the project:\n\n\
         Project: {}\nType: {}\nDuration: {} to {}\nTotal Tasks: {}\n\n\
         Question: {}\n\nProvide a helpful, concise answer.",
        project.name,
        or_blank(&project.project_type),
        project.start_date,
        project.end_date,
        task_count,
        question.trim()
    )
}

/// Remove markdown code fences the generator sometimes wraps its JSON in.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json\n", "")
        .replace("```json", "")
        .replace("```\n", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Pull the plan text out of a service envelope.
///
/// Accepts `{"content": [{"text": ...}]}`, `{"text": ...}`, a bare JSON
/// string, or the plan object itself.
fn plan_text(value: Value) -> Result<String, GenerateError> {
    if let Some(text) = envelope_text(&value) {
        return Ok(text);
    }
    match value {
        Value::Object(ref map) if map.contains_key("tasks") => Ok(value.to_string()),
        _ => Err(GenerateError::UnexpectedResponse),
    }
}

fn envelope_text(value: &Value) -> Option<String> {
    value
        .pointer("/content/0/text")
        .or_else(|| value.get("text"))
        .and_then(Value::as_str)
        .or_else(|| value.as_str())
        .map(str::to_string)
}

/// Pull the answer out of an assistant reply: a service envelope, a JSON
/// string, or plain text.
pub fn parse_answer(raw: &str) -> Result<String, GenerateError> {
    let raw = raw.trim();
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => envelope_text(&value)
            .map(|text| text.trim().to_string())
            .ok_or(GenerateError::UnexpectedResponse),
        Err(_) if !raw.is_empty() => Ok(raw.to_string()),
        Err(_) => Err(GenerateError::UnexpectedResponse),
    }
}

/// Parse a generator reply into its task list.
pub fn parse_plan_response(raw: &str) -> Result<Vec<Task>, GenerateError> {
    let envelope: Value = serde_json::from_str(&strip_code_fences(raw))?;
    let text = strip_code_fences(&plan_text(envelope)?);
    let plan: GeneratedPlan = serde_json::from_str(&text)?;
    debug!(tasks = plan.tasks.len(), "parsed generated plan");
    Ok(plan.tasks)
}

/// Ask `generator` for a plan and build a numbered, structurally valid `Plan`.
pub fn generate_plan(generator: &dyn PlanGenerator, project: &Project) -> Result<Plan, GenerateError> {
    let tasks = generator.generate(project)?;
    let plan = Plan::new(project.clone(), renumber(&tasks))?;
    info!(project = %project.name, tasks = plan.tasks.len(), "generated plan");
    Ok(plan)
}

/// Ask `assistant` a question about `plan`.
pub fn ask_about(assistant: &dyn Assistant, question: &str, plan: &Plan) -> Result<String, GenerateError> {
    assistant.ask(question, &plan.project, plan.tasks.len())
}

/// A generator or assistant that replays a reply previously saved to disk.
#[derive(Debug, Clone)]
pub struct SavedResponse {
    pub path: PathBuf,
}

impl SavedResponse {
    fn read(&self) -> Result<String, GenerateError> {
        fs::read_to_string(&self.path).map_err(|e| GenerateError::Service(format!("{}: {}", self.path.display(), e)))
    }
}

impl PlanGenerator for SavedResponse {
    fn generate(&self, _project: &Project) -> Result<Vec<Task>, GenerateError> {
        parse_plan_response(&self.read()?)
    }
}

impl Assistant for SavedResponse {
    fn ask(&self, question: &str, _project: &Project, _task_count: usize) -> Result<String, GenerateError> {
        debug!(question, path = %self.path.display(), "replaying saved answer");
        parse_answer(&self.read()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    const PLAN: &str = r#"{"tasks": [
        {"id": "task-1", "wbs": "1.0", "name": "Phase", "duration": 10,
         "startDate": "2025-03-01", "endDate": "2025-03-11",
         "assignedTo": ["Alex"], "dependencies": [], "parentId": null},
        {"id": "task-2", "wbs": "1.1", "name": "Step", "duration": 5,
         "startDate": "2025-03-01", "endDate": "2025-03-06",
         "assignedTo": ["Sam"],
         "dependencies": [{"predecessorId": "task-1", "type": "FS", "lag": 0}],
         "parentId": "task-1"}
    ]}"#;

    struct Fixed(String);

    impl PlanGenerator for Fixed {
        fn generate(&self, _project: &Project) -> Result<Vec<Task>, GenerateError> {
            parse_plan_response(&self.0)
        }
    }

    struct Echo;

    impl Assistant for Echo {
        fn ask(&self, question: &str, project: &Project, task_count: usize) -> Result<String, GenerateError> {
            Ok(format!("{} / {} / {}", question, project.name, task_count))
        }
    }

    #[test]
    fn test_parse_bare_plan() {
        let tasks = parse_plan_response(PLAN).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].parent_id, Some("task-1".into()));
    }

    #[test]
    fn test_parse_fenced_plan() {
        let fenced = format!("```json\n{}\n```", PLAN);
        assert_eq!(parse_plan_response(&fenced).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_envelopes() {
        let content = serde_json::json!({ "content": [{ "type": "text", "text": format!("```json\n{}```", PLAN) }] });
        assert_eq!(parse_plan_response(&content.to_string()).unwrap().len(), 2);

        let text = serde_json::json!({ "text": PLAN });
        assert_eq!(parse_plan_response(&text.to_string()).unwrap().len(), 2);

        let bare = serde_json::Value::String(PLAN.to_string());
        assert_eq!(parse_plan_response(&bare.to_string()).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_failures() {
        assert!(matches!(parse_plan_response("not json"), Err(GenerateError::Json(_))));
        assert!(matches!(parse_plan_response("[1, 2]"), Err(GenerateError::UnexpectedResponse)));
        assert!(matches!(
            parse_plan_response(r#"{"text": "{\"tasks\": 3}"}"#),
            Err(GenerateError::Json(_))
        ));
    }

    #[test]
    fn test_generate_plan_numbers_tasks() {
        let plan = generate_plan(&Fixed(PLAN.to_string()), &project()).unwrap();
        assert_eq!(plan.tasks[0].wbs, "1.0");
        assert_eq!(plan.tasks[1].wbs, "1.1");
    }

    #[test]
    fn test_generate_plan_rejects_inconsistent_links() {
        let broken = PLAN.replace(r#""parentId": "task-1""#, r#""parentId": "task-9""#);
        assert!(matches!(
            generate_plan(&Fixed(broken), &project()),
            Err(GenerateError::Invalid(_))
        ));
    }

    #[test]
    fn test_saved_response() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("reply.json");
        std::fs::write(&path, PLAN).unwrap();
        let plan = generate_plan(&SavedResponse { path }, &project()).unwrap();
        assert_eq!(plan.tasks.len(), 2);

        let missing = SavedResponse { path: dir.path().join("nope.json") };
        assert!(matches!(missing.generate(&project()), Err(GenerateError::Service(_))));
    }

    #[test]
    fn test_saved_answer() {
        let dir = tempfile::TempDir::new().unwrap();
        let plan = sample_plan();

        let path = dir.path().join("answer.json");
        std::fs::write(&path, r#"{"content": [{"type": "text", "text": " Roof is on the critical path. "}]}"#).unwrap();
        let answer = ask_about(&SavedResponse { path }, "What is late?", &plan).unwrap();
        assert_eq!(answer, "Roof is on the critical path.");

        let path = dir.path().join("answer.txt");
        std::fs::write(&path, "Nothing is late.\n").unwrap();
        assert_eq!(ask_about(&SavedResponse { path }, "What is late?", &plan).unwrap(), "Nothing is late.");

        assert!(matches!(parse_answer("[1, 2]"), Err(GenerateError::UnexpectedResponse)));
        assert!(matches!(parse_answer("  "), Err(GenerateError::UnexpectedResponse)));
    }

    #[test]
    fn test_prompts() {
        let mut p = project();
        p.project_type = Some("Construction".into());
        let prompt = generation_prompt(&p);
        assert!(prompt.contains("- Name: Cabin"));
        assert!(prompt.contains("- Type: Construction"));
        assert!(prompt.contains("- Duration: 2025-03-01 to 2025-06-30"));
        assert!(prompt.contains("- Team: Alex, Sam"));
        assert!(prompt.contains("Generate 15-25 tasks"));

        let question = assistant_prompt(" What is late? ", &p, 6);
        assert!(question.contains("Total Tasks: 6"));
        assert!(question.contains("Question: What is late?"));

        assert_eq!(ask_about(&Echo, "Why?", &sample_plan()).unwrap(), "Why? / Cabin / 6");
    }
}
