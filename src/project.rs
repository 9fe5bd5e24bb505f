//! Project metadata and naming.
//!
//! A `Project` carries the date window every task must fit into, the roster
//! of workers, and the intake-form details that were used to brief the plan
//! generator. Projects are stored under an identifier derived from their
//! display name by `sanitize_project_name`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EditRejection;
use crate::validate::parse_assignees;

/// Project metadata, persisted alongside the task collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub workers: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliverables: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approver_email: Option<String>,
}

/// Editable project settings.
#[derive(Debug, Clone)]
pub struct ProjectSettings {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Comma-separated roster, as typed.
    pub workers: String,
    pub description: String,
}

impl Project {
    pub fn new(name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Project {
            name: name.into(),
            start_date,
            end_date,
            workers: Vec::new(),
            description: String::new(),
            project_type: None,
            complexity: None,
            deliverables: None,
            constraints: None,
            category: None,
            approver_email: None,
        }
    }

    /// Storage identifier for this project.
    pub fn id(&self) -> String {
        sanitize_project_name(&self.name)
    }

    /// Whether `date` lies inside the project's inclusive date window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Check that `date` lies inside the project window.
    pub fn check_window(&self, date: NaiveDate) -> Result<(), EditRejection> {
        if self.contains(date) {
            Ok(())
        } else {
            Err(EditRejection::OutsideProjectWindow {
                date,
                window_start: self.start_date,
                window_end: self.end_date,
            })
        }
    }

    /// Apply edited settings, returning the updated project.
    ///
    /// Existing tasks are not moved when the window shrinks; `validate_tasks`
    /// reports any that now fall outside it.
    pub fn update_settings(&self, settings: ProjectSettings) -> Result<Project, EditRejection> {
        if settings.name.trim().is_empty() {
            return Err(EditRejection::BlankProjectName);
        }
        if settings.start_date >= settings.end_date {
            return Err(EditRejection::StartNotBeforeEnd {
                start: settings.start_date,
                end: settings.end_date,
            });
        }
        Ok(Project {
            name: settings.name,
            start_date: settings.start_date,
            end_date: settings.end_date,
            workers: parse_assignees(&settings.workers),
            description: settings.description,
            ..self.clone()
        })
    }
}

/// Convert a display name to a safe project name for file naming.
/// Converts to lowercase and replaces spaces with underscores.
pub fn sanitize_project_name(display_name: &str) -> String {
    display_name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}
