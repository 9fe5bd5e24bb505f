//! Project persistence.
//!
//! A project is saved as one JSON record holding its metadata, its task
//! collection, a creation timestamp and the tree view's expanded set. The
//! `ProjectStore` trait is the seam; `FileStore` keeps one file per project
//! in a data directory and `MemoryStore` backs tests and dry runs.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{StoreError, ValidationError};
use crate::plan::Plan;
use crate::project::Project;
use crate::task::{Task, TaskId};

const CONFIG_FILE: &str = "config.json";
const BACKUP_DIR: &str = "backup";

/// The persisted shape of one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub metadata: Project,
    pub tasks: Vec<Task>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub expanded: Vec<TaskId>,
}

impl ProjectRecord {
    pub fn from_plan(plan: &Plan, created_at: DateTime<Utc>) -> Self {
        ProjectRecord {
            metadata: plan.project.clone(),
            tasks: plan.tasks.clone(),
            created_at,
            expanded: plan.expanded.iter().cloned().collect(),
        }
    }

    /// Rebuild the plan. Expanded ids that no longer name a task are dropped.
    pub fn into_plan(self) -> Result<Plan, ValidationError> {
        let mut plan = Plan::new(self.metadata, self.tasks)?;
        for id in self.expanded {
            if plan.get(&id).is_some() {
                plan.expand(&id);
            }
        }
        Ok(plan)
    }
}

/// Save/load project records by identifier.
pub trait ProjectStore {
    fn save(&self, project_id: &str, record: &ProjectRecord) -> Result<(), StoreError>;
    /// `Ok(None)` when no project is stored under `project_id`.
    fn load(&self, project_id: &str) -> Result<Option<ProjectRecord>, StoreError>;
    /// Stored project identifiers, sorted.
    fn list(&self) -> Result<Vec<String>, StoreError>;
}

/// One `<project_id>.json` file per project in `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, project_id: &str) -> PathBuf {
        self.dir.join(format!("{project_id}.json"))
    }

    /// Save a record that must not exist yet.
    pub fn create(&self, project_id: &str, record: &ProjectRecord) -> Result<(), StoreError> {
        if self.path_for(project_id).exists() {
            return Err(StoreError::AlreadyExists(project_id.to_string()));
        }
        self.save(project_id, record)
    }

    /// Delete a stored project. Missing projects are not an error.
    pub fn remove(&self, project_id: &str) -> Result<(), StoreError> {
        let path = self.path_for(project_id);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// The project whose file was written last.
    pub fn most_recent(&self) -> Result<Option<String>, StoreError> {
        let mut newest: Option<(std::time::SystemTime, String)> = None;
        for id in self.list()? {
            let modified = fs::metadata(self.path_for(&id))?.modified()?;
            if newest.as_ref().map_or(true, |(t, _)| modified > *t) {
                newest = Some((modified, id));
            }
        }
        Ok(newest.map(|(_, id)| id))
    }

    /// Copy the project's file into `backup/` under a timestamped name.
    pub fn backup(&self, project_id: &str) -> Result<PathBuf, StoreError> {
        let source = self.path_for(project_id);
        if !source.exists() {
            return Err(StoreError::NotFound(project_id.to_string()));
        }
        let backups = self.dir.join(BACKUP_DIR);
        fs::create_dir_all(&backups)?;
        let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let target = backups.join(format!("{stamp}_{project_id}.json"));
        fs::copy(&source, &target)?;
        info!(project = project_id, path = %target.display(), "backed up project");
        Ok(target)
    }
}

impl ProjectStore for FileStore {
    /// Atomic write via temp file + rename.
    fn save(&self, project_id: &str, record: &ProjectRecord) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(project_id);
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(record)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(&tmp, &path)?;
        debug!(project = project_id, tasks = record.tasks.len(), "saved project");
        Ok(())
    }

    fn load(&self, project_id: &str) -> Result<Option<ProjectRecord>, StoreError> {
        let path = self.path_for(project_id);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if path.file_name().and_then(|n| n.to_str()) == Some(CONFIG_FILE) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// Records kept in memory, serialized so a load never aliases a save.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RefCell<BTreeMap<String, String>>,
}

impl ProjectStore for MemoryStore {
    fn save(&self, project_id: &str, record: &ProjectRecord) -> Result<(), StoreError> {
        let data = serde_json::to_string(record)?;
        self.records.borrow_mut().insert(project_id.to_string(), data);
        Ok(())
    }

    fn load(&self, project_id: &str) -> Result<Option<ProjectRecord>, StoreError> {
        match self.records.borrow().get(project_id) {
            Some(data) => Ok(Some(serde_json::from_str(data)?)),
            None => Ok(None),
        }
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.records.borrow().keys().cloned().collect())
    }
}

/// Persist `plan` under its project id, keeping the original creation time
/// when the project was stored before.
pub fn save_plan(store: &dyn ProjectStore, plan: &Plan) -> Result<String, StoreError> {
    let id = plan.project.id();
    let created_at = store.load(&id)?.map_or_else(Utc::now, |r| r.created_at);
    store.save(&id, &ProjectRecord::from_plan(plan, created_at))?;
    info!(project = %id, tasks = plan.tasks.len(), "saved plan");
    Ok(id)
}
