use crate::error::{QuestError, Result};
use crate::store::{self, Document, DocumentReader, Store};
use crate::task::Task;
use crate::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_date: DateTime<Utc>,
    /// User ids.
    #[serde(default)]
    pub members: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Document for Project {
    const TABLE: store::DocTable = store::PROJECTS;

    fn id(&self) -> &str {
        &self.id
    }

    fn missing(id: &str) -> QuestError {
        QuestError::ProjectNotFound(id.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Defaults to now.
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
}

pub fn create_project(store: &Store, new: NewProject) -> Result<Project> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(QuestError::Validation("project name is required".into()));
    }
    let now = Utc::now();
    let project = Project {
        id: store::new_id(),
        name: name.to_string(),
        description: new.description,
        start_date: new.start_date.unwrap_or(now),
        members: Vec::new(),
        created_at: now,
    };
    store.write(|tx| tx.put(&project))?;
    tracing::info!(project = %project.id, "created project");
    Ok(project)
}

pub fn get_project(store: &Store, id: &str) -> Result<Project> {
    store.read(|tx| tx.load(id))
}

/// All projects by start date, newest first.
pub fn list_projects(store: &Store) -> Result<Vec<Project>> {
    let mut projects: Vec<Project> = store.read(|tx| tx.list())?;
    projects.sort_by(|a, b| b.start_date.cmp(&a.start_date).then_with(|| a.id.cmp(&b.id)));
    Ok(projects)
}

/// Partial update for a project. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.start_date.is_none()
    }
}

pub fn update_project(store: &Store, id: &str, patch: ProjectPatch) -> Result<Project> {
    let name = match patch.name.as_deref().map(str::trim) {
        Some("") => return Err(QuestError::Validation("project name is required".into())),
        other => other.map(str::to_string),
    };
    store.write(|tx| {
        let mut project: Project = tx.load(id)?;
        if let Some(name) = name {
            project.name = name;
        }
        if let Some(description) = patch.description {
            project.description = description;
        }
        if let Some(start) = patch.start_date {
            project.start_date = start;
        }
        tx.put(&project)?;
        tracing::info!(project = %project.id, "updated project");
        Ok(project)
    })
}

/// Add `user_id` to the project's members. Adding an existing member is a no-op.
pub fn add_member(store: &Store, project_id: &str, user_id: &str) -> Result<Project> {
    store.write(|tx| {
        let mut project: Project = tx.load(project_id)?;
        tx.load::<User>(user_id)?;
        if !project.members.iter().any(|m| m == user_id) {
            project.members.push(user_id.to_string());
            tx.put(&project)?;
        }
        Ok(project)
    })
}

/// Delete a project. Its tasks are kept but no longer reference it.
///
/// Returns the number of tasks detached.
pub fn delete_project(store: &Store, id: &str) -> Result<usize> {
    store.write(|tx| {
        if !tx.delete::<Project>(id)? {
            return Err(QuestError::ProjectNotFound(id.to_string()));
        }
        let mut detached = 0;
        for mut task in tx.list::<Task>()? {
            if task.project.as_deref() == Some(id) {
                task.project = None;
                tx.put(&task)?;
                detached += 1;
            }
        }
        Ok(detached)
    })
}
