use crate::error::{QuestError, Result};
use crate::project::Project;
use crate::store::{self, Document, DocumentReader, Store};
use crate::types::{Priority, TaskStatus};
use crate::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default, deserialize_with = "lenient_priority")]
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Member credited with the completion.
    #[serde(default)]
    pub completed_by: Option<String>,
}

/// Priority labels are case-insensitive; anything outside the known set
/// falls back to the default.
fn lenient_priority<'de, D>(d: D) -> std::result::Result<Priority, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw
        .as_deref()
        .map(Priority::from_label_or_default)
        .unwrap_or_default())
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: store::new_id(),
            title: title.into(),
            description: None,
            project: None,
            assigned_to: None,
            priority: Priority::default(),
            status: TaskStatus::Pending,
            due_date: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            completed_by: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }
}

impl Document for Task {
    const TABLE: store::DocTable = store::TASKS;

    fn id(&self) -> &str {
        &self.id
    }

    fn missing(id: &str) -> QuestError {
        QuestError::TaskNotFound(id.to_string())
    }
}

// ---------------------------------------------------------------------------
// Creation and queries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default, deserialize_with = "lenient_priority")]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Create a pending task. Referenced project and assignee must exist.
pub fn create_task(store: &Store, new: NewTask) -> Result<Task> {
    let title = new.title.trim();
    if title.is_empty() {
        return Err(QuestError::Validation("task title is required".into()));
    }
    store.write(|tx| {
        if let Some(project) = &new.project {
            tx.load::<Project>(project)?;
        }
        if let Some(user) = &new.assigned_to {
            tx.load::<User>(user)?;
        }
        let mut task = Task::new(title);
        task.description = new.description.clone();
        task.project = new.project.clone();
        task.assigned_to = new.assigned_to.clone();
        task.priority = new.priority;
        task.due_date = new.due_date;
        tx.put(&task)?;
        tracing::info!(task = %task.id, priority = %task.priority, "created task");
        Ok(task)
    })
}

pub fn get_task(store: &Store, id: &str) -> Result<Task> {
    store.read(|tx| tx.load(id))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.project
            .as_deref()
            .map_or(true, |p| task.project.as_deref() == Some(p))
            && self
                .assignee
                .as_deref()
                .map_or(true, |a| task.assigned_to.as_deref() == Some(a))
    }
}

/// Tasks matching `filter`, oldest first.
pub fn list_tasks(store: &Store, filter: &TaskFilter) -> Result<Vec<Task>> {
    let mut tasks: Vec<Task> = store.read(|tx| tx.list())?;
    tasks.retain(|t| filter.matches(t));
    tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    Ok(tasks)
}

pub fn delete_task(store: &Store, id: &str) -> Result<()> {
    store.write(|tx| {
        if tx.delete::<Task>(id)? {
            Ok(())
        } else {
            Err(QuestError::TaskNotFound(id.to_string()))
        }
    })
}

/// Reassign an open task to `user_id`.
pub fn assign_task(store: &Store, task_id: &str, user_id: &str) -> Result<Task> {
    store.write(|tx| {
        let mut task: Task = tx.load(task_id)?;
        if task.is_completed() {
            return Err(QuestError::AlreadyCompleted(task_id.to_string()));
        }
        tx.load::<User>(user_id)?;
        task.assigned_to = Some(user_id.to_string());
        tx.put(&task)?;
        Ok(task)
    })
}

/// Partial update for an open task. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default, deserialize_with = "lenient_priority_patch")]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

fn lenient_priority_patch<'de, D>(d: D) -> std::result::Result<Option<Priority>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw.as_deref().map(Priority::from_label_or_default))
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.project.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }
}

/// Apply `patch` to an open task. A new project must exist; completed tasks
/// are frozen.
pub fn update_task(store: &Store, id: &str, patch: TaskPatch) -> Result<Task> {
    let title = match patch.title.as_deref().map(str::trim) {
        Some("") => return Err(QuestError::Validation("task title is required".into())),
        other => other.map(str::to_string),
    };
    store.write(|tx| {
        let mut task: Task = tx.load(id)?;
        if task.is_completed() {
            return Err(QuestError::AlreadyCompleted(id.to_string()));
        }
        if let Some(project) = &patch.project {
            tx.load::<Project>(project)?;
            task.project = Some(project.clone());
        }
        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = &patch.description {
            task.description = Some(description.clone());
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(due) = patch.due_date {
            task.due_date = Some(due);
        }
        tx.put(&task)?;
        tracing::info!(task = %task.id, "updated task");
        Ok(task)
    })
}

/// Human-readable summary: "3/5 completed, 1 in progress, 1 testing"
pub fn summarize(tasks: &[Task]) -> String {
    let total = tasks.len();
    let count = |s: TaskStatus| tasks.iter().filter(|t| t.status == s).count();
    format!(
        "{}/{total} completed, {} in progress, {} testing",
        count(TaskStatus::Completed),
        count(TaskStatus::InProgress),
        count(TaskStatus::Testing),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
