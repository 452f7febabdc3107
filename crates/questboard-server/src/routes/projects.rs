use axum::extract::{Path, State};
use axum::Json;
use questboard_core::project::{NewProject, ProjectPatch};
use questboard_core::task::TaskFilter;
use serde::Deserialize;

use crate::error::{ApiJson, AppError};
use crate::state::{AppState, ChangeKind};

#[derive(Deserialize)]
pub struct MemberBody {
    pub user_id: String,
}

/// GET /api/projects: newest start date first.
pub async fn list_projects(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let projects =
        tokio::task::spawn_blocking(move || questboard_core::project::list_projects(&store))
            .await
            .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::to_value(projects)?))
}

/// POST /api/projects
pub async fn create_project(
    State(app): State<AppState>,
    ApiJson(body): ApiJson<NewProject>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let project = tokio::task::spawn_blocking(move || {
        questboard_core::project::create_project(&store, body)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.notify(ChangeKind::Project);
    Ok(Json(serde_json::to_value(project)?))
}

/// GET /api/projects/:id
pub async fn get_project(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let project =
        tokio::task::spawn_blocking(move || questboard_core::project::get_project(&store, &id))
            .await
            .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::to_value(project)?))
}

/// PATCH /api/projects/:id
pub async fn update_project(
    State(app): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ProjectPatch>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let project = tokio::task::spawn_blocking(move || {
        questboard_core::project::update_project(&store, &id, body)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.notify(ChangeKind::Project);
    Ok(Json(serde_json::to_value(project)?))
}

/// DELETE /api/projects/:id: tasks that referenced it are detached, not deleted.
pub async fn delete_project(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let project_id = id.clone();
    let detached = tokio::task::spawn_blocking(move || {
        questboard_core::project::delete_project(&store, &project_id)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.notify(ChangeKind::Project);
    Ok(Json(serde_json::json!({
        "deleted": id,
        "detached_tasks": detached,
    })))
}

/// POST /api/projects/:id/members
pub async fn add_member(
    State(app): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<MemberBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let project = tokio::task::spawn_blocking(move || {
        questboard_core::project::add_member(&store, &id, &body.user_id)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.notify(ChangeKind::Project);
    Ok(Json(serde_json::to_value(project)?))
}

/// GET /api/projects/:id/tasks
pub async fn list_project_tasks(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let tasks = tokio::task::spawn_blocking(move || {
        questboard_core::project::get_project(&store, &id)?;
        let filter = TaskFilter {
            project: Some(id),
            assignee: None,
        };
        questboard_core::task::list_tasks(&store, &filter)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::to_value(tasks)?))
}
