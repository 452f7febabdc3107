use axum::extract::{Path, Query, State};
use axum::Json;
use questboard_core::completion::StatusUpdate;
use questboard_core::task::{NewTask, TaskFilter, TaskPatch};
use questboard_core::types::TaskStatus;
use serde::Deserialize;

use crate::error::{ApiJson, AppError};
use crate::state::{AppState, ChangeKind};

#[derive(Deserialize)]
pub struct AssignBody {
    pub user_id: String,
}

#[derive(Deserialize)]
pub struct StatusBody {
    pub status: String,
    #[serde(default)]
    pub member_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CompleteBody {
    #[serde(default)]
    pub member_id: Option<String>,
}

/// GET /api/tasks?project=&assignee=
pub async fn list_tasks(
    State(app): State<AppState>,
    Query(filter): Query<TaskFilter>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let tasks =
        tokio::task::spawn_blocking(move || questboard_core::task::list_tasks(&store, &filter))
            .await
            .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::json!({
        "summary": questboard_core::task::summarize(&tasks),
        "tasks": tasks,
    })))
}

/// POST /api/tasks
pub async fn create_task(
    State(app): State<AppState>,
    ApiJson(body): ApiJson<NewTask>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let task =
        tokio::task::spawn_blocking(move || questboard_core::task::create_task(&store, body))
            .await
            .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.notify(ChangeKind::Task);
    Ok(Json(serde_json::to_value(task)?))
}

/// GET /api/tasks/:id
pub async fn get_task(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let task = tokio::task::spawn_blocking(move || questboard_core::task::get_task(&store, &id))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::to_value(task)?))
}

/// PATCH /api/tasks/:id: edit title, description, project, priority or due date.
pub async fn update_task(
    State(app): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<TaskPatch>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let task = tokio::task::spawn_blocking(move || {
        questboard_core::task::update_task(&store, &id, body)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.notify(ChangeKind::Task);
    Ok(Json(serde_json::to_value(task)?))
}

/// DELETE /api/tasks/:id
pub async fn delete_task(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let task_id = id.clone();
    tokio::task::spawn_blocking(move || questboard_core::task::delete_task(&store, &task_id))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.notify(ChangeKind::Task);
    Ok(Json(serde_json::json!({ "deleted": id })))
}

/// POST /api/tasks/:id/assign
pub async fn assign_task(
    State(app): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<AssignBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let task = tokio::task::spawn_blocking(move || {
        questboard_core::task::assign_task(&store, &id, &body.user_id)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.notify(ChangeKind::Task);
    Ok(Json(serde_json::to_value(task)?))
}

/// PATCH /api/tasks/:id/status: `completed` pays out XP like `/complete`.
pub async fn set_status(
    State(app): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<StatusBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let status: TaskStatus = body.status.parse()?;
    let store = app.store.clone();
    let now = app.config.gamification.now();
    let update = tokio::task::spawn_blocking(move || {
        questboard_core::completion::set_task_status(
            &store,
            &id,
            status,
            body.member_id.as_deref(),
            now,
        )
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.notify(ChangeKind::Task);
    if matches!(update, StatusUpdate::Completed { .. }) {
        app.notify(ChangeKind::Leaderboard);
    }
    Ok(Json(serde_json::to_value(update)?))
}

/// POST /api/tasks/:id/complete: complete the task and credit the member.
pub async fn complete_task(
    State(app): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<CompleteBody>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let member_id = body.and_then(|Json(b)| b.member_id);
    let store = app.store.clone();
    let now = app.config.gamification.now();
    let outcome = tokio::task::spawn_blocking(move || {
        questboard_core::completion::complete_task(&store, &id, member_id.as_deref(), now)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.notify(ChangeKind::Task);
    app.notify(ChangeKind::Leaderboard);
    Ok(Json(serde_json::json!({
        "message": format!("Task completed, {} XP earned", outcome.total_xp),
        "outcome": outcome,
    })))
}
