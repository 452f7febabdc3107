use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::error::{ApiJson, AppError};
use crate::state::{AppState, ChangeKind};

#[derive(Deserialize)]
pub struct CreateUserBody {
    pub name: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct UnlockBody {
    pub skill_id: String,
}

/// GET /api/users: all users, oldest first.
pub async fn list_users(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let users = tokio::task::spawn_blocking(move || questboard_core::user::list_users(&store))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::to_value(users)?))
}

/// POST /api/users: register a user.
pub async fn create_user(
    State(app): State<AppState>,
    ApiJson(body): ApiJson<CreateUserBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let user = tokio::task::spawn_blocking(move || {
        questboard_core::user::register_user(&store, &body.name, &body.email)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.notify(ChangeKind::User);
    Ok(Json(serde_json::to_value(user)?))
}

/// GET /api/users/:id
pub async fn get_user(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let user = tokio::task::spawn_blocking(move || questboard_core::user::get_user(&store, &id))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::to_value(user)?))
}

/// GET /api/users/:id/summary: XP, level progress, badges and skills.
pub async fn get_summary(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let summary = tokio::task::spawn_blocking(move || {
        questboard_core::user::get_user_xp_summary(&store, &id)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::to_value(summary)?))
}

/// POST /api/users/:id/skills/unlock: spend points on a skill.
pub async fn unlock_skill(
    State(app): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UnlockBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let policy = app.config.gamification.unlock_policy();
    let outcome = tokio::task::spawn_blocking(move || {
        questboard_core::unlock::unlock_skill(&store, &id, &body.skill_id, policy)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.notify(ChangeKind::User);
    Ok(Json(serde_json::json!({
        "message": format!("Skill '{}' unlocked", outcome.skill.name),
        "skill": outcome.skill,
        "points_remaining": outcome.points_remaining,
        "unlocked_skills": outcome.unlocked_skills,
    })))
}
