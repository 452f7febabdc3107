use axum::extract::{Path, State};
use axum::Json;
use questboard_core::skill::NewSkill;

use crate::error::{ApiJson, AppError};
use crate::state::{AppState, ChangeKind};

/// GET /api/skills: the skill tree, by branch then tier.
pub async fn list_skills(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let skills = tokio::task::spawn_blocking(move || questboard_core::skill::list_skills(&store))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::to_value(skills)?))
}

/// POST /api/skills: add a skill to the tree.
pub async fn create_skill(
    State(app): State<AppState>,
    ApiJson(body): ApiJson<NewSkill>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let skill =
        tokio::task::spawn_blocking(move || questboard_core::skill::create_skill(&store, body))
            .await
            .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.notify(ChangeKind::Skill);
    Ok(Json(serde_json::to_value(skill)?))
}

/// GET /api/skills/:id
pub async fn get_skill(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let skill = tokio::task::spawn_blocking(move || questboard_core::skill::get_skill(&store, &id))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::to_value(skill)?))
}

/// POST /api/skills/seed: insert the default perk skills that are missing.
pub async fn seed_skills(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let created =
        tokio::task::spawn_blocking(move || questboard_core::skill::seed_default_skills(&store))
            .await
            .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    if !created.is_empty() {
        app.notify(ChangeKind::Skill);
    }
    Ok(Json(serde_json::json!({
        "created": created.len(),
        "skills": created,
    })))
}
