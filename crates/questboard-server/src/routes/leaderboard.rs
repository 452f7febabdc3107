use axum::extract::{Query, State};
use axum::Json;
use questboard_core::leaderboard::DEFAULT_LIMIT;
use serde::Deserialize;

use crate::error::{ApiJson, AppError};
use crate::state::{AppState, ChangeKind};

#[derive(Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct AddPointsBody {
    pub user_id: String,
    pub points: u64,
}

/// GET /api/leaderboard?limit=: top users by points.
pub async fn get_leaderboard(
    State(app): State<AppState>,
    Query(q): Query<LeaderboardQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let limit = q.limit.unwrap_or(DEFAULT_LIMIT);
    let entries = tokio::task::spawn_blocking(move || {
        questboard_core::leaderboard::leaderboard(&store, limit)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::to_value(entries)?))
}

/// POST /api/leaderboard/points: grant spendable points to a user.
pub async fn add_points(
    State(app): State<AppState>,
    ApiJson(body): ApiJson<AddPointsBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.store.clone();
    let user = tokio::task::spawn_blocking(move || {
        questboard_core::leaderboard::add_points(&store, &body.user_id, body.points)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.notify(ChangeKind::Leaderboard);
    Ok(Json(serde_json::json!({
        "user_id": user.id,
        "points": user.points,
    })))
}
