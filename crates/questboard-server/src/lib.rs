pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, patch, post};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(root: PathBuf) -> anyhow::Result<Router> {
    let app_state = state::AppState::new(root)?;
    Ok(router_with_state(app_state))
}

pub fn router_with_state(app_state: state::AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(routes::health::health))
        // Events (SSE)
        .route("/api/events", get(routes::events::sse_events))
        // Users
        .route(
            "/api/users",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route("/api/users/{id}", get(routes::users::get_user))
        .route("/api/users/{id}/summary", get(routes::users::get_summary))
        .route(
            "/api/users/{id}/skills/unlock",
            post(routes::users::unlock_skill),
        )
        // Skills
        .route(
            "/api/skills",
            get(routes::skills::list_skills).post(routes::skills::create_skill),
        )
        .route("/api/skills/seed", post(routes::skills::seed_skills))
        .route("/api/skills/{id}", get(routes::skills::get_skill))
        // Projects
        .route(
            "/api/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/api/projects/{id}",
            get(routes::projects::get_project)
                .patch(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route(
            "/api/projects/{id}/members",
            post(routes::projects::add_member),
        )
        .route(
            "/api/projects/{id}/tasks",
            get(routes::projects::list_project_tasks),
        )
        // Tasks
        .route(
            "/api/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/api/tasks/{id}",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/api/tasks/{id}/assign", post(routes::tasks::assign_task))
        .route("/api/tasks/{id}/status", patch(routes::tasks::set_status))
        .route(
            "/api/tasks/{id}/complete",
            post(routes::tasks::complete_task),
        )
        // Leaderboard
        .route("/api/leaderboard", get(routes::leaderboard::get_leaderboard))
        .route(
            "/api/leaderboard/points",
            post(routes::leaderboard::add_points),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Start the questboard API server on `host:port`.
pub async fn serve(root: PathBuf, host: &str, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    serve_on(root, listener).await
}

/// Start the API server on a pre-bound listener.
///
/// Lets the caller read the actual port first when binding to port 0.
pub async fn serve_on(root: PathBuf, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let actual = listener.local_addr()?;
    let app = build_router(root)?;

    tracing::info!("questboard API listening on http://{actual}");

    axum::serve(listener, app).await?;
    Ok(())
}
