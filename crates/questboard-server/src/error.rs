use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use questboard_core::QuestError;
use serde::de::DeserializeOwned;

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(QuestError::Validation(msg.into()).into())
    }
}

fn status_for(e: &QuestError) -> StatusCode {
    match e {
        QuestError::NotInitialized => StatusCode::BAD_REQUEST,
        QuestError::UserNotFound(_)
        | QuestError::TaskNotFound(_)
        | QuestError::SkillNotFound(_)
        | QuestError::ProjectNotFound(_) => StatusCode::NOT_FOUND,
        QuestError::UserExists(_)
        | QuestError::SkillExists(_)
        | QuestError::AlreadyCompleted(_)
        | QuestError::AlreadyUnlocked(_) => StatusCode::CONFLICT,
        QuestError::InsufficientPoints { .. } | QuestError::DependencyNotMet { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        QuestError::Validation(_) => StatusCode::BAD_REQUEST,
        QuestError::WorkspaceBusy(_) => StatusCode::SERVICE_UNAVAILABLE,
        QuestError::Store(_) | QuestError::Io(_) | QuestError::Yaml(_) | QuestError::Json(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if let Some(e) = self.0.downcast_ref::<QuestError>() {
            status_for(e)
        } else if let Some(rejection) = self.0.downcast_ref::<JsonRejection>() {
            rejection.status()
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        if status.is_server_error() {
            tracing::error!("request failed: {:#}", self.0);
        }

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// ---------------------------------------------------------------------------
// ApiJson: JSON body extractor whose rejections use the error body shape
// ---------------------------------------------------------------------------

/// Drop-in for `axum::Json` on request bodies. Malformed or mistyped bodies
/// come back as `{"error": ...}` with axum's status code.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
