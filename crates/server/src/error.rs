use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chess_puzzler::{SelectError, SessionError};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// The puzzle cannot be played; the client should request another.
    #[error("{0}")]
    Unprocessable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<SelectError> for AppError {
    fn from(e: SelectError) -> Self {
        match e {
            SelectError::NotFound => AppError::NotFound("No puzzles available; try broader filters".to_string()),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::PuzzleUnusable(inner) => AppError::Unprocessable(inner.to_string()),
            SessionError::InternalConsistency { .. } => {
                tracing::error!("Corrupt puzzle data: {e}");
                AppError::Unprocessable(e.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        (status, Json(json!({ "detail": message }))).into_response()
    }
}
