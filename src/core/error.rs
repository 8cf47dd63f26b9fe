//! Application error type shared by both HTTP surfaces.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid server name")]
    InvalidServerName,

    #[error("Invalid datapack directory name")]
    InvalidDatapackDir,

    #[error("Validation failed")]
    Validation(Vec<String>),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Docker Engine / proxy failure. The detail is logged server-side only;
    /// clients get a generic message.
    #[error("Docker operation failed")]
    Docker(String),

    /// A downstream service (docker-proxy, Engine endpoint) is unreachable.
    #[error("Service temporarily unavailable")]
    Unavailable(String),

    #[error("Internal Server Error")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::InvalidServerName | AppError::InvalidDatapackDir => {
                (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() }))
            }
            AppError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation failed", "details": details }),
            ),
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" }))
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::Docker(detail) => {
                tracing::error!("Docker operation failed: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Docker operation failed" }),
                )
            }
            AppError::Unavailable(service) => {
                tracing::warn!("{service} unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({ "error": "Service temporarily unavailable" }),
                )
            }
            AppError::Io(err) => {
                tracing::error!("Filesystem error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal Server Error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
