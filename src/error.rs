use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected page structure: {0}")]
    Unparseable(String),

    #[error("No such course: {0}")]
    CourseNotFound(String),

    #[error("Watch already exists")]
    DuplicateWatch,

    #[error("Bad request: {0}")]
    BadRequest(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::CourseNotFound(crn) => {
                (StatusCode::NOT_FOUND, format!("No such course: {}", crn))
            }
            AppError::DuplicateWatch => (StatusCode::CONFLICT, "Watch already exists".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unparseable(msg) => {
                error!("registration page changed shape: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "Registration page could not be read".to_string(),
                )
            }
            AppError::Transport(e) => {
                error!("registration lookup failed: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "Registration system unreachable".to_string(),
                )
            }
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}
