use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use std::time::Duration;
use thiserror::Error as ThisError;
use tracing::error;

use crate::config::ConfigError;
use crate::service::password::PasswordError;
use crate::validation::ValidationError;

/// Message returned for both unknown usernames and wrong passwords.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "invalid credentials";

#[derive(Debug, ThisError)]
pub enum CatalogError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Malformed request body: {0}")]
    BadRequest(String),

    #[error("Username already exists")]
    DuplicateUser,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Database call exceeded {0:?}")]
    QueryTimeout(Duration),

    #[error("Password hashing error: {0}")]
    Hashing(#[from] PasswordError),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl CatalogError {
    pub fn is_unique_violation(&self) -> bool {
        match self {
            CatalogError::Database(SqlxError::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}

impl From<JsonRejection> for CatalogError {
    fn from(rejection: JsonRejection) -> Self {
        CatalogError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for CatalogError {
    fn from(rejection: PathRejection) -> Self {
        CatalogError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match &self {
            CatalogError::Validation(e) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            CatalogError::BadRequest(reason) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", reason.clone())
            }
            CatalogError::DuplicateUser => (
                StatusCode::BAD_REQUEST,
                "DUPLICATE_USER",
                "Username already exists.".to_string(),
            ),
            CatalogError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                INVALID_CREDENTIALS_MESSAGE.to_string(),
            ),
            CatalogError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Login required.".to_string(),
            ),
            CatalogError::NotFound => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Record not found.".to_string(),
            ),
            CatalogError::Database(_)
            | CatalogError::QueryTimeout(_)
            | CatalogError::Hashing(_)
            | CatalogError::Join(_)
            | CatalogError::Config(_) => {
                error!(error = %self, "request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred.".to_string(),
                )
            }
        };
        let body = ApiErrorResponse {
            error: ApiErrorBody {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
