use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use crate::config::ConfigError;
use crate::domain::models::user::UserField;

/// A field value the caller can correct. Never partially applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub field: UserField,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: UserField, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    Usage(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// True when the store rejected a write on a unique index.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            // 2067 = SQLite Unique Constraint
            // 23505 = PostgreSQL Unique Violation
            AppError::Database(e) => e
                .as_database_error()
                .and_then(|db_err| db_err.code())
                .is_some_and(|code| code == "2067" || code == "23505"),
            AppError::Conflict(_) => true,
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(_) if self.is_unique_violation() => {
                return (
                    StatusCode::CONFLICT,
                    Json(json!({ "error": "Resource already exists (duplicate entry)" }))
                ).into_response();
            }
            AppError::Database(e) => {
                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::Validation(v) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": v.message, "field": v.field }))
                ).into_response();
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Usage(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Failures that stop the service from coming up.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}
