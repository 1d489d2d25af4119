use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::domain::ports::RepositoryError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("ID Not Found")]
    NotFound,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid ID type for {0}")]
    InvalidIdType(&'static str),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid_id() -> Self {
        AppError::BadRequest("Invalid product ID".to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Storage(_)
            | AppError::InvalidIdType(_)
            | AppError::Config(_)
            | AppError::Database(_)
            | AppError::Mongo(_)
            | AppError::Io(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => AppError::NotFound,
            RepositoryError::InvalidIdType(backend) => AppError::InvalidIdType(backend),
            RepositoryError::InvalidInput(message) => AppError::BadRequest(message),
            RepositoryError::Storage(message) => AppError::Storage(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::InvalidIdType(backend) => {
                tracing::error!(backend = *backend, "id representation does not match the active backend");
            }
            _ if status.is_server_error() => tracing::error!(error = %self, "request failed"),
            _ => tracing::debug!(error = %self, "request rejected"),
        }

        let body = Json(json!({ "error": self.to_string() }));

        (status, body).into_response()
    }
}
