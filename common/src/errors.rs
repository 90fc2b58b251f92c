//! Application error types.
//!
//! Every service returns `AppError`; it converts into an HTTP response
//! wrapped in the standard `ApiResponse` envelope.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::response::ApiResponse;

/// Result alias used across all services.
pub type AppResult<T> = Result<T, AppError>;

/// Service-wide error taxonomy.
#[derive(Debug, Error)]
pub enum AppError {
    /// Fewer identifiers remain in the pool than were requested.
    #[error("only {available} identifiers available, but {requested} requested")]
    PoolExhausted { available: usize, requested: usize },

    /// Lookup input is not a 1-3 digit identifier.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The record store could not be read or written.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// The store rejected a commit because an identifier is already assigned.
    #[error("identifier already assigned: {0}")]
    DuplicateIdentifier(String),

    /// Request body failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration could not be applied.
    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Error code exposed to clients.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::PoolExhausted { .. } => "POOL_EXHAUSTED",
            AppError::InvalidQuery(_) => "INVALID_QUERY",
            AppError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            AppError::DuplicateIdentifier(_) => "DUPLICATE_IDENTIFIER",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::PoolExhausted { .. } | AppError::DuplicateIdentifier(_) => {
                StatusCode::CONFLICT
            }
            AppError::InvalidQuery(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "请求处理失败");
        } else {
            tracing::warn!(code = self.code(), error = %self, "请求被拒绝");
        }

        let body = match &self {
            AppError::PoolExhausted {
                available,
                requested,
            } => ApiResponse::err_with_details(
                self.code(),
                self.to_string(),
                json!({ "available": available, "requested": requested }),
            ),
            _ => ApiResponse::err(self.code(), self.to_string()),
        };

        (status, Json(body)).into_response()
    }
}
