//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use brandlens_core::{FieldViolation, ValidationError};

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// API error with HTTP status code.
///
/// Serialized under an `error` key:
/// `{"error": {"code", "message", "fields"?}}`.
#[derive(Debug, Clone, Serialize, Error)]
pub struct ApiError {
    /// HTTP status code
    #[serde(skip)]
    pub status: StatusCode,

    /// Stable error code for client handling
    pub code: String,

    /// Human-readable message
    pub message: String,

    /// Per-field violations, present for validation errors
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldViolation>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// 400 Bad Request carrying every collected field violation.
    pub fn validation(err: &ValidationError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "VALIDATION_ERROR".to_string(),
            message: err.to_string(),
            fields: err.violations.clone(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        let body = Json(serde_json::json!({ "error": self }));
        (status, body).into_response()
    }
}
