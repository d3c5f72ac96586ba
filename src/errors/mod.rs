//! Error handling module for the BizDesk backend.
//!
//! Every failure a handler can produce is an [`AppError`]. Converting it into a
//! response yields the `{ "error": ..., "details"?: ... }` envelope and the
//! matching HTTP status, so failures never escape the route boundary raw.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Missing or blank required input
    Validation(String),
    /// Request body could not be decoded
    BadRequest(String),
    /// Credentials missing, wrong or expired
    Unauthorized(String),
    /// Authenticated but the role lacks the permission
    Forbidden(String),
    /// Resource not found
    NotFound(String),
    /// Uniqueness violation the caller can fix (e.g. a PIN already in use)
    Conflict(String),
    /// Database error, message already sanitized
    Database(String),
    /// Internal server error
    Internal(String),
    /// A store failure attributed to a route operation
    Failed { error: String, details: String },
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) | AppError::Failed { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::Database(msg)
            | AppError::Internal(msg) => msg.clone(),
            AppError::Failed { error, .. } => error.clone(),
        }
    }

    /// Attribute a server-side failure to the operation that hit it.
    ///
    /// Client errors pass through untouched; database and internal failures
    /// become `Failed to <verb> <noun>` with their sanitized message kept as
    /// details.
    pub fn failed_to(self, verb: &str, noun: &str) -> Self {
        match self {
            AppError::Database(details) | AppError::Internal(details) => AppError::Failed {
                error: format!("Failed to {} {}", verb, noun),
                details,
            },
            other => other,
        }
    }

    fn into_body(self) -> ErrorResponse {
        match self {
            AppError::Failed { error, details } => ErrorResponse {
                error,
                details: Some(details),
            },
            AppError::BadRequest(details) => ErrorResponse {
                error: "Invalid request body".to_string(),
                details: Some(details),
            },
            AppError::Database(details) | AppError::Internal(details) => ErrorResponse {
                error: "Internal server error".to_string(),
                details: Some(details),
            },
            other => ErrorResponse {
                error: other.message(),
                details: None,
            },
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Failed { error, details } => write!(f, "{}: {}", error, details),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        let safe = match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => "unique constraint violated",
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                "foreign key constraint violated"
            }
            sqlx::Error::Database(_) => "database rejected the operation",
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => "database unavailable",
            sqlx::Error::Io(_) => "database I/O failure",
            _ => "database error",
        };
        AppError::Database(safe.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        AppError::BadRequest(rejection.body_text())
    }
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), "{}", self);
        }
        (status, Json(self.into_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Database("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_failed_to_wraps_server_errors_only() {
        let wrapped = AppError::Database("database unavailable".into()).failed_to("create", "customer");
        match wrapped {
            AppError::Failed { error, details } => {
                assert_eq!(error, "Failed to create customer");
                assert_eq!(details, "database unavailable");
            }
            other => panic!("unexpected {:?}", other),
        }

        let untouched = AppError::NotFound("Customer not found".into()).failed_to("fetch", "customer");
        assert!(matches!(untouched, AppError::NotFound(_)));
    }

    #[test]
    fn test_not_found_body_has_no_details() {
        let body = AppError::NotFound("Invoice not found".into()).into_body();
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Invoice not found" }));
    }

    #[test]
    fn test_server_failures_always_carry_details() {
        let body = AppError::Internal("boom".into()).into_body();
        assert_eq!(body.details.as_deref(), Some("boom"));
    }
}
