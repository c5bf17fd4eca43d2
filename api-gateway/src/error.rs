//! Error handling for the API gateway

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::error::{Error, ErrorKind};
use serde::{Deserialize, Serialize};

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error information
    pub error: ErrorInfo,
}

/// Detailed error information
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Error code (string identifier for the error type)
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Common(#[from] Error),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Common(e) => {
                let code = match e {
                    Error::AccountNotFound(_) => "account_not_found",
                    Error::DuplicateAccountNumber(_) => "duplicate_account_number",
                    Error::AccountNotActive(_) => "account_not_active",
                    Error::InsufficientBalance(_) => "insufficient_balance",
                    Error::BalanceLimitExceeded(_) => "balance_limit_exceeded",
                    Error::ConcurrentModification(_) => "concurrent_modification",
                    Error::ValidationError(_) => "validation_error",
                    Error::ConfigurationError(_) => "configuration_error",
                    Error::Internal(_) => "internal_error",
                    Error::Database(_) => "database_error",
                    Error::Migration(_) => "migration_error",
                    Error::DecimalError(_) => "decimal_error",
                };
                let status = match e.kind() {
                    ErrorKind::NotFound => StatusCode::NOT_FOUND,
                    ErrorKind::Conflict => StatusCode::CONFLICT,
                    ErrorKind::Validation => StatusCode::BAD_REQUEST,
                    ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, code)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // The request span carries the x-request-id
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!("API Error: {:?}", &self);
        } else {
            tracing::warn!("API Error: {}", &self);
        }

        let details = match &self {
            ApiError::Common(Error::Database(e)) => Some(serde_json::json!({
                "code": e.as_database_error().and_then(|dbe| dbe.code().map(|c| c.to_string())),
            })),
            _ => None,
        };

        let error_response = ErrorResponse {
            error: ErrorInfo {
                code: code.to_string(),
                message: self.to_string(),
                details,
            },
        };

        (status, Json(error_response)).into_response()
    }
}
