//! JSON error responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use callboard_core::Error;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use validator::ValidationErrors;

/// Result alias for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned by API handlers
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Option<String>,
}

/// Error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Stable error code
    pub code: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Unknown resource
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "NOT_FOUND",
            message: format!("{} not found", resource.into()),
            details: None,
        }
    }

    /// Rejected request input
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "VALIDATION_ERROR",
            message: message.into(),
            details: None,
        }
    }

    /// Failed fetch from the calls backend
    ///
    /// A timeout answers 504 and every other failure 502, including a batch
    /// the store refused to take.
    #[must_use]
    pub fn upstream(err: &Error) -> Self {
        let (status, code, message) = if matches!(err, Error::Timeout { .. }) {
            (
                StatusCode::GATEWAY_TIMEOUT,
                "UPSTREAM_TIMEOUT",
                "Calls backend did not answer in time",
            )
        } else {
            (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                "Calls backend request failed",
            )
        };

        Self {
            status,
            code,
            message: message.to_string(),
            details: Some(err.to_string()),
        }
    }

    /// HTTP status of the response
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Stable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self {
            details: Some(errors.to_string()),
            ..Self::bad_request("Invalid request parameters")
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let (status, code, message) = match &err {
            Error::NotFound { resource } => {
                return Self::not_found(resource.clone());
            }
            Error::Validation { .. } | Error::Configuration { .. } => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Request could not be processed",
            ),
            Error::Timeout { .. } => (
                StatusCode::GATEWAY_TIMEOUT,
                "UPSTREAM_TIMEOUT",
                "Calls backend did not answer in time",
            ),
            e if e.is_remote() => (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                "Calls backend request failed",
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error",
            ),
        };

        Self {
            status,
            code,
            message: message.to_string(),
            details: Some(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(code = self.code, details = ?self.details, "{}", self.message);
        } else {
            warn!(code = self.code, details = ?self.details, "{}", self.message);
        }

        let body = ErrorResponse {
            error: self.message,
            code: self.code.to_string(),
            details: self.details,
        };

        (self.status, Json(body)).into_response()
    }
}
