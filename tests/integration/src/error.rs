//! Error responses of the mock server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors returned by mock handlers.
#[derive(Debug, Error)]
pub enum MockError {
    /// Record not found or not visible to the caller.
    #[error("{0} not found")]
    NotFound(String),

    /// Malformed request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No valid bearer token.
    #[error("Authentication required")]
    Unauthorized,

    /// Caller does not own the record.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Unknown client at the token endpoint.
    #[error("Invalid client credentials")]
    InvalidClient,

    /// Wrong username or password at the token endpoint.
    #[error("Invalid user credentials")]
    InvalidGrant,

    /// Grant type the mock identity provider does not issue.
    #[error("Unsupported grant type: {0}")]
    UnsupportedGrantType(String),

    /// Server-side failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MockError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::InvalidGrant | Self::UnsupportedGrantType(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized | Self::InvalidClient => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for response bodies.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::InvalidClient => "invalid_client",
            Self::InvalidGrant => "invalid_grant",
            Self::UnsupportedGrantType(_) => "unsupported_grant_type",
            Self::Internal(_) => "server_error",
        }
    }
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.error_code(),
            "error_description": self.to_string(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}

/// Result type for mock handlers.
pub type MockResult<T> = Result<T, MockError>;
