//! Client error types.
//!
//! Transport failures and non-success responses are folded into one
//! taxonomy so test bodies can turn any of them into a reportable payload
//! with [`ClientError::payload`].

use serde_json::Value;
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors raised by the HTTP client adapter and the auth bridge.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The resource server answered with a non-success status.
    #[error("API error: {status} - {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, parsed as JSON when possible.
        body: Value,
    },

    /// The identity provider rejected a token or userinfo request.
    #[error("identity provider error: {status} - {body}")]
    Identity {
        /// HTTP status code.
        status: u16,
        /// Response body, parsed as JSON when possible.
        body: Value,
    },

    /// No authenticated session could be established.
    #[error("authentication unavailable: {0}")]
    AuthUnavailable(String),

    /// Transport-level failure (connect, TLS, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded into the requested type.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An update or delete was attempted on a record without an identifier.
    #[error("record has no identifier")]
    MissingId,

    /// The configured base URL is not a valid absolute URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Builds an [`ClientError::Api`] from a status and raw response text.
    #[must_use]
    pub fn api(status: u16, text: &str) -> Self {
        Self::Api {
            status,
            body: parse_body(text),
        }
    }

    /// Builds an [`ClientError::Identity`] from a status and raw response text.
    #[must_use]
    pub fn identity(status: u16, text: &str) -> Self {
        Self::Identity {
            status,
            body: parse_body(text),
        }
    }

    /// Returns the HTTP status carried by this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Identity { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns whether the server reported the resource as absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns whether the server answered with a 4xx status.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }

    /// Normalizes the error into an inspectable payload.
    ///
    /// Errors that carry an HTTP response yield its body; everything else
    /// yields the error message.
    #[must_use]
    pub fn payload(&self) -> Value {
        match self {
            Self::Api { body, .. } | Self::Identity { body, .. } => body.clone(),
            other => Value::String(other.to_string()),
        }
    }
}

/// Parses a response body as JSON, falling back to a JSON string.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
