//! CLI error types.

use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Client error.
    #[error(transparent)]
    Client(#[from] kt_client::ClientError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Strict run with cases that did not pass.
    #[error("{failed} test(s) failed, {errored} test(s) errored")]
    TestsFailed {
        /// Number of failed cases.
        failed: usize,
        /// Number of errored cases.
        errored: usize,
    },
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
