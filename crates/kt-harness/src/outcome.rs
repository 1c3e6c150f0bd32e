//! Test outcomes and the constructors test bodies report through.

use kt_client::ClientError;
use serde::Serialize;
use serde_json::Value;

/// Why a test failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The server broke the contract under test.
    Assertion,
    /// The environment lacks data the test needs; a setup gap, not a defect.
    Precondition,
}

/// Result of one test execution. Exactly one is produced per run of a case.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum TestOutcome {
    /// The contract held.
    Pass {
        /// Human-readable summary.
        message: String,
        /// Record(s) for inspection.
        payload: Value,
    },
    /// The contract did not hold.
    Fail {
        /// Human-readable explanation.
        message: String,
        /// Failure category.
        kind: FailureKind,
    },
    /// An error the test logic did not anticipate.
    Unexpected {
        /// What the test expected to receive.
        expected: Value,
        /// Normalized error payload.
        error: Value,
    },
}

impl TestOutcome {
    /// Returns the terminal state this outcome maps to.
    #[must_use]
    pub const fn state(&self) -> crate::TestState {
        match self {
            Self::Pass { .. } => crate::TestState::Passed,
            Self::Fail { .. } => crate::TestState::Failed,
            Self::Unexpected { .. } => crate::TestState::Errored,
        }
    }

    /// Returns whether the outcome is a pass.
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass { .. })
    }

    /// One-line summary for terminal output.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Pass { message, .. } | Self::Fail { message, .. } => message.clone(),
            Self::Unexpected { error, .. } => match error {
                Value::String(s) => format!("Unexpected error: {s}"),
                other => format!("Unexpected error: {other}"),
            },
        }
    }
}

/// Reports a pass.
pub fn pass(message: impl Into<String>, payload: Value) -> TestOutcome {
    TestOutcome::Pass {
        message: message.into(),
        payload,
    }
}

/// Reports a contract violation.
pub fn fail(message: impl Into<String>) -> TestOutcome {
    TestOutcome::Fail {
        message: message.into(),
        kind: FailureKind::Assertion,
    }
}

/// Reports a missing environment precondition.
pub fn precondition(message: impl Into<String>) -> TestOutcome {
    TestOutcome::Fail {
        message: message.into(),
        kind: FailureKind::Precondition,
    }
}

/// Reports an unanticipated error.
pub fn unexpected(expected: Value, error: Value) -> TestOutcome {
    TestOutcome::Unexpected { expected, error }
}

/// Normalizes a caught client error into a payload.
///
/// Errors carrying an HTTP response yield the response body; anything else
/// yields the error message.
#[must_use]
pub fn handle_error(error: &ClientError) -> Value {
    error.payload()
}
