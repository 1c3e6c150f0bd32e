//! Test cases: metadata plus an asynchronous body.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use kt_client::ClientResult;
use serde::Serialize;
use serde_json::Value;

use crate::outcome::{unexpected, TestOutcome};

/// Descriptive metadata for a test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestInfo {
    /// Test name.
    pub name: String,
    /// Path template exercised (e.g. `https://host/api/keeps/:id`).
    pub path: String,
    /// What the test checks.
    pub description: String,
    /// Label of the expected response shape (e.g. `Keep[]`).
    pub expected: String,
    /// Label of the request payload, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

impl TestInfo {
    /// Creates metadata with no payload label.
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        description: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            description: description.into(),
            expected: expected.into(),
            payload: None,
        }
    }

    /// Sets the payload label.
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }
}

/// Execution state of a test case.
///
/// `Pending -> Running -> {Passed, Failed, Errored}`; terminal states are
/// never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestState {
    /// Registered, not yet started.
    Pending,
    /// Body is executing.
    Running,
    /// Terminal: the contract held.
    Passed,
    /// Terminal: the contract did not hold.
    Failed,
    /// Terminal: an unanticipated error escaped the test logic.
    Errored,
}

impl TestState {
    /// Returns whether the state is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Passed | Self::Failed | Self::Errored)
    }
}

type Body<C> = Arc<dyn Fn(C) -> BoxFuture<'static, ClientResult<TestOutcome>> + Send + Sync>;

/// A named unit of work run against a context `C`.
///
/// The body should convert anticipated failures into
/// [`TestOutcome::Fail`] itself. A client error returned with `?` or a panic
/// inside the body is recorded as [`TestOutcome::Unexpected`].
pub struct TestCase<C> {
    info: TestInfo,
    body: Body<C>,
}

impl<C> Clone for TestCase<C> {
    fn clone(&self) -> Self {
        Self {
            info: self.info.clone(),
            body: Arc::clone(&self.body),
        }
    }
}

impl<C: Send + 'static> TestCase<C> {
    /// Creates a test case.
    pub fn new<F, Fut>(info: TestInfo, body: F) -> Self
    where
        F: Fn(C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<TestOutcome>> + Send + 'static,
    {
        Self {
            info,
            body: Arc::new(move |ctx| body(ctx).boxed()),
        }
    }

    /// Gets the metadata.
    #[must_use]
    pub fn info(&self) -> &TestInfo {
        &self.info
    }

    /// Runs the body once and returns its outcome.
    pub async fn execute(&self, ctx: C) -> TestOutcome {
        let expected = Value::String(self.info.expected.clone());
        let future = (self.body)(ctx);

        match AssertUnwindSafe(future).catch_unwind().await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(error)) => {
                tracing::warn!(test = %self.info.name, %error, "test body returned an error");
                unexpected(expected, error.payload())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::warn!(test = %self.info.name, %message, "test body panicked");
                unexpected(expected, Value::String(message))
            }
        }
    }
}

impl<C> std::fmt::Debug for TestCase<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCase").field("info", &self.info).finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "test body panicked".to_string()
    }
}
