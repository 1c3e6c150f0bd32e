//! Suites: ordered collections of test cases sharing one context.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::case::{TestCase, TestInfo, TestState};
use crate::outcome::TestOutcome;

/// Receives progress events while a suite runs.
pub trait SuiteObserver: Send + Sync {
    /// A case moved from `Pending` to `Running`.
    fn on_test_start(&self, _info: &TestInfo) {}

    /// A case reached a terminal state.
    fn on_test_finish(&self, _report: &CaseReport) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SuiteObserver for NoopObserver {}

/// Selects which cases of a suite run.
#[derive(Debug, Clone, Default)]
pub struct TestFilter {
    name_contains: Option<String>,
}

impl TestFilter {
    /// Runs every case.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Runs cases whose name contains `text`, ignoring case.
    pub fn name_contains(text: impl Into<String>) -> Self {
        Self {
            name_contains: Some(text.into().to_lowercase()),
        }
    }

    /// Returns whether the case described by `info` is selected.
    #[must_use]
    pub fn matches(&self, info: &TestInfo) -> bool {
        match &self.name_contains {
            Some(needle) => info.name.to_lowercase().contains(needle),
            None => true,
        }
    }
}

/// Report for one executed case.
#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    /// Case metadata.
    pub info: TestInfo,
    /// Terminal state.
    pub state: TestState,
    /// Outcome produced by the body.
    pub outcome: TestOutcome,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Results of one pass over a suite.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    /// Suite name.
    pub suite: String,
    /// Base path shared by the suite's cases.
    pub base_path: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Case reports in execution order.
    pub results: Vec<CaseReport>,
}

impl SuiteReport {
    fn count(&self, state: TestState) -> usize {
        self.results.iter().filter(|r| r.state == state).count()
    }

    /// Number of passed cases.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(TestState::Passed)
    }

    /// Number of failed cases.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(TestState::Failed)
    }

    /// Number of errored cases.
    #[must_use]
    pub fn errored(&self) -> usize {
        self.count(TestState::Errored)
    }

    /// Returns whether every executed case passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.state == TestState::Passed)
    }

    /// Looks up a case report by test name.
    #[must_use]
    pub fn result(&self, name: &str) -> Option<&CaseReport> {
        self.results.iter().find(|r| r.info.name == name)
    }
}

/// A named collection of test cases sharing a base path and a context.
///
/// Cases are appended during construction and run sequentially in
/// registration order.
pub struct Suite<C> {
    name: String,
    base_path: String,
    context: C,
    cases: Vec<TestCase<C>>,
}

impl<C: Clone + Send + 'static> Suite<C> {
    /// Creates an empty suite.
    pub fn new(name: impl Into<String>, base_path: impl Into<String>, context: C) -> Self {
        Self {
            name: name.into(),
            base_path: base_path.into(),
            context,
            cases: Vec::new(),
        }
    }

    /// Appends one case.
    pub fn add_test(&mut self, case: TestCase<C>) -> &mut Self {
        self.cases.push(case);
        self
    }

    /// Appends several cases in order.
    pub fn add_tests(&mut self, cases: impl IntoIterator<Item = TestCase<C>>) -> &mut Self {
        self.cases.extend(cases);
        self
    }

    /// Suite name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base path shared by the cases.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Shared context handed to every case.
    #[must_use]
    pub fn context(&self) -> &C {
        &self.context
    }

    /// Registered cases in order.
    #[must_use]
    pub fn tests(&self) -> &[TestCase<C>] {
        &self.cases
    }

    /// Runs every case.
    pub async fn run(&self) -> SuiteReport {
        self.run_with(&TestFilter::all(), &NoopObserver).await
    }

    /// Runs the cases selected by `filter`, reporting progress to `observer`.
    pub async fn run_with(&self, filter: &TestFilter, observer: &dyn SuiteObserver) -> SuiteReport {
        let started_at = Utc::now();
        let start = Instant::now();
        let selected: Vec<&TestCase<C>> =
            self.cases.iter().filter(|c| filter.matches(c.info())).collect();

        tracing::info!(suite = %self.name, tests = selected.len(), "suite starting");

        let mut results = Vec::with_capacity(selected.len());
        for case in selected {
            let info = case.info();
            tracing::info!(suite = %self.name, test = %info.name, state = ?TestState::Running, "test starting");
            observer.on_test_start(info);

            let case_start = Instant::now();
            let outcome = case.execute(self.context.clone()).await;
            let state = outcome.state();
            let report = CaseReport {
                info: info.clone(),
                state,
                outcome,
                duration_ms: elapsed_ms(case_start),
            };

            tracing::info!(suite = %self.name, test = %info.name, ?state, "test finished");
            observer.on_test_finish(&report);
            results.push(report);
        }

        let report = SuiteReport {
            suite: self.name.clone(),
            base_path: self.base_path.clone(),
            started_at,
            duration_ms: elapsed_ms(start),
            results,
        };
        tracing::info!(
            suite = %self.name,
            passed = report.passed(),
            failed = report.failed(),
            errored = report.errored(),
            "suite finished"
        );
        report
    }
}

impl<C> std::fmt::Debug for Suite<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Suite")
            .field("name", &self.name)
            .field("base_path", &self.base_path)
            .field("cases", &self.cases.len())
            .finish()
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
