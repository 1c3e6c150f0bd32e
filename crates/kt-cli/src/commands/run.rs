//! `kt run`: execute the keeps suite.

use std::sync::Arc;

use kt_harness::{NoopObserver, SuiteObserver, TestFilter};
use kt_keeps::keeps_suite;

use super::Connection;
use crate::cli::RunArgs;
use crate::config::OutputFormat;
use crate::output::{info, print_report, warning, ProgressObserver};
use crate::{CliError, CliResult};

/// Runs the keeps suite and prints its report.
///
/// Failing cases are reported, not raised; with `--strict` a run that is
/// not all green returns `CliError::TestsFailed`.
pub async fn run_suite(args: RunArgs, conn: &Connection) -> CliResult<()> {
    tracing::debug!(
        server = %conn.server_url,
        path = %conn.keeps_path,
        filter = ?args.filter,
        "starting keeps run"
    );
    let api = conn.api_client()?;
    let auth = Arc::new(conn.auth_bridge()?);
    if !auth.is_configured() {
        warning("No authentication configured; identity-dependent tests will error.");
    }

    let suite = keeps_suite(api, &conn.keeps_path, auth).await;
    let filter = args
        .filter
        .as_deref()
        .map_or_else(TestFilter::all, TestFilter::name_contains);

    if !suite.tests().iter().any(|t| filter.matches(t.info())) {
        warning("No tests matched the filter.");
        return Ok(());
    }

    let observer: &dyn SuiteObserver = match conn.format {
        OutputFormat::Table => {
            info(&format!("Running {} against {}", suite.name(), conn.server_url));
            &ProgressObserver
        }
        OutputFormat::Json | OutputFormat::Quiet => &NoopObserver,
    };
    let report = suite.run_with(&filter, observer).await;
    tracing::info!(
        passed = report.passed(),
        failed = report.failed(),
        errored = report.errored(),
        "keeps run finished"
    );
    print_report(&report, conn.format)?;

    if args.strict && !report.all_passed() {
        return Err(CliError::TestsFailed {
            failed: report.failed(),
            errored: report.errored(),
        });
    }
    Ok(())
}
