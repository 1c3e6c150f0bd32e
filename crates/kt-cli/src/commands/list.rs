//! `kt list`: show the registered test cases.

use std::sync::Arc;

use kt_client::AuthBridge;
use kt_keeps::keeps_suite;

use super::Connection;
use crate::output::{output, TestRow};
use crate::CliResult;

/// Lists the keeps suite's test cases without contacting the server.
pub async fn run_list(conn: &Connection) -> CliResult<()> {
    let api = conn.api_client()?;
    let suite = keeps_suite(api, &conn.keeps_path, Arc::new(AuthBridge::unauthenticated())).await;

    let rows: Vec<TestRow> = suite.tests().iter().map(|t| TestRow::from(t.info())).collect();
    output(&rows, conn.format)
}
