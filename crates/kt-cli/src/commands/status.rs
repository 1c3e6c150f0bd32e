//! `kt status`: check that the keeps resource answers.

use kt_client::ResourceClient;
use serde_json::Value;

use super::Connection;
use crate::output::{error, info, success, warning};
use crate::CliResult;

/// Sends one GET to the keeps collection and reports reachability.
pub async fn run_status(conn: &Connection) -> CliResult<()> {
    let mut api = conn.api_client()?;
    let auth = conn.auth_bridge()?;
    if auth.is_configured() {
        if let Err(e) = auth.attach_token(&mut api).await {
            tracing::info!(error = %e, "status check continues unauthenticated");
            warning(&format!("Could not authenticate: {e}"));
        }
    }

    let keeps = ResourceClient::new(api, conn.keeps_path.as_str());
    info(&format!("Checking {}...", keeps.collection_url()));

    let result = keeps.get::<Value>(None).await;
    tracing::debug!(
        url = %keeps.collection_url(),
        status = ?result.as_ref().err().and_then(|e| e.status()),
        ok = result.is_ok(),
        "status check finished"
    );
    match result {
        Ok(body) => {
            success("Keeps resource is reachable");
            if let Some(records) = body.as_array() {
                println!("Keeps visible: {}", records.len());
            }
        }
        Err(e) if matches!(e.status(), Some(401 | 403)) => {
            success("Server is reachable");
            println!("Keeps: (requires authentication)");
        }
        Err(e) => error(&format!("Server is not reachable: {e}")),
    }

    Ok(())
}
