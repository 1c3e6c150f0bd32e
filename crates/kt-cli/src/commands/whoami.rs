//! `kt whoami`: resolve the authenticated user.

use serde::Serialize;
use serde_json::Value;

use super::Connection;
use crate::config::OutputFormat;
use crate::output::{output_single, success};
use crate::{CliError, CliResult};

#[derive(Serialize)]
struct WhoAmI<'a> {
    subject_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    profile: &'a Value,
}

/// Prints the user behind the configured credentials.
pub async fn run_whoami(conn: &Connection) -> CliResult<()> {
    if !conn.has_auth() {
        return Err(CliError::Auth(
            "no credentials configured; pass --token or set auth.token_url".to_string(),
        ));
    }

    let user = conn
        .auth_bridge()?
        .current_user()
        .await
        .map_err(|e| CliError::Auth(e.to_string()))?;

    if conn.format == OutputFormat::Table {
        success(&format!("Authenticated as {}", user.subject_id));
    }
    output_single(
        &WhoAmI {
            subject_id: &user.subject_id,
            name: user.name(),
            email: user.email(),
            profile: &user.profile,
        },
        conn.format,
    )
}
