//! Configuration management commands.

use std::path::Path;

use crate::cli::ConfigCommand;
use crate::output::{info, success};
use crate::{CliConfig, CliResult};

/// Runs a config command against the file at `path`.
pub fn run_config(cmd: ConfigCommand, config: &mut CliConfig, path: &Path) -> CliResult<()> {
    match cmd {
        ConfigCommand::Show => {
            show_config(config, path);
            Ok(())
        }
        ConfigCommand::Set { key, value } => {
            config.set(&key, &value)?;
            config.save_to(path)?;
            let shown = if key.contains("secret") { mask(&value) } else { value };
            success(&format!("Set {key} = {shown}"));
            Ok(())
        }
        ConfigCommand::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

/// Shows the current configuration.
fn show_config(config: &CliConfig, path: &Path) {
    info(&format!("Configuration file: {}", path.display()));
    println!();
    println!("server_url: {}", config.server_url);
    println!("keeps_path: {}", config.keeps_path);
    println!("timeout_secs: {}", config.timeout_secs);
    println!("accept_invalid_certs: {}", config.accept_invalid_certs);
    println!("output_format: {:?}", config.output_format);

    let Some(auth) = &config.auth else {
        println!("auth: (not configured)");
        return;
    };
    println!("auth:");
    let rows = [
        ("token_url", auth.token_url.clone()),
        ("userinfo_url", auth.userinfo_url.clone()),
        ("client_id", Some(auth.client_id.clone()).filter(|s| !s.is_empty())),
        ("client_secret", auth.client_secret.as_deref().map(mask)),
        ("username", auth.username.clone()),
        ("password", auth.password.as_deref().map(mask)),
        ("access_token", auth.access_token.as_deref().map(mask)),
        ("scope", auth.scope.clone()),
    ];
    for (key, value) in rows {
        if let Some(value) = value {
            println!("  {key}: {value}");
        }
    }
}

/// Masks a secret, keeping at most its first four characters.
fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}
