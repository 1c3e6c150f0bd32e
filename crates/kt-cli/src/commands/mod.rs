//! CLI command implementations.

mod config;
mod list;
mod run;
mod status;
mod whoami;

pub use config::run_config;
pub use list::run_list;
pub use run::run_suite;
pub use status::run_status;
pub use whoami::run_whoami;

use std::sync::Arc;

use kt_client::{
    ApiClient, AuthBridge, ClientOptions, Grant, IdentityProvider, OidcIdentityProvider,
    OidcSettings, StaticTokenProvider,
};

use crate::cli::Cli;
use crate::config::{AuthConfig, CliConfig, OutputFormat};
use crate::output::prompt_password;
use crate::{CliError, CliResult};

/// Connection settings resolved from the config file and command-line
/// overrides.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Server base URL.
    pub server_url: String,
    /// Keeps resource path.
    pub keeps_path: String,
    /// HTTP options.
    pub options: ClientOptions,
    /// Output format.
    pub format: OutputFormat,
    auth: Option<AuthSource>,
}

/// Where the bearer token comes from.
#[derive(Debug, Clone)]
enum AuthSource {
    Static {
        token: String,
        userinfo_url: Option<String>,
    },
    Oidc(OidcSettings),
}

impl Connection {
    /// Resolves connection settings. Flags win over the config file.
    ///
    /// A password grant without a password prompts for one when `prompt`
    /// is set.
    pub fn resolve(cli: &Cli, config: &CliConfig, prompt: bool) -> CliResult<Self> {
        let mut options = config.client_options();
        options.accept_invalid_certs |= cli.insecure;

        Ok(Self {
            server_url: cli
                .server
                .clone()
                .unwrap_or_else(|| config.server_url.clone()),
            keeps_path: cli
                .keeps_path
                .clone()
                .unwrap_or_else(|| config.keeps_path.clone()),
            options,
            format: cli.output.unwrap_or(config.output_format),
            auth: auth_source(cli, config.auth.as_ref(), prompt)?,
        })
    }

    /// Returns whether an identity source is configured.
    #[must_use]
    pub fn has_auth(&self) -> bool {
        self.auth.is_some()
    }

    /// Creates an HTTP client for the server. No token is attached.
    pub fn api_client(&self) -> CliResult<ApiClient> {
        Ok(ApiClient::new(&self.server_url, &self.options)?)
    }

    /// Creates the auth bridge for this connection.
    pub fn auth_bridge(&self) -> CliResult<AuthBridge> {
        let provider: Arc<dyn IdentityProvider> = match &self.auth {
            None => return Ok(AuthBridge::unauthenticated()),
            Some(AuthSource::Static {
                token,
                userinfo_url,
            }) => Arc::new(StaticTokenProvider::new(
                token.clone(),
                userinfo_url.clone(),
                &self.options,
            )?),
            Some(AuthSource::Oidc(settings)) => {
                Arc::new(OidcIdentityProvider::new(settings.clone(), &self.options)?)
            }
        };
        Ok(AuthBridge::new(provider))
    }
}

fn auth_source(cli: &Cli, auth: Option<&AuthConfig>, prompt: bool) -> CliResult<Option<AuthSource>> {
    let userinfo_url = auth.and_then(|a| a.userinfo_url.clone());

    if let Some(token) = cli
        .token
        .clone()
        .or_else(|| auth.and_then(|a| a.access_token.clone()))
    {
        return Ok(Some(AuthSource::Static {
            token,
            userinfo_url,
        }));
    }

    let Some(auth) = auth else {
        return Ok(None);
    };
    let Some(token_url) = auth.token_url.clone() else {
        return Ok(None);
    };
    if auth.client_id.is_empty() {
        return Err(CliError::Config(
            "auth.client_id is required when auth.token_url is set".to_string(),
        ));
    }

    let username = cli.username.clone().or_else(|| auth.username.clone());
    let grant = match username {
        Some(username) => {
            let password = match cli.password.clone().or_else(|| auth.password.clone()) {
                Some(password) => password,
                None if prompt => prompt_password(&format!("Password for {username}: "))?,
                None => {
                    return Err(CliError::Auth(format!(
                        "no password available for {username}"
                    )))
                }
            };
            Grant::Password { username, password }
        }
        None if auth.client_secret.is_some() => Grant::ClientCredentials,
        None => {
            return Err(CliError::Auth(
                "set auth.username for a password grant or auth.client_secret for client credentials"
                    .to_string(),
            ))
        }
    };

    Ok(Some(AuthSource::Oidc(OidcSettings {
        token_url,
        userinfo_url,
        client_id: auth.client_id.clone(),
        client_secret: auth.client_secret.clone(),
        scope: auth.scope.clone(),
        grant,
    })))
}
