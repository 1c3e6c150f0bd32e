//! CLI configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use kt_client::ClientOptions;
use serde::{Deserialize, Serialize};

use crate::{CliError, CliResult};

/// Keys accepted by `kt config set`.
pub const KNOWN_KEYS: &[&str] = &[
    "server_url",
    "keeps_path",
    "timeout_secs",
    "accept_invalid_certs",
    "output_format",
    "auth.token_url",
    "auth.userinfo_url",
    "auth.client_id",
    "auth.client_secret",
    "auth.username",
    "auth.scope",
];

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Server URL (e.g., https://localhost:5001).
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Path of the keeps resource on the server.
    #[serde(default = "default_keeps_path")]
    pub keeps_path: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Accept self-signed development certificates.
    #[serde(default)]
    pub accept_invalid_certs: bool,

    /// Output format.
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Authentication configuration.
    pub auth: Option<AuthConfig>,
}

fn default_server_url() -> String {
    "https://localhost:5001".to_string()
}

fn default_keeps_path() -> String {
    kt_keeps::KEEPS_PATH.to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            keeps_path: default_keeps_path(),
            timeout_secs: default_timeout_secs(),
            accept_invalid_certs: false,
            output_format: OutputFormat::default(),
            auth: None,
        }
    }
}

impl CliConfig {
    /// Loads configuration from the default file.
    pub fn load() -> CliResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Loads configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load_from(path: &Path) -> CliResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::parse(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> CliResult<Self> {
        toml::from_str(content).map_err(|e| CliError::Config(format!("failed to parse config: {e}")))
    }

    /// Saves configuration to the default file.
    pub fn save(&self) -> CliResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Saves configuration to `path`.
    pub fn save_to(&self, path: &Path) -> CliResult<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Gets the configuration file path.
    pub fn config_path() -> CliResult<PathBuf> {
        let home = dirs_next::home_dir()
            .ok_or_else(|| CliError::Config("could not determine home directory".to_string()))?;
        Ok(home.join(".keeps-tester").join("kt.toml"))
    }

    /// HTTP options derived from this configuration.
    #[must_use]
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            accept_invalid_certs: self.accept_invalid_certs,
        }
    }

    /// Sets one configuration value by key.
    ///
    /// `auth.*` keys create the auth section on demand. An empty value or
    /// `none` clears optional settings.
    pub fn set(&mut self, key: &str, value: &str) -> CliResult<()> {
        let optional = (!value.is_empty() && value != "none").then(|| value.to_string());

        match key {
            "server_url" | "server" => self.server_url = value.to_string(),
            "keeps_path" => self.keeps_path = value.to_string(),
            "timeout_secs" | "timeout" => {
                self.timeout_secs = value.parse().map_err(|_| {
                    CliError::InvalidArgument(format!("timeout must be a number of seconds: {value}"))
                })?;
            }
            "accept_invalid_certs" | "insecure" => {
                self.accept_invalid_certs = value.parse().map_err(|_| {
                    CliError::InvalidArgument(format!("expected true or false: {value}"))
                })?;
            }
            "output_format" | "output" => self.output_format = value.parse()?,
            "auth.token_url" => self.auth_mut().token_url = optional,
            "auth.userinfo_url" => self.auth_mut().userinfo_url = optional,
            "auth.client_id" => self.auth_mut().client_id = value.to_string(),
            "auth.client_secret" => self.auth_mut().client_secret = optional,
            "auth.username" => self.auth_mut().username = optional,
            "auth.scope" => self.auth_mut().scope = optional,
            _ => {
                return Err(CliError::InvalidArgument(format!(
                    "Unknown configuration key: {key}. Known keys: {}",
                    KNOWN_KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }

    fn auth_mut(&mut self) -> &mut AuthConfig {
        self.auth.get_or_insert_with(AuthConfig::default)
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
    /// Quiet (summary line only).
    Quiet,
}

impl std::str::FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "quiet" => Ok(Self::Quiet),
            _ => Err(CliError::InvalidArgument(format!(
                "Unknown output format: {s}. Supported: table, json, quiet"
            ))),
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// OAuth 2.0 token endpoint.
    pub token_url: Option<String>,
    /// OpenID Connect userinfo endpoint.
    pub userinfo_url: Option<String>,
    /// Client ID for authentication.
    #[serde(default)]
    pub client_id: String,
    /// Client secret (if confidential client).
    pub client_secret: Option<String>,
    /// Username for password grant.
    pub username: Option<String>,
    /// Password for password grant.
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Preissued access token.
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    /// Requested scope.
    pub scope: Option<String>,
}
