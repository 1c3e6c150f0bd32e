//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::OutputFormat;

/// Keeps API tester - contract tests for the Keeps REST resource.
#[derive(Debug, Parser)]
#[command(name = "kt")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to ~/.keeps-tester/kt.toml).
    #[arg(long, env = "KT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Server URL (overrides config).
    #[arg(short, long, env = "KT_SERVER_URL")]
    pub server: Option<String>,

    /// Keeps resource path (overrides config).
    #[arg(long, env = "KT_KEEPS_PATH")]
    pub keeps_path: Option<String>,

    /// Bearer token issued out of band (overrides configured auth).
    #[arg(long, env = "KT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Username for the password grant (overrides config).
    #[arg(short, long, env = "KT_USERNAME")]
    pub username: Option<String>,

    /// Password for the password grant (prompted when missing).
    #[arg(long, env = "KT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Accept invalid TLS certificates (local development servers).
    #[arg(long)]
    pub insecure: bool,

    /// Output format (overrides config).
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the keeps suite.
    Run(RunArgs),

    /// List the registered test cases.
    List,

    /// Show the authenticated user.
    Whoami,

    /// Check that the keeps resource is reachable.
    Status,

    /// Configuration management.
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Arguments for `kt run`.
#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Only run tests whose name contains this text (case-insensitive).
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Exit with status 1 when any test fails or errors.
    #[arg(long)]
    pub strict: bool,
}

/// Configuration commands.
#[derive(Debug, Clone, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,

    /// Set a configuration value.
    Set {
        /// Configuration key.
        key: String,
        /// Configuration value.
        value: String,
    },

    /// Print the configuration file path.
    Path,
}
