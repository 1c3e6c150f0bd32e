//! # Keeps API tester
//!
//! Runs the Keeps contract suite against a live server.

#![forbid(unsafe_code)]
#![allow(clippy::uninlined_format_args)]

use clap::Parser;
use kt_cli::{
    cli::{Cli, Command},
    commands::{run_config, run_list, run_status, run_suite, run_whoami, Connection},
    config::CliConfig,
    output::error,
    CliResult,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "warn,kt_client=debug,kt_harness=debug,kt_keeps=debug,kt_cli=debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn dispatch(cli: Cli) -> CliResult<()> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => CliConfig::config_path()?,
    };
    let mut config = CliConfig::load_from(&config_path)?;

    match &cli.command {
        Command::Run(args) => {
            let conn = Connection::resolve(&cli, &config, true)?;
            run_suite(args.clone(), &conn).await
        }
        Command::List => {
            // Listing never authenticates.
            let mut offline = config.clone();
            offline.auth = None;
            run_list(&Connection::resolve(&cli, &offline, false)?).await
        }
        Command::Whoami => run_whoami(&Connection::resolve(&cli, &config, true)?).await,
        Command::Status => run_status(&Connection::resolve(&cli, &config, true)?).await,
        Command::Config(cmd) => run_config(cmd.clone(), &mut config, &config_path),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = dispatch(cli).await {
        error(&e.to_string());
        std::process::exit(1);
    }
}
