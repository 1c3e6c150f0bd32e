//! # kt-cli
//!
//! Command-line runner for the Keeps API contract suite.
//!
//! This crate provides:
//! - Running the suite against a configured server (`kt run`)
//! - Listing the registered test cases (`kt list`)
//! - Identity and reachability checks (`kt whoami`, `kt status`)
//! - Configuration management (`kt config`)

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::Cli;
pub use config::CliConfig;
pub use error::{CliError, CliResult};
