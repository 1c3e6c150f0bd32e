//! Output formatting utilities.

use colored::Colorize;
use kt_harness::{CaseReport, SuiteObserver, SuiteReport, TestInfo, TestState};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::config::OutputFormat;
use crate::CliResult;

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints a warning message.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Outputs rows in the specified format.
pub fn output<T: Tabled + Serialize>(data: &[T], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Table => {
            if data.is_empty() {
                info("No results found.");
            } else {
                let table = Table::new(data).with(Style::rounded()).to_string();
                println!("{table}");
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data)?;
            println!("{json}");
        }
        OutputFormat::Quiet => {}
    }
    Ok(())
}

/// Outputs a single item.
pub fn output_single<T: Serialize>(item: &T, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Table => {
            let json = serde_json::to_value(item)?;
            print_value(&json, 0);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(item)?;
            println!("{json}");
        }
        OutputFormat::Quiet => {}
    }
    Ok(())
}

/// Prints a JSON value as indented `key: value` lines.
fn print_value(value: &serde_json::Value, indent: usize) {
    let prefix = "  ".repeat(indent);

    match value {
        serde_json::Value::Array(arr) => {
            for item in arr {
                print!("{prefix}- ");
                print_value(item, indent + 1);
            }
        }
        serde_json::Value::Object(map) => {
            for (key, val) in map {
                if val.is_object() || val.is_array() {
                    println!("{prefix}{key}:");
                    print_value(val, indent + 1);
                } else {
                    println!("{prefix}{key}: {}", scalar(val));
                }
            }
        }
        other => println!("{prefix}{}", scalar(other)),
    }
}

fn scalar(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Prompts for password input (hidden).
pub fn prompt_password(prompt: &str) -> CliResult<String> {
    Ok(rpassword::prompt_password(prompt)?)
}

fn state_label(state: TestState) -> String {
    match state {
        TestState::Passed => "PASS".green().bold().to_string(),
        TestState::Failed => "FAIL".red().bold().to_string(),
        TestState::Errored => "ERROR".magenta().bold().to_string(),
        TestState::Pending | TestState::Running => format!("{state:?}").to_uppercase(),
    }
}

/// Prints case progress as the suite runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProgressObserver;

impl SuiteObserver for ProgressObserver {
    fn on_test_start(&self, info: &TestInfo) {
        println!("{} {}", "▶".cyan(), info.name);
    }

    fn on_test_finish(&self, report: &CaseReport) {
        println!(
            "  {} {} {}",
            state_label(report.state),
            report.outcome.summary(),
            format!("({}ms)", report.duration_ms).dimmed()
        );
    }
}

/// One row of the run report table.
#[derive(Debug, Tabled, Serialize)]
pub struct ResultRow {
    /// Test name.
    #[tabled(rename = "Test")]
    pub name: String,
    /// Terminal state.
    #[tabled(rename = "Result")]
    pub result: String,
    /// Outcome summary.
    #[tabled(rename = "Message")]
    pub message: String,
    /// Duration in milliseconds.
    #[tabled(rename = "ms")]
    pub duration_ms: u64,
}

impl From<&CaseReport> for ResultRow {
    fn from(report: &CaseReport) -> Self {
        Self {
            name: report.info.name.clone(),
            result: state_label(report.state),
            message: report.outcome.summary(),
            duration_ms: report.duration_ms,
        }
    }
}

/// Prints a suite report.
pub fn print_report(report: &SuiteReport, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
            return Ok(());
        }
        OutputFormat::Table => {
            let rows: Vec<ResultRow> = report.results.iter().map(ResultRow::from).collect();
            println!();
            output(&rows, format)?;
        }
        OutputFormat::Quiet => {}
    }

    let summary = summary_line(report);
    if report.all_passed() {
        success(&summary);
    } else {
        error(&summary);
    }
    Ok(())
}

/// One-line run summary.
#[must_use]
pub fn summary_line(report: &SuiteReport) -> String {
    format!(
        "{}: {} passed, {} failed, {} errored in {}ms",
        report.suite,
        report.passed(),
        report.failed(),
        report.errored(),
        report.duration_ms
    )
}

/// One row of the test listing.
#[derive(Debug, Tabled, Serialize)]
pub struct TestRow {
    /// Test name.
    #[tabled(rename = "Test")]
    pub name: String,
    /// Path template.
    #[tabled(rename = "Path")]
    pub path: String,
    /// Expected response label.
    #[tabled(rename = "Expected")]
    pub expected: String,
    /// Request payload label.
    #[tabled(rename = "Payload")]
    pub payload: String,
}

impl From<&TestInfo> for TestRow {
    fn from(info: &TestInfo) -> Self {
        Self {
            name: info.name.clone(),
            path: info.path.clone(),
            expected: info.expected.clone(),
            payload: info.payload.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}
