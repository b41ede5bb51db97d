//! Output formatting shared by all commands.
//!
//! Every command builds one serializable report. JSON output prints that
//! report as is; text output hands it to a command-specific printer.

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use pagecap_core::CaptureStatsSummary;
use serde::Serialize;

/// Output format selected with `--format`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default)
    Text,
    /// Pretty-printed JSON object
    Json,
}

/// Print `report` in `format`, using `text` for the text form.
pub fn emit<T: Serialize>(format: OutputFormat, report: &T, text: impl FnOnce(&T)) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report)?;
            println!("{json}");
        },
        OutputFormat::Text => text(report),
    }
    Ok(())
}

/// Colored yes/no.
pub fn yes_no(value: bool) -> String {
    if value {
        "yes".green().to_string()
    } else {
        "no".red().to_string()
    }
}

/// Log capture statistics; visible with `--verbose`.
pub fn log_stats(stats: &CaptureStatsSummary) {
    tracing::debug!(
        hits = stats.hits,
        fallbacks = stats.fallbacks,
        misses = stats.misses,
        builds = stats.builds,
        "Capture statistics"
    );
}
