//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::CellEdit;
use crate::error::ReportError;
use crate::models::ReportMode;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Netsheet - weekly networking-sheet reporting
///
/// Counts contacts made, meetings planned and meetings performed per ISO
/// week, keeps the highest value ever seen for each week, and renders the
/// result as a table and a grouped bar chart.
///
/// Examples:
///   netsheet --source Network_List.xlsx
///   netsheet --source export.csv --mode snapshot --format markdown -o report.md
///   NETSHEET_SOURCE_URL=https://... netsheet --chart weekly.svg
///   netsheet --set 12:contacts=4 --set 12:planned=
///   netsheet --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Activity sheet: a workbook, a CSV file or an http(s) CSV export URL
    #[arg(short, long, value_name = "PATH|URL")]
    pub source: Option<String>,

    /// Remote CSV export URL (kept out of shell history via the env var)
    #[arg(long, value_name = "URL", env = "NETSHEET_SOURCE_URL", hide_env_values = true)]
    pub source_url: Option<String>,

    /// Sheet name when reading a workbook
    #[arg(long, value_name = "NAME")]
    pub sheet: Option<String>,

    /// Persisted weekly table (CSV)
    #[arg(short, long, value_name = "FILE")]
    pub table: Option<PathBuf>,

    /// Report mode
    ///
    /// snapshot: weeks 1-52, inactive weeks hidden, nothing persisted.
    /// accumulate: weeks 1-53, max-merged with the persisted table.
    #[arg(long, value_name = "MODE")]
    pub mode: Option<ReportMode>,

    /// Year used for the Start/End week labels (default: current year)
    #[arg(long, value_name = "YEAR")]
    pub year: Option<i32>,

    /// Edit a count cell before saving, e.g. 12:contacts=4 (empty value clears)
    ///
    /// Editable columns: contacts, planned, performed. May be repeated.
    #[arg(long = "set", value_name = "WEEK:METRIC=VALUE")]
    pub set: Vec<String>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (html, markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Also write the bar chart as a standalone SVG file
    #[arg(long, value_name = "FILE")]
    pub chart: Option<PathBuf>,

    /// Request timeout in seconds for remote sources
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Retries after a failed remote fetch
    #[arg(long, value_name = "COUNT")]
    pub retries: Option<usize>,

    /// Accept invalid TLS certificates from the remote source (unsafe)
    #[arg(long)]
    pub insecure: bool,

    /// Build and render the report without writing the persisted table
    #[arg(long)]
    pub dry_run: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .netsheet.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .netsheet.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Two-pane HTML page with table and chart (default)
    #[default]
    Html,
    /// Markdown format
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parse the `--set` edits.
    pub fn edits(&self) -> Result<Vec<CellEdit>, ReportError> {
        self.set.iter().map(|s| s.parse()).collect()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        for url in [self.source.as_deref(), self.source_url.as_deref()]
            .into_iter()
            .flatten()
        {
            if url.contains("://") && !url.starts_with("http://") && !url.starts_with("https://")
            {
                return Err("Source URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(year) = self.year {
            if !(1..=9999).contains(&year) {
                return Err("Year must be between 1 and 9999".to_string());
            }
        }

        self.edits().map_err(|e| e.to_string())?;

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
