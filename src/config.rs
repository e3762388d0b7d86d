//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.netsheet.toml` files.

use crate::cli::OutputFormat;
use crate::models::ReportMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".netsheet.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Activity sheet source.
    #[serde(default)]
    pub source: SourceConfig,

    /// Names of the date columns in the sheet.
    #[serde(default)]
    pub columns: ColumnsConfig,

    /// Persisted weekly table.
    #[serde(default)]
    pub table: TableConfig,

    /// Report output settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Report mode.
    #[serde(default)]
    pub mode: ReportMode,

    /// Year used for week labels. Defaults to the current year.
    #[serde(default)]
    pub year: Option<i32>,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Activity sheet source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Local workbook or CSV file.
    #[serde(default = "default_source_path")]
    pub path: String,

    /// Remote CSV export. Takes precedence over `path` when set.
    /// Usually supplied through `NETSHEET_SOURCE_URL` rather than stored here.
    #[serde(default)]
    pub url: Option<String>,

    /// Sheet name inside a workbook.
    #[serde(default = "default_sheet")]
    pub sheet: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Retries after a failed fetch.
    #[serde(default)]
    pub retries: usize,

    /// Skip TLS certificate verification for the remote source.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: default_source_path(),
            url: None,
            sheet: default_sheet(),
            timeout_seconds: default_timeout(),
            retries: 0,
            accept_invalid_certs: false,
        }
    }
}

fn default_source_path() -> String {
    "Network_List.xlsx".to_string()
}

fn default_sheet() -> String {
    "Lista".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Header names of the three date columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnsConfig {
    #[serde(default = "default_last_contact")]
    pub last_contact: String,

    #[serde(default = "default_last_planned_meeting")]
    pub last_planned_meeting: String,

    #[serde(default = "default_last_held_meeting")]
    pub last_held_meeting: String,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            last_contact: default_last_contact(),
            last_planned_meeting: default_last_planned_meeting(),
            last_held_meeting: default_last_held_meeting(),
        }
    }
}

fn default_last_contact() -> String {
    "Senaste kontakt".to_string()
}

fn default_last_planned_meeting() -> String {
    "Senaste inbokade möte".to_string()
}

fn default_last_held_meeting() -> String {
    "Senaste möte".to_string()
}

/// Persisted table settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// Path of the weekly table CSV.
    #[serde(default = "default_table_path")]
    pub path: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            path: default_table_path(),
        }
    }
}

fn default_table_path() -> String {
    "weekly_report.csv".to_string()
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Report file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Optional standalone SVG chart path.
    #[serde(default)]
    pub chart: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            format: OutputFormat::default(),
            chart: None,
        }
    }
}

fn default_output() -> String {
    "weekly_report.html".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(mode) = args.mode {
            self.general.mode = mode;
        }
        if args.year.is_some() {
            self.general.year = args.year;
        }
        if args.verbose {
            self.general.verbose = true;
        }

        // A path on the command line replaces any configured URL, and vice versa.
        if let Some(ref source) = args.source {
            if source.starts_with("http://") || source.starts_with("https://") {
                self.source.url = Some(source.clone());
            } else {
                self.source.url = None;
                self.source.path = source.clone();
            }
        } else if let Some(ref url) = args.source_url {
            self.source.url = Some(url.clone());
        }
        if let Some(ref sheet) = args.sheet {
            self.source.sheet = sheet.clone();
        }
        if let Some(timeout) = args.timeout {
            self.source.timeout_seconds = timeout;
        }
        if let Some(retries) = args.retries {
            self.source.retries = retries;
        }
        if args.insecure {
            self.source.accept_invalid_certs = true;
        }

        if let Some(ref table) = args.table {
            self.table.path = table.display().to_string();
        }

        if let Some(ref output) = args.output {
            self.report.output = output.display().to_string();
        }
        if let Some(format) = args.format {
            self.report.format = format;
        }
        if let Some(ref chart) = args.chart {
            self.report.chart = Some(chart.display().to_string());
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::tests::make_args;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.mode, ReportMode::Accumulate);
        assert_eq!(config.source.sheet, "Lista");
        assert_eq!(config.source.timeout_seconds, 30);
        assert!(!config.source.accept_invalid_certs);
        assert_eq!(config.columns.last_contact, "Senaste kontakt");
        assert_eq!(config.table.path, "weekly_report.csv");
        assert_eq!(config.report.format, OutputFormat::Html);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
mode = "snapshot"
year = 2024

[source]
path = "contacts.csv"
retries = 2

[columns]
last_contact = "Last contact"

[report]
format = "markdown"
output = "report.md"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.mode, ReportMode::Snapshot);
        assert_eq!(config.general.year, Some(2024));
        assert_eq!(config.source.path, "contacts.csv");
        assert_eq!(config.source.sheet, "Lista");
        assert_eq!(config.source.retries, 2);
        assert_eq!(config.columns.last_contact, "Last contact");
        assert_eq!(config.columns.last_held_meeting, "Senaste möte");
        assert_eq!(config.report.format, OutputFormat::Markdown);
        assert_eq!(config.report.output, "report.md");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[source]"));
        assert!(toml_str.contains("[columns]"));
        assert!(toml_str.contains("[table]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.source.sheet, "Lista");
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        config.source.url = Some("https://example.com/old.csv".to_string());

        let mut args = make_args();
        args.source = Some("local.xlsx".into());
        args.mode = Some(ReportMode::Snapshot);
        args.insecure = true;
        args.year = Some(2023);
        config.merge_with_args(&args);

        assert_eq!(config.source.url, None);
        assert_eq!(config.source.path, "local.xlsx");
        assert_eq!(config.general.mode, ReportMode::Snapshot);
        assert_eq!(config.general.year, Some(2023));
        assert!(config.source.accept_invalid_certs);
        assert_eq!(config.table.path, "weekly_report.csv");
    }

    #[test]
    fn test_merge_env_url() {
        let mut config = Config::default();
        let mut args = make_args();
        args.source_url = Some("https://example.com/export.csv".to_string());
        config.merge_with_args(&args);
        assert_eq!(
            config.source.url.as_deref(),
            Some("https://example.com/export.csv")
        );
    }
}
