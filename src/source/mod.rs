//! Activity sheet sources.
//!
//! The sheet can come from a remote CSV export, a local CSV file or a local
//! workbook. Each is turned into a [`RawSheet`] and then into activity
//! records.

pub mod fetch;
pub mod records;
pub mod workbook;

use crate::config::{ColumnsConfig, SourceConfig};
use crate::error::ReportError;
use crate::models::ActivityRecord;
use crate::tabular;
pub use fetch::FetchOptions;
use records::{RawCell, RawSheet};
use std::fmt;
use std::path::PathBuf;
use tracing::info;

/// Where the activity sheet is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// CSV served over HTTP(S).
    Remote { url: String },
    /// A sheet inside a local workbook.
    Workbook { path: PathBuf, sheet: String },
    /// A local CSV file.
    Csv { path: PathBuf },
}

impl Source {
    /// Pick the source from configuration. A URL wins over a path.
    pub fn resolve(config: &SourceConfig) -> Result<Self, ReportError> {
        if let Some(url) = config.url.as_deref().filter(|u| !u.trim().is_empty()) {
            let url = url.trim();
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ReportError::SourceUnavailable(
                    "source URL must start with 'http://' or 'https://'".to_string(),
                ));
            }
            return Ok(Source::Remote {
                url: url.to_string(),
            });
        }

        let path = PathBuf::from(&config.path);
        if workbook::is_workbook(&path) {
            Ok(Source::Workbook {
                path,
                sheet: config.sheet.clone(),
            })
        } else {
            Ok(Source::Csv { path })
        }
    }

    /// Load the raw sheet.
    pub async fn load(&self, fetch: &FetchOptions) -> Result<RawSheet, ReportError> {
        match self {
            Source::Remote { url } => {
                let body = fetch::fetch_text(url, fetch).await?;
                Ok(sheet_from_csv(&body))
            }
            Source::Workbook { path, sheet } => workbook::read_sheet(path, sheet),
            Source::Csv { path } => {
                info!("Reading CSV from {}", path.display());
                let content = std::fs::read_to_string(path).map_err(|e| {
                    ReportError::SourceUnavailable(format!(
                        "failed to read {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Ok(sheet_from_csv(&content))
            }
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Remote { url } => write!(f, "{}", fetch::redact_url(url)),
            Source::Workbook { path, sheet } => write!(f, "{} [{}]", path.display(), sheet),
            Source::Csv { path } => write!(f, "{}", path.display()),
        }
    }
}

/// Parse CSV text into a raw sheet; empty fields become empty cells.
pub fn sheet_from_csv(content: &str) -> RawSheet {
    let table = tabular::parse_table(content);
    let rows = table
        .rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        RawCell::Empty
                    } else {
                        RawCell::Text(field)
                    }
                })
                .collect()
        })
        .collect();

    RawSheet {
        headers: table.headers,
        rows,
    }
}

/// Load the source and convert it to activity records.
pub async fn load_records(
    source: &Source,
    columns: &ColumnsConfig,
    fetch: &FetchOptions,
) -> Result<Vec<ActivityRecord>, ReportError> {
    let sheet = source.load(fetch).await?;
    let records = records::extract_records(&sheet, columns)?;
    info!("Read {} activity rows from {}", records.len(), source);
    Ok(records)
}
