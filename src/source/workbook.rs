//! Spreadsheet workbook reading.

use crate::error::ReportError;
use crate::source::records::{RawCell, RawSheet};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use tracing::{debug, info};

/// File extensions read as workbooks rather than CSV.
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Whether a path names a workbook file.
pub fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| WORKBOOK_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Read one sheet of a workbook. The first row is taken as the header.
pub fn read_sheet(path: &Path, sheet_name: &str) -> Result<RawSheet, ReportError> {
    info!("Reading sheet '{}' from {}", sheet_name, path.display());

    let mut workbook = open_workbook_auto(path).map_err(|e| {
        ReportError::SourceUnavailable(format!("failed to open {}: {}", path.display(), e))
    })?;

    let available = workbook.sheet_names().to_vec();
    if !available.iter().any(|s| s == sheet_name) {
        return Err(ReportError::SourceUnavailable(format!(
            "sheet '{}' not found in {} (available: {})",
            sheet_name,
            path.display(),
            available.join(", ")
        )));
    }

    let range = workbook.worksheet_range(sheet_name).map_err(|e| {
        ReportError::SourceUnavailable(format!("failed to read sheet '{}': {}", sheet_name, e))
    })?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|header| header.iter().map(header_text).collect())
        .unwrap_or_default();

    let rows: Vec<Vec<RawCell>> = rows
        .map(|row| row.iter().map(to_raw_cell).collect())
        .filter(|row: &Vec<RawCell>| row.iter().any(|c| *c != RawCell::Empty))
        .collect();

    debug!("Sheet '{}': {} columns, {} rows", sheet_name, headers.len(), rows.len());

    Ok(RawSheet { headers, rows })
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn to_raw_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Empty,
        Data::String(s) if s.trim().is_empty() => RawCell::Empty,
        Data::String(s) | Data::DateTimeIso(s) => RawCell::Text(s.clone()),
        Data::DateTime(dt) => RawCell::Serial(dt.as_f64()),
        Data::Float(f) => RawCell::Serial(*f),
        Data::Int(n) => RawCell::Serial(*n as f64),
        other => RawCell::Text(other.to_string()),
    }
}
