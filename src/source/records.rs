//! Conversion of raw sheet cells into activity records.

use crate::config::ColumnsConfig;
use crate::error::ReportError;
use crate::models::{ActivityRecord, Metric};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

/// Date formats accepted in text cells, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%m/%d/%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// A cell as read from the source, before date parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    /// Spreadsheet serial day number (days since 1899-12-30).
    Serial(f64),
}

/// Header plus rows of raw cells.
#[derive(Debug, Clone, Default)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

impl RawSheet {
    fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
    }
}

/// Parse a cell into a date.
///
/// Returns `Ok(None)` for empty cells and `Err(())` when the cell holds
/// something that is not a date.
pub fn parse_date(cell: &RawCell) -> Result<Option<NaiveDate>, ()> {
    match cell {
        RawCell::Empty => Ok(None),
        RawCell::Serial(days) => serial_to_date(*days).map(Some).ok_or(()),
        RawCell::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            parse_date_text(text).map(Some).ok_or(())
        }
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
        })
}

fn serial_to_date(days: f64) -> Option<NaiveDate> {
    if !days.is_finite() || days < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::try_days(days.floor() as i64)?)
}

fn column_name(columns: &ColumnsConfig, metric: Metric) -> &str {
    match metric {
        Metric::ContactsMade => columns.last_contact.as_str(),
        Metric::MeetingsPlanned => columns.last_planned_meeting.as_str(),
        Metric::MeetingsPerformed => columns.last_held_meeting.as_str(),
    }
}

/// Build activity records from a raw sheet.
///
/// A missing date column, or one whose non-empty cells all fail to parse, is
/// a schema error. Isolated unparseable cells are treated as empty.
pub fn extract_records(
    sheet: &RawSheet,
    columns: &ColumnsConfig,
) -> Result<Vec<ActivityRecord>, ReportError> {
    let mut dates: Vec<Vec<Option<NaiveDate>>> = Vec::with_capacity(Metric::ALL.len());

    for metric in Metric::ALL {
        let name = column_name(columns, metric);
        let idx = sheet.column_index(name).ok_or_else(|| {
            ReportError::Schema(format!(
                "missing column '{}' (found: {})",
                name,
                sheet.headers.join(", ")
            ))
        })?;

        let mut parsed = 0usize;
        let mut failed = 0usize;
        let mut column = Vec::with_capacity(sheet.rows.len());

        for (row_num, row) in sheet.rows.iter().enumerate() {
            let cell = row.get(idx).unwrap_or(&RawCell::Empty);
            match parse_date(cell) {
                Ok(Some(date)) => {
                    parsed += 1;
                    column.push(Some(date));
                }
                Ok(None) => column.push(None),
                Err(()) => {
                    failed += 1;
                    // Row 1 is the header.
                    warn!("Row {}: '{}' is not a date: {:?}", row_num + 2, name, cell);
                    column.push(None);
                }
            }
        }

        if failed > 0 && parsed == 0 {
            return Err(ReportError::Schema(format!(
                "column '{}' has no parseable dates ({} unparseable values)",
                name, failed
            )));
        }

        debug!("Column '{}': {} dates, {} unparseable", name, parsed, failed);
        dates.push(column);
    }

    let records = (0..sheet.rows.len())
        .map(|i| ActivityRecord {
            last_contact: dates[0][i],
            last_planned_meeting: dates[1][i],
            last_held_meeting: dates[2][i],
        })
        .collect();

    Ok(records)
}
