//! The persisted weekly table.
//!
//! Stored as CSV with the columns `Week, Start, End, Contacts made,
//! Meetings planned, Meetings performed`. Empty cells are nulls. Files
//! written with only the four count columns are still readable; any missing
//! column reads as null.

use crate::analysis::merger::merge_row;
use crate::error::ReportError;
use crate::models::{Metric, WeekRow, WeekTable};
use crate::tabular;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

pub const WEEK_COLUMN: &str = "Week";
pub const START_COLUMN: &str = "Start";
pub const END_COLUMN: &str = "End";

/// Header row of the persisted table.
pub fn header() -> Vec<&'static str> {
    let mut columns = vec![WEEK_COLUMN, START_COLUMN, END_COLUMN];
    columns.extend(Metric::ALL.iter().map(|m| m.column()));
    columns
}

/// Read the table, creating an empty one if the file does not exist yet.
pub fn load_or_init(path: &Path) -> Result<WeekTable, ReportError> {
    if !path.exists() {
        info!("No table at {}, creating an empty one", path.display());
        save(path, &WeekTable::default())?;
        return Ok(WeekTable::default());
    }

    load(path)
}

/// Read an existing table.
pub fn load(path: &Path) -> Result<WeekTable, ReportError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ReportError::Persistence(format!("failed to read {}: {}", path.display(), e))
    })?;

    let table = parse(&content)
        .map_err(|e| ReportError::Persistence(format!("{}: {}", path.display(), e)))?;
    debug!("Loaded {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Parse table CSV text.
pub fn parse(content: &str) -> Result<WeekTable, String> {
    let table = tabular::parse_table(content);

    if table.headers.iter().all(|h| h.is_empty()) {
        return Ok(WeekTable::default());
    }

    let week_idx = table
        .column_index(WEEK_COLUMN)
        .ok_or_else(|| format!("missing '{}' column", WEEK_COLUMN))?;
    let start_idx = table.column_index(START_COLUMN);
    let end_idx = table.column_index(END_COLUMN);
    let metric_idx: Vec<(Metric, Option<usize>)> = Metric::ALL
        .iter()
        .map(|m| (*m, table.column_index(m.column())))
        .collect();

    let mut rows: BTreeMap<u32, WeekRow> = BTreeMap::new();
    for (line, fields) in table.rows.iter().enumerate() {
        let line = line + 2;
        if fields.iter().all(|f| f.trim().is_empty()) {
            debug!("Skipping blank line {}", line);
            continue;
        }
        let week = parse_count(&fields[week_idx])
            .map_err(|e| format!("line {}: week: {}", line, e))?
            .ok_or_else(|| format!("line {}: empty week number", line))?;

        let text = |idx: Option<usize>| {
            idx.map(|i| fields[i].trim())
                .filter(|s| !s.is_empty())
                .map(String::from)
        };

        let mut row = WeekRow {
            start: text(start_idx),
            end: text(end_idx),
            ..WeekRow::unobserved(week)
        };

        for (metric, idx) in &metric_idx {
            if let Some(i) = idx {
                let value = parse_count(&fields[*i])
                    .map_err(|e| format!("line {}: {}: {}", line, metric, e))?;
                row.set_count(*metric, value);
            }
        }

        let row = match rows.remove(&week) {
            Some(earlier) => {
                warn!(
                    "Week {} appears more than once (line {}); keeping the highest counts",
                    week, line
                );
                merge_row(earlier, row)
            }
            None => row,
        };
        rows.insert(week, row);
    }

    Ok(WeekTable::new(rows.into_values().collect()))
}

/// Parse a non-negative count. Whole floats such as `3.0` are accepted.
fn parse_count(field: &str) -> Result<Option<u32>, String> {
    let field = field.trim();
    if field.is_empty() || field.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    if let Ok(n) = field.parse::<u32>() {
        return Ok(Some(n));
    }
    match field.parse::<f64>() {
        Ok(f) if f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) => Ok(Some(f as u32)),
        _ => Err(format!("'{}' is not a non-negative whole number", field)),
    }
}

/// Render a table as CSV text.
pub fn render(table: &WeekTable) -> String {
    let mut out = tabular::render_line(&header());
    out.push('\n');

    for row in &table.rows {
        let mut fields = vec![
            row.week.to_string(),
            row.start.clone().unwrap_or_default(),
            row.end.clone().unwrap_or_default(),
        ];
        fields.extend(
            Metric::ALL
                .iter()
                .map(|m| row.count(*m).map(|c| c.to_string()).unwrap_or_default()),
        );
        out.push_str(&tabular::render_line(&fields));
        out.push('\n');
    }

    out
}

/// Overwrite the table file.
///
/// The content goes to a temporary file in the same directory which then
/// replaces the target, so readers never see a partial table.
pub fn save(path: &Path, table: &WeekTable) -> Result<(), ReportError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| {
        ReportError::Persistence(format!("failed to create {}: {}", dir.display(), e))
    })?;

    let persist_err =
        |e: std::io::Error| ReportError::Persistence(format!("failed to write {}: {}", path.display(), e));

    let mut tmp = NamedTempFile::new_in(dir).map_err(persist_err)?;
    tmp.write_all(render(table).as_bytes()).map_err(persist_err)?;
    tmp.persist(path).map_err(|e| persist_err(e.error))?;

    info!("Saved {} weeks to {}", table.len(), path.display());
    Ok(())
}
