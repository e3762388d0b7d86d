//! Manual edits to the weekly table.
//!
//! Only the three count columns are editable. Edits are given on the
//! command line as `WEEK:METRIC=VALUE`, e.g. `12:contacts=4`; an empty
//! value clears the cell.

use crate::analysis::aggregator::week_labels;
use crate::error::ReportError;
use crate::models::{Metric, WeekRange, WeekRow, WeekTable};
use std::str::FromStr;
use tracing::debug;

const READ_ONLY_COLUMNS: [&str; 3] = ["Week", "Start", "End"];

/// A single cell edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellEdit {
    pub week: u32,
    pub metric: Metric,
    /// New value; `None` clears the cell.
    pub value: Option<u32>,
}

impl FromStr for CellEdit {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (target, value) = s
            .split_once('=')
            .ok_or_else(|| ReportError::invalid_edit(s, "expected WEEK:METRIC=VALUE"))?;
        let (week, column) = target
            .split_once(':')
            .ok_or_else(|| ReportError::invalid_edit(s, "expected WEEK:METRIC=VALUE"))?;

        let week: u32 = week
            .trim()
            .parse()
            .map_err(|_| ReportError::invalid_edit(s, format!("'{}' is not a week number", week.trim())))?;
        if !WeekRange::FULL.contains(week) {
            return Err(ReportError::invalid_edit(
                s,
                format!("week must be between 1 and {}", WeekRange::FULL.last),
            ));
        }

        let metric = match Metric::from_name(column) {
            Some(metric) => metric,
            None => {
                let column = column.trim();
                let reason = match READ_ONLY_COLUMNS
                    .iter()
                    .find(|c| c.eq_ignore_ascii_case(column))
                {
                    Some(read_only) => format!("column '{}' is not editable", read_only),
                    None => format!(
                        "unknown column '{}' (use contacts, planned or performed)",
                        column
                    ),
                };
                return Err(ReportError::invalid_edit(s, reason));
            }
        };

        let value = value.trim();
        let value = if value.is_empty() {
            None
        } else {
            Some(value.parse::<u32>().map_err(|_| {
                ReportError::invalid_edit(s, format!("'{}' is not a non-negative count", value))
            })?)
        };

        Ok(Self {
            week,
            metric,
            value,
        })
    }
}

/// Apply edits in order. Weeks missing from the table are inserted with
/// labels for `year`.
pub fn apply_edits(table: &mut WeekTable, edits: &[CellEdit], year: i32) {
    for edit in edits {
        if table.row(edit.week).is_none() {
            let (start, end) = week_labels(year, edit.week);
            table.upsert(WeekRow {
                start,
                end,
                ..WeekRow::unobserved(edit.week)
            });
        }

        if let Some(row) = table.row_mut(edit.week) {
            debug!(
                "Week {}: {} {:?} -> {:?}",
                edit.week,
                edit.metric,
                row.count(edit.metric),
                edit.value
            );
            row.set_count(edit.metric, edit.value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_edit() {
        let edit: CellEdit = "12:contacts=4".parse().unwrap();
        assert_eq!(
            edit,
            CellEdit {
                week: 12,
                metric: Metric::ContactsMade,
                value: Some(4)
            }
        );

        let edit: CellEdit = " 3 : Meetings performed = ".parse().unwrap();
        assert_eq!(edit.metric, Metric::MeetingsPerformed);
        assert_eq!(edit.value, None);
    }

    #[test]
    fn test_read_only_columns_rejected() {
        for input in ["3:start=Jan-01", "3:End=x", "3:week=4"] {
            let err = input.parse::<CellEdit>().unwrap_err();
            assert!(err.to_string().contains("is not editable"), "{err}");
        }
    }

    #[test]
    fn test_malformed_edits_rejected() {
        assert!("contacts=4".parse::<CellEdit>().is_err());
        assert!("3:contacts".parse::<CellEdit>().is_err());
        assert!("0:contacts=1".parse::<CellEdit>().is_err());
        assert!("54:contacts=1".parse::<CellEdit>().is_err());
        assert!("3:contacts=-1".parse::<CellEdit>().is_err());
        assert!("3:calls=1".parse::<CellEdit>().is_err());
    }

    #[test]
    fn test_apply_edits_updates_and_inserts() {
        let mut table = WeekTable::new(vec![WeekRow {
            contacts_made: Some(5),
            meetings_planned: Some(1),
            ..WeekRow::unobserved(2)
        }]);

        let edits = vec![
            "2:contacts=3".parse().unwrap(),
            "2:planned=".parse().unwrap(),
            "9:performed=2".parse().unwrap(),
        ];
        apply_edits(&mut table, &edits, 2024);

        let week2 = table.row(2).unwrap();
        assert_eq!(week2.contacts_made, Some(3));
        assert_eq!(week2.meetings_planned, None);

        let week9 = table.row(9).unwrap();
        assert_eq!(week9.start.as_deref(), Some("Feb-26"));
        assert_eq!(week9.meetings_performed, Some(2));
        assert_eq!(week9.contacts_made, None);

        let weeks: Vec<u32> = table.rows.iter().map(|r| r.week).collect();
        assert_eq!(weeks, vec![2, 9]);
    }
}
