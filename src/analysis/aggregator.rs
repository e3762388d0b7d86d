//! ISO-week aggregation of activity records.
//!
//! This module buckets the three activity dates of every record by ISO week
//! number and computes the Start/End labels shown next to each week.

use crate::models::{ActivityRecord, Metric, WeekRange, WeekRow, WeekTable};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::HashMap;
use tracing::debug;

/// Label format for week boundaries, e.g. `Jan-01`.
pub const LABEL_FORMAT: &str = "%b-%d";

/// Monday of ISO week `week` in `year`.
///
/// January 4th always falls in ISO week 1, so the Monday is found by
/// offsetting from Jan 4 by whole weeks and then back to its weekday 1.
/// Weeks past the end of the year roll into the next year.
pub fn iso_week_start(year: i32, week: u32) -> Option<NaiveDate> {
    let jan4 = NaiveDate::from_ymd_opt(year, 1, 4)?;
    let jan4_week = i64::from(jan4.iso_week().week());
    let jan4_weekday = i64::from(jan4.weekday().number_from_monday());

    let days = 7 * (i64::from(week) - jan4_week) + (1 - jan4_weekday);
    jan4.checked_add_signed(Duration::days(days))
}

/// Start and end labels for a week of the given year.
pub fn week_labels(year: i32, week: u32) -> (Option<String>, Option<String>) {
    match iso_week_start(year, week) {
        Some(monday) => {
            let sunday = monday + Duration::days(6);
            (
                Some(monday.format(LABEL_FORMAT).to_string()),
                Some(sunday.format(LABEL_FORMAT).to_string()),
            )
        }
        None => (None, None),
    }
}

/// Count records per ISO week for every metric.
///
/// Returns one row per week in `range`. Weeks without records get an
/// observed zero for each metric; dates whose week falls outside `range`
/// are not counted.
pub fn aggregate(records: &[ActivityRecord], range: WeekRange, year: i32) -> WeekTable {
    let mut counts: HashMap<(Metric, u32), u32> = HashMap::new();
    let mut out_of_range = 0usize;

    for record in records {
        for metric in Metric::ALL {
            let Some(date) = record.date_for(metric) else {
                continue;
            };
            let week = date.iso_week().week();
            if !range.contains(week) {
                out_of_range += 1;
                continue;
            }
            *counts.entry((metric, week)).or_default() += 1;
        }
    }

    if out_of_range > 0 {
        debug!(
            "{} dates fell outside weeks {}-{} and were not counted",
            out_of_range, range.first, range.last
        );
    }

    let rows = range
        .iter()
        .map(|week| {
            let (start, end) = week_labels(year, week);
            let count = |metric| Some(counts.get(&(metric, week)).copied().unwrap_or(0));
            WeekRow {
                week,
                start,
                end,
                contacts_made: count(Metric::ContactsMade),
                meetings_planned: count(Metric::MeetingsPlanned),
                meetings_performed: count(Metric::MeetingsPerformed),
            }
        })
        .collect();

    WeekTable::new(rows)
}

/// Remove weeks where every count is zero.
pub fn drop_inactive_weeks(mut table: WeekTable) -> WeekTable {
    table.rows.retain(|row| !row.is_inactive());
    table
}

/// Weeks 1-52 with inactive weeks removed.
pub fn snapshot_report(records: &[ActivityRecord], year: i32) -> WeekTable {
    drop_inactive_weeks(aggregate(records, WeekRange::SNAPSHOT, year))
}
