//! Data models for the weekly activity report.
//!
//! This module contains the core data structures shared by the aggregator,
//! the merger, the persisted table and the report generators.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three activity counts tracked per week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Rows whose last-contact date falls in the week
    ContactsMade,
    /// Rows whose last planned meeting falls in the week
    MeetingsPlanned,
    /// Rows whose last held meeting falls in the week
    MeetingsPerformed,
}

impl Metric {
    /// All metrics in display order.
    pub const ALL: [Metric; 3] = [
        Metric::ContactsMade,
        Metric::MeetingsPlanned,
        Metric::MeetingsPerformed,
    ];

    /// Column header used in the persisted table and rendered reports.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::ContactsMade => "Contacts made",
            Metric::MeetingsPlanned => "Meetings planned",
            Metric::MeetingsPerformed => "Meetings performed",
        }
    }

    /// Short key accepted by `--set`.
    pub fn key(&self) -> &'static str {
        match self {
            Metric::ContactsMade => "contacts",
            Metric::MeetingsPlanned => "planned",
            Metric::MeetingsPerformed => "performed",
        }
    }

    /// Fill colour used by the chart.
    pub fn color(&self) -> &'static str {
        match self {
            Metric::ContactsMade => "#4c78a8",
            Metric::MeetingsPlanned => "#f58518",
            Metric::MeetingsPerformed => "#e45756",
        }
    }

    /// Resolve a metric from a short key or a full column name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Metric::ALL
            .into_iter()
            .find(|m| name == m.key() || name == m.column().to_lowercase())
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

/// Which flavour of report to build.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    /// Weeks 1-52, zero weeks dropped, nothing persisted
    Snapshot,
    /// Weeks 1-53, max-merged with the persisted table and written back
    #[default]
    Accumulate,
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportMode::Snapshot => write!(f, "snapshot"),
            ReportMode::Accumulate => write!(f, "accumulate"),
        }
    }
}

/// A single row of the activity sheet.
///
/// Rows carry no identity; duplicates are counted individually.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityRecord {
    pub last_contact: Option<NaiveDate>,
    pub last_planned_meeting: Option<NaiveDate>,
    pub last_held_meeting: Option<NaiveDate>,
}

impl ActivityRecord {
    /// The date that feeds the given metric.
    pub fn date_for(&self, metric: Metric) -> Option<NaiveDate> {
        match metric {
            Metric::ContactsMade => self.last_contact,
            Metric::MeetingsPlanned => self.last_planned_meeting,
            Metric::MeetingsPerformed => self.last_held_meeting,
        }
    }
}

/// Inclusive range of ISO week numbers a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekRange {
    pub first: u32,
    pub last: u32,
}

impl WeekRange {
    /// Weeks 1-52.
    pub const SNAPSHOT: WeekRange = WeekRange { first: 1, last: 52 };
    /// Weeks 1-53.
    pub const FULL: WeekRange = WeekRange { first: 1, last: 53 };

    pub fn contains(&self, week: u32) -> bool {
        (self.first..=self.last).contains(&week)
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> {
        self.first..=self.last
    }
}

impl From<ReportMode> for WeekRange {
    fn from(mode: ReportMode) -> Self {
        match mode {
            ReportMode::Snapshot => WeekRange::SNAPSHOT,
            ReportMode::Accumulate => WeekRange::FULL,
        }
    }
}

/// Counts and labels for one ISO week.
///
/// `None` means the value was never observed, which is distinct from an
/// observed zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRow {
    pub week: u32,
    pub start: Option<String>,
    pub end: Option<String>,
    pub contacts_made: Option<u32>,
    pub meetings_planned: Option<u32>,
    pub meetings_performed: Option<u32>,
}

impl WeekRow {
    /// A row with every field null.
    pub fn unobserved(week: u32) -> Self {
        Self {
            week,
            start: None,
            end: None,
            contacts_made: None,
            meetings_planned: None,
            meetings_performed: None,
        }
    }

    pub fn count(&self, metric: Metric) -> Option<u32> {
        match metric {
            Metric::ContactsMade => self.contacts_made,
            Metric::MeetingsPlanned => self.meetings_planned,
            Metric::MeetingsPerformed => self.meetings_performed,
        }
    }

    pub fn set_count(&mut self, metric: Metric, value: Option<u32>) {
        match metric {
            Metric::ContactsMade => self.contacts_made = value,
            Metric::MeetingsPlanned => self.meetings_planned = value,
            Metric::MeetingsPerformed => self.meetings_performed = value,
        }
    }

    /// True when neither the labels nor any count were ever observed.
    pub fn is_unobserved(&self) -> bool {
        self.start.is_none()
            && self.end.is_none()
            && Metric::ALL.iter().all(|m| self.count(*m).is_none())
    }

    /// True when no metric has a value above zero.
    pub fn is_inactive(&self) -> bool {
        Metric::ALL.iter().all(|m| self.count(*m).unwrap_or(0) == 0)
    }

    /// Sum of the three counts, nulls ignored.
    pub fn total(&self) -> u64 {
        Metric::ALL
            .iter()
            .filter_map(|m| self.count(*m))
            .map(u64::from)
            .sum()
    }
}

/// Ordered weekly rows, at most one per week number.
///
/// Used both for freshly aggregated reports and for the persisted table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekTable {
    pub rows: Vec<WeekRow>,
}

impl WeekTable {
    pub fn new(mut rows: Vec<WeekRow>) -> Self {
        rows.sort_by_key(|r| r.week);
        rows.dedup_by_key(|r| r.week);
        Self { rows }
    }

    pub fn row(&self, week: u32) -> Option<&WeekRow> {
        self.rows.iter().find(|r| r.week == week)
    }

    pub fn row_mut(&mut self, week: u32) -> Option<&mut WeekRow> {
        self.rows.iter_mut().find(|r| r.week == week)
    }

    /// Insert a row keeping week order. An existing row for the same week is replaced.
    pub fn upsert(&mut self, row: WeekRow) {
        match self.rows.binary_search_by_key(&row.week, |r| r.week) {
            Ok(idx) => self.rows[idx] = row,
            Err(idx) => self.rows.insert(idx, row),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Totals across a rendered table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Number of week rows in the report.
    pub weeks: usize,
    pub contacts_made: u64,
    pub meetings_planned: u64,
    pub meetings_performed: u64,
    /// Week with the highest combined activity (earliest on ties).
    pub busiest_week: Option<u32>,
}

impl ReportSummary {
    /// Creates a summary from a weekly table.
    pub fn from_table(table: &WeekTable) -> Self {
        let mut summary = Self {
            weeks: table.len(),
            ..Self::default()
        };
        let mut busiest: Option<(u32, u64)> = None;

        for row in &table.rows {
            summary.contacts_made += u64::from(row.contacts_made.unwrap_or(0));
            summary.meetings_planned += u64::from(row.meetings_planned.unwrap_or(0));
            summary.meetings_performed += u64::from(row.meetings_performed.unwrap_or(0));

            let total = row.total();
            if total > 0 && busiest.map_or(true, |(_, best)| total > best) {
                busiest = Some((row.week, total));
            }
        }

        summary.busiest_week = busiest.map(|(week, _)| week);
        summary
    }

    pub fn total(&self, metric: Metric) -> u64 {
        match metric {
            Metric::ContactsMade => self.contacts_made,
            Metric::MeetingsPlanned => self.meetings_planned,
            Metric::MeetingsPerformed => self.meetings_performed,
        }
    }
}

/// Metadata about a report run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Where the activity sheet was read from.
    pub source: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    pub mode: ReportMode,
    /// Year used for the Start/End labels.
    pub year: i32,
    /// Number of activity rows read from the source.
    pub records_read: usize,
    /// Persisted table path (accumulate mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_path: Option<String>,
    /// Number of `--set` edits applied.
    pub edits_applied: usize,
    pub duration_seconds: f64,
}

/// The complete weekly report handed to the generators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub summary: ReportSummary,
    pub table: WeekTable,
}
