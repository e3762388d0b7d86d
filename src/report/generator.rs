//! Report generation.
//!
//! This module renders a weekly report as Markdown, JSON, or a two-pane
//! HTML page with the table on the left and the bar chart on the right.

use crate::models::{Metric, Report, ReportMetadata, ReportMode, ReportSummary, WeekRow, WeekTable};
use crate::report::{chart, escape};
use anyhow::Result;

fn cell(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn label(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# Weekly Networking Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(&report.summary));
    output.push_str(&generate_table_section(&report.table));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Mode:** {}\n", metadata.mode));
    section.push_str(&format!("- **Label Year:** {}\n", metadata.year));
    section.push_str(&format!("- **Rows Read:** {}\n", metadata.records_read));
    if let Some(ref table_path) = metadata.table_path {
        section.push_str(&format!("- **Table:** `{}`\n", table_path));
    }
    if metadata.edits_applied > 0 {
        section.push_str(&format!("- **Manual Edits:** {}\n", metadata.edits_applied));
    }
    section.push('\n');

    section
}

/// Generate the summary section.
fn generate_summary_section(summary: &ReportSummary) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Weeks |");
    for metric in Metric::ALL {
        section.push_str(&format!(" {} |", metric.column()));
    }
    section.push_str("\n|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!("| {} |", summary.weeks));
    for metric in Metric::ALL {
        section.push_str(&format!(" {} |", summary.total(metric)));
    }
    section.push_str("\n\n");

    if let Some(week) = summary.busiest_week {
        section.push_str(&format!("Busiest week: **{}**\n\n", week));
    }

    section
}

/// Generate the weekly table section.
fn generate_table_section(table: &WeekTable) -> String {
    let mut section = String::new();

    section.push_str("## Weekly Report\n\n");

    if table.is_empty() {
        section.push_str("No weekly activity recorded yet.\n\n");
        return section;
    }

    section.push_str("| Week | Start | End |");
    for metric in Metric::ALL {
        section.push_str(&format!(" {} |", metric.column()));
    }
    section.push_str("\n|---:|:---|:---|---:|---:|---:|\n");

    for row in &table.rows {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            row.week,
            label(&row.start),
            label(&row.end),
            cell(row.contacts_made),
            cell(row.meetings_planned),
            cell(row.meetings_performed)
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by netsheet*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate the two-pane HTML page.
pub fn generate_html_report(report: &Report) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Weekly Networking Report</title>\n");
    html.push_str(HTML_STYLE);
    html.push_str("</head>\n<body>\n");
    html.push_str("<h1>Weekly Networking Report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">{} &middot; {} mode &middot; generated {}</p>\n",
        escape(&report.metadata.source),
        report.metadata.mode,
        report.metadata.generated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    html.push_str("<div class=\"panes\">\n");

    html.push_str("<section class=\"pane\">\n<h2>Weekly report - Values</h2>\n");
    html.push_str(&generate_html_table(&report.table, report.metadata.mode));
    html.push_str("</section>\n");

    html.push_str("<section class=\"pane\">\n<h2>Weekly report - Chart</h2>\n");
    html.push_str(&chart::render_svg(&report.table));
    html.push_str("</section>\n");

    html.push_str("</div>\n</body>\n</html>\n");
    html
}

const HTML_STYLE: &str = "<style>
body { font-family: sans-serif; margin: 1.5rem; }
h1 { text-align: center; }
.meta { text-align: center; color: #666; }
.panes { display: flex; gap: 2rem; align-items: flex-start; }
.pane { flex: 1; overflow-x: auto; }
table { border-collapse: collapse; }
th, td { border: 1px solid #ccc; padding: 0.25rem 0.6rem; text-align: right; }
td.readonly { background: #f4f4f4; color: #555; }
td.editable { background: #fff; }
td.null { color: #aaa; }
.hint { color: #666; font-size: 0.85rem; }
</style>
";

fn generate_html_table(table: &WeekTable, mode: ReportMode) -> String {
    let mut out = String::new();

    if table.is_empty() {
        out.push_str("<p>No weekly activity recorded yet.</p>\n");
        return out;
    }

    out.push_str("<table>\n<thead><tr><th>Week</th><th>Start</th><th>End</th>");
    for metric in Metric::ALL {
        out.push_str(&format!("<th>{}</th>", escape(metric.column())));
    }
    out.push_str("</tr></thead>\n<tbody>\n");

    for row in &table.rows {
        out.push_str(&generate_html_row(row));
    }
    out.push_str("</tbody>\n</table>\n");

    if mode == ReportMode::Accumulate {
        out.push_str(
            "<p class=\"hint\">Count cells are editable: rerun with \
             <code>--set WEEK:contacts|planned|performed=VALUE</code>.</p>\n",
        );
    }

    out
}

fn generate_html_row(row: &WeekRow) -> String {
    let mut out = format!(
        "<tr><td class=\"readonly\">{}</td><td class=\"readonly\">{}</td><td class=\"readonly\">{}</td>",
        row.week,
        escape(label(&row.start)),
        escape(label(&row.end))
    );
    for metric in Metric::ALL {
        match row.count(metric) {
            Some(v) => out.push_str(&format!(
                "<td class=\"editable\" data-week=\"{}\" data-metric=\"{}\">{}</td>",
                row.week,
                metric.key(),
                v
            )),
            None => out.push_str(&format!(
                "<td class=\"editable null\" data-week=\"{}\" data-metric=\"{}\"></td>",
                row.week,
                metric.key()
            )),
        }
    }
    out.push_str("</tr>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_test_report(mode: ReportMode) -> Report {
        let table = WeekTable::new(vec![
            WeekRow {
                week: 1,
                start: Some("Jan-01".to_string()),
                end: Some("Jan-07".to_string()),
                contacts_made: Some(2),
                meetings_planned: Some(0),
                meetings_performed: Some(0),
            },
            WeekRow {
                meetings_planned: Some(1),
                ..WeekRow::unobserved(2)
            },
        ]);

        Report {
            metadata: ReportMetadata {
                source: "Network_List.xlsx [Lista]".to_string(),
                generated_at: Utc::now(),
                mode,
                year: 2024,
                records_read: 3,
                table_path: Some("weekly_report.csv".to_string()),
                edits_applied: 1,
                duration_seconds: 0.2,
            },
            summary: ReportSummary::from_table(&table),
            table,
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let markdown = generate_markdown_report(&create_test_report(ReportMode::Accumulate));

        assert!(markdown.contains("# Weekly Networking Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Summary"));
        assert!(markdown.contains("Busiest week: **1**"));
        assert!(markdown.contains("| 1 | Jan-01 | Jan-07 | 2 | 0 | 0 |"));
        assert!(markdown.contains("| 2 |  |  |  | 1 |  |"));
        assert!(markdown.contains("Manual Edits:** 1"));
    }

    #[test]
    fn test_generate_markdown_empty_table() {
        let mut report = create_test_report(ReportMode::Snapshot);
        report.table = WeekTable::default();
        let markdown = generate_markdown_report(&report);
        assert!(markdown.contains("No weekly activity recorded yet."));
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&create_test_report(ReportMode::Snapshot)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["metadata"]["mode"], "snapshot");
        assert_eq!(value["table"]["rows"][0]["contacts_made"], 2);
        assert!(value["table"]["rows"][1]["contacts_made"].is_null());
        assert_eq!(value["summary"]["meetings_planned"], 1);
    }

    #[test]
    fn test_generate_html_report_has_two_panes() {
        let html = generate_html_report(&create_test_report(ReportMode::Accumulate));

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert_eq!(html.matches("<section class=\"pane\">").count(), 2);
        assert!(html.contains("<svg"));
        assert!(html.contains("<td class=\"readonly\">Jan-01</td>"));
        assert!(html.contains("data-week=\"1\" data-metric=\"contacts\">2</td>"));
        assert!(html.contains("class=\"editable null\""));
        assert!(html.contains("--set WEEK"));
    }

    #[test]
    fn test_html_escapes_source() {
        let mut report = create_test_report(ReportMode::Snapshot);
        report.metadata.source = "<script>".to_string();
        let html = generate_html_report(&report);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("--set WEEK"));
    }
}
