//! SVG grouped bar chart.
//!
//! One group per week, three bars per group in metric order, each metric in
//! its own colour. Null counts draw as empty bars.

use crate::models::{Metric, WeekTable};
use crate::report::escape;

const BAR_WIDTH: u32 = 14;
const GROUP_GAP: u32 = 12;
const MARGIN_LEFT: u32 = 48;
const MARGIN_RIGHT: u32 = 16;
const MARGIN_TOP: u32 = 44;
const MARGIN_BOTTOM: u32 = 36;
const PLOT_HEIGHT: u32 = 240;
const TARGET_TICKS: u64 = 5;

fn group_width() -> u32 {
    BAR_WIDTH * Metric::ALL.len() as u32 + GROUP_GAP
}

/// Tick step and axis maximum for the largest value.
fn axis_scale(max_value: u32) -> (u64, u64) {
    let max_value = u64::from(max_value.max(1));
    let step = max_value.div_ceil(TARGET_TICKS).max(1);
    (step, step * max_value.div_ceil(step))
}

/// Render the chart as a standalone SVG document.
pub fn render_svg(table: &WeekTable) -> String {
    let groups = table.len() as u32;
    let width = MARGIN_LEFT + groups.max(4) * group_width() + MARGIN_RIGHT;
    let height = MARGIN_TOP + PLOT_HEIGHT + MARGIN_BOTTOM;
    let baseline = MARGIN_TOP + PLOT_HEIGHT;

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"sans-serif\" font-size=\"11\">\n",
        w = width,
        h = height
    ));

    svg.push_str(&render_legend());

    if table.is_empty() {
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" fill=\"#666\">No activity to chart</text>\n",
            MARGIN_LEFT,
            MARGIN_TOP + PLOT_HEIGHT / 2
        ));
        svg.push_str("</svg>\n");
        return svg;
    }

    let max_value = table
        .rows
        .iter()
        .flat_map(|r| Metric::ALL.into_iter().filter_map(move |m| r.count(m)))
        .max()
        .unwrap_or(0);
    let (step, axis_max) = axis_scale(max_value);
    let scale = |v: u64| (v as f64 / axis_max as f64) * f64::from(PLOT_HEIGHT);

    // Y axis grid and labels
    for tick in (0..=axis_max).step_by(step as usize) {
        let y = f64::from(baseline) - scale(tick);
        svg.push_str(&format!(
            "  <line x1=\"{x1}\" y1=\"{y:.1}\" x2=\"{x2}\" y2=\"{y:.1}\" stroke=\"#ddd\"/>\n",
            x1 = MARGIN_LEFT,
            x2 = width - MARGIN_RIGHT,
            y = y
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{:.1}\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            MARGIN_LEFT - 6,
            y,
            tick
        ));
    }

    for (i, row) in table.rows.iter().enumerate() {
        let group_x = MARGIN_LEFT + i as u32 * group_width() + GROUP_GAP / 2;

        for (j, metric) in Metric::ALL.iter().enumerate() {
            let value = row.count(*metric);
            let bar_height = scale(u64::from(value.unwrap_or(0)));
            let x = group_x + j as u32 * BAR_WIDTH;
            let label = value.map_or_else(|| "-".to_string(), |v| v.to_string());
            svg.push_str(&format!(
                "  <rect x=\"{}\" y=\"{:.1}\" width=\"{}\" height=\"{:.1}\" fill=\"{}\"><title>Week {} · {}: {}</title></rect>\n",
                x,
                f64::from(baseline) - bar_height,
                BAR_WIDTH - 1,
                bar_height,
                metric.color(),
                row.week,
                escape(metric.column()),
                label
            ));
        }

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\">{}</text>\n",
            group_x + BAR_WIDTH * Metric::ALL.len() as u32 / 2,
            baseline + 16,
            row.week
        ));
    }

    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" fill=\"#444\">Week</text>\n",
        MARGIN_LEFT + (width - MARGIN_LEFT - MARGIN_RIGHT) / 2,
        height - 4
    ));
    svg.push_str("</svg>\n");
    svg
}

fn render_legend() -> String {
    let mut legend = String::new();
    let mut x = MARGIN_LEFT;
    for metric in Metric::ALL {
        legend.push_str(&format!(
            "  <rect x=\"{}\" y=\"12\" width=\"12\" height=\"12\" fill=\"{}\"/>\n",
            x,
            metric.color()
        ));
        legend.push_str(&format!(
            "  <text x=\"{}\" y=\"22\">{}</text>\n",
            x + 16,
            escape(metric.column())
        ));
        x += 150;
    }
    legend
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeekRow;

    fn row(week: u32, counts: [Option<u32>; 3]) -> WeekRow {
        WeekRow {
            contacts_made: counts[0],
            meetings_planned: counts[1],
            meetings_performed: counts[2],
            ..WeekRow::unobserved(week)
        }
    }

    #[test]
    fn test_axis_scale() {
        assert_eq!(axis_scale(0), (1, 1));
        assert_eq!(axis_scale(4), (1, 4));
        assert_eq!(axis_scale(10), (2, 10));
        assert_eq!(axis_scale(11), (3, 12));
    }

    #[test]
    fn test_render_svg_with_maximum_count() {
        let table = WeekTable::new(vec![row(1, [Some(u32::MAX), Some(0), None])]);
        let svg = render_svg(&table);

        let (step, axis_max) = axis_scale(u32::MAX);
        assert!(axis_max >= u64::from(u32::MAX));
        assert!(svg.contains(&format!(">{}</text>", axis_max)));
        assert!(axis_max / step <= 6);
        assert!(svg.contains("Week 1 · Contacts made: 4294967295"));
    }

    #[test]
    fn test_render_svg_bars_per_week() {
        let table = WeekTable::new(vec![
            row(1, [Some(2), Some(0), Some(1)]),
            row(2, [None, Some(1), Some(0)]),
        ]);
        let svg = render_svg(&table);

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        // 3 legend swatches + 3 bars per week
        assert_eq!(svg.matches("<rect").count(), 3 + 6);
        assert!(svg.contains("Week 1 · Contacts made: 2"));
        assert!(svg.contains("Week 2 · Contacts made: -"));
        assert!(svg.contains(Metric::MeetingsPerformed.color()));
    }

    #[test]
    fn test_bar_order_follows_metric_order() {
        let table = WeekTable::new(vec![row(7, [Some(1), Some(1), Some(1)])]);
        let svg = render_svg(&table);

        let contacts = svg.find("Week 7 · Contacts made").unwrap();
        let planned = svg.find("Week 7 · Meetings planned").unwrap();
        let performed = svg.find("Week 7 · Meetings performed").unwrap();
        assert!(contacts < planned && planned < performed);
    }

    #[test]
    fn test_render_empty_table() {
        let svg = render_svg(&WeekTable::default());
        assert!(svg.contains("No activity to chart"));
    }
}
