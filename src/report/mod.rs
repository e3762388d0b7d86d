//! Report rendering: HTML page, Markdown, JSON and the SVG chart.

pub mod chart;
pub mod generator;

pub use chart::render_svg;
pub use generator::{generate_html_report, generate_json_report, generate_markdown_report};

/// Escape text for use in HTML or SVG content and attributes.
pub(crate) fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("a & b"), "a &amp; b");
        assert_eq!(escape("<\"x\">"), "&lt;&quot;x&quot;&gt;");
        assert_eq!(escape("möte"), "möte");
    }
}
