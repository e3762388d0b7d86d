//! Comma-separated value parsing and writing.
//!
//! Quoted fields may contain commas, doubled quotes and line breaks. Blank
//! lines are skipped and a leading UTF-8 byte-order mark is ignored.

/// A header row plus data rows, each padded to the header width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Index of the column whose trimmed header equals `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name.trim())
    }
}

/// Split CSV text into records of raw fields.
pub fn parse_records(content: &str) -> Vec<Vec<String>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() && !quoted => {
                in_quotes = true;
                quoted = true;
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                quoted = false;
            }
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                record.push(std::mem::take(&mut field));
                quoted = false;
                push_record(&mut records, std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || quoted || !record.is_empty() {
        record.push(field);
        push_record(&mut records, record);
    }

    records
}

fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>) {
    let blank = record.len() == 1 && record[0].trim().is_empty();
    if !blank {
        records.push(record);
    }
}

/// Parse CSV text whose first record is the header row.
pub fn parse_table(content: &str) -> Table {
    let mut records = parse_records(content).into_iter();
    let headers: Vec<String> = records
        .next()
        .unwrap_or_default()
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    let width = headers.len();
    let rows = records
        .map(|mut row| {
            if row.len() < width {
                row.resize(width, String::new());
            }
            row
        })
        .collect();

    Table { headers, rows }
}

/// Quote a field when it contains a delimiter, quote or line break.
pub fn escape_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render one CSV line (without the trailing newline).
pub fn render_line<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_records() {
        let records = parse_records("a,b,c\n1,2,3\n");
        assert_eq!(records, vec![vec!["a", "b", "c"], vec!["1", "2", "3"]]);
    }

    #[test]
    fn test_parse_quoted_fields() {
        let records = parse_records("name,note\r\n\"Svensson, Erik\",\"said \"\"hej\"\"\nthen left\"\r\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1][0], "Svensson, Erik");
        assert_eq!(records[1][1], "said \"hej\"\nthen left");
    }

    #[test]
    fn test_parse_skips_blank_lines_and_bom() {
        let records = parse_records("\u{feff}Week,Start\n\n1,Jan-01\n\n");
        assert_eq!(records, vec![vec!["Week", "Start"], vec!["1", "Jan-01"]]);
    }

    #[test]
    fn test_parse_keeps_empty_fields() {
        let records = parse_records("a,,c\n,,\n");
        assert_eq!(records[0], vec!["a", "", "c"]);
        assert_eq!(records[1], vec!["", "", ""]);
    }

    #[test]
    fn test_parse_table_pads_short_rows() {
        let table = parse_table(" Week , Start ,End\n1\n");
        assert_eq!(table.headers, vec!["Week", "Start", "End"]);
        assert_eq!(table.rows, vec![vec!["1", "", ""]]);
        assert_eq!(table.column_index("Start"), Some(1));
        assert_eq!(table.column_index("Missing"), None);
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(render_line(&["Week", "Contacts made", ""]), "Week,Contacts made,");
    }
}
