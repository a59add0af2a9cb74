//! Column-aligned tables and CSV output
//!
//! Widths are measured in display columns so that names containing wide
//! characters still line up.

use unicode_width::UnicodeWidthStr;

/// Pad `text` with spaces up to `width` display columns
pub fn pad(text: &str, width: usize) -> String {
    let current = UnicodeWidthStr::width(text);
    let mut padded = String::with_capacity(text.len() + width.saturating_sub(current));
    padded.push_str(text);
    padded.extend(std::iter::repeat(' ').take(width.saturating_sub(current)));
    padded
}

/// Render a header row, a rule, and one line per row
///
/// Columns are separated by two spaces. Trailing padding is trimmed.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| UnicodeWidthStr::width(*h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(UnicodeWidthStr::width(cell.as_str()));
            }
        }
    }

    let render_row = |cells: Vec<&str>| -> String {
        let line: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| pad(cell, *width))
            .collect();
        line.join("  ").trim_end().to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(render_row(headers.to_vec()));
    out.push(
        widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        out.push(render_row(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

/// Quote a CSV field if it contains a comma, quote or line break
pub fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render a header line plus one line per row
pub fn render_csv(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = Vec::with_capacity(rows.len() + 1);
    out.push(headers.iter().map(|h| csv_field(h)).collect::<Vec<_>>().join(","));
    for row in rows {
        out.push(row.iter().map(|c| csv_field(c)).collect::<Vec<_>>().join(","));
    }
    out.join("\n")
}
