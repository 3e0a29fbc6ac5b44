use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Widest a text column may grow before its cells are truncated.
pub(crate) const MAX_COLUMN_WIDTH: usize = 40;

/// Display width of a string, accounting for CJK double-width, emoji, etc.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut `s` to at most `width` display columns, ending in ".." when shortened.
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }
    // Too narrow for an ellipsis: keep whatever prefix fits
    let (budget, suffix) = if width < 3 { (width, "") } else { (width - 2, "..") };

    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > budget {
            break;
        }
        used += cw;
        out.push(ch);
    }
    out.push_str(suffix);
    out
}

/// Pad or truncate to exactly `width` columns, text on the left.
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let cut = truncate_display(s, width);
    let w = display_width(&cut);
    format!("{}{}", cut, " ".repeat(width.saturating_sub(w)))
}

/// Pad or truncate to exactly `width` columns, text on the right.
pub(crate) fn pad_left(s: &str, width: usize) -> String {
    let cut = truncate_display(s, width);
    let w = display_width(&cut);
    format!("{}{}", " ".repeat(width.saturating_sub(w)), cut)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Align {
    Left,
    Right,
}

/// Plain-text table for terminal output: one header line, a rule, rows.
pub(crate) struct TextTable {
    headers: Vec<(String, Align)>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub(crate) fn new(headers: &[(&str, Align)]) -> Self {
        Self {
            headers: headers.iter().map(|(h, a)| (h.to_string(), *a)).collect(),
            rows: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(col, (header, _))| {
                let cells = self.rows.iter().filter_map(|r| r.get(col)).map(|c| display_width(c));
                cells.fold(display_width(header), usize::max).min(MAX_COLUMN_WIDTH)
            })
            .collect()
    }

    fn line(&self, widths: &[usize], cells: &[&str]) -> String {
        let parts: Vec<String> = cells
            .iter()
            .zip(self.headers.iter().zip(widths))
            .map(|(cell, ((_, align), &w))| match align {
                Align::Left => pad_right(cell, w),
                Align::Right => pad_left(cell, w),
            })
            .collect();
        parts.join("  ").trim_end().to_string()
    }

    pub(crate) fn render(&self) -> String {
        let widths = self.widths();
        let headers: Vec<&str> = self.headers.iter().map(|(h, _)| h.as_str()).collect();

        let mut out = self.line(&widths, &headers);
        out.push('\n');
        let total: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        out.push_str(&"-".repeat(total));
        out.push('\n');
        for row in &self.rows {
            let cells: Vec<&str> = row.iter().map(String::as_str).collect();
            out.push_str(&self.line(&widths, &cells));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_width_cjk() {
        assert_eq!(display_width("hello"), 5);
        assert_eq!(display_width("\u{4e16}\u{754c}"), 4); // "世界"
    }

    #[test]
    fn truncate_cuts_with_ellipsis() {
        assert_eq!(truncate_display("abc", 3), "abc");
        assert_eq!(truncate_display("abcdef", 5), "abc..");
        assert_eq!(truncate_display("abc", 2), "ab");
        assert_eq!(truncate_display("", 0), "");
    }

    #[test]
    fn truncate_respects_double_width() {
        let s = "\u{4e16}\u{754c}\u{4f60}\u{597d}";
        let t = truncate_display(s, 6);
        assert_eq!(t, "\u{4e16}\u{754c}..");
        assert!(display_width(&t) <= 6);
    }

    #[test]
    fn padding_both_sides() {
        assert_eq!(pad_right("ab", 5), "ab   ");
        assert_eq!(pad_left("ab", 5), "   ab");
        assert_eq!(pad_right("abcdef", 5), "abc..");
    }

    #[test]
    fn table_aligns_columns() {
        let mut table = TextTable::new(&[("Tenant", Align::Left), ("Total", Align::Right)]);
        table.push(vec!["Acme".into(), "$150.00".into()]);
        table.push(vec!["Gamma Corp".into(), "$9.00".into()]);
        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Tenant        Total");
        assert_eq!(lines[1], "-------------------");
        assert_eq!(lines[2], "Acme        $150.00");
        assert_eq!(lines[3], "Gamma Corp    $9.00");
    }

    #[test]
    fn wide_cells_are_capped() {
        let mut table = TextTable::new(&[("Metric", Align::Left)]);
        table.push(vec!["x".repeat(60)]);
        let rendered = table.render();
        let row = rendered.lines().nth(2).unwrap();
        assert_eq!(display_width(row), MAX_COLUMN_WIDTH);
        assert!(row.ends_with(".."));
    }
}
