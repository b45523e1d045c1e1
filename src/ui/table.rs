//! Column-aligned tables for `status` and `plan`.

use console::measure_text_width;

/// Rows of cells padded to the widest cell per column.
///
/// Widths are measured without ANSI codes, so styled cells line up.
#[derive(Debug)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row<S: Into<String>>(&mut self, row: impl IntoIterator<Item = S>) {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| measure_text_width(h)).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate().take(widths.len()) {
                widths[i] = widths[i].max(measure_text_width(cell));
            }
        }
        widths
    }

    fn render_line(cells: &[String], widths: &[usize]) -> String {
        let mut line = String::from(" ");
        for (i, width) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            line.push(' ');
            line.push_str(cell);
            if i + 1 < widths.len() {
                let pad = width.saturating_sub(measure_text_width(cell));
                line.push_str(&" ".repeat(pad + 2));
            }
        }
        line.trim_end().to_string()
    }

    /// Render with a header rule. The last column is never padded.
    pub fn render(&self) -> String {
        let widths = self.widths();
        let rule_width = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1);

        let mut lines = vec![
            Self::render_line(&self.headers, &widths),
            format!("  {}", "─".repeat(rule_width)),
        ];
        lines.extend(self.rows.iter().map(|row| Self::render_line(row, &widths)));
        lines.join("\n")
    }
}
