//! Plain ASCII table layout.

/// A bordered text table with a header row.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Add a row. Missing cells render empty, extra cells are dropped.
    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn render(&self) -> String {
        let widths: Vec<usize> = (0..self.headers.len())
            .map(|col| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(|cell| display_width(cell))
                    .chain(std::iter::once(display_width(&self.headers[col])))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let border = format!(
            "+{}+",
            widths
                .iter()
                .map(|w| "-".repeat(w + 2))
                .collect::<Vec<_>>()
                .join("+")
        );

        let mut out = String::new();
        out.push_str(&border);
        out.push('\n');
        out.push_str(&render_line(&self.headers, &widths));
        out.push('\n');
        out.push_str(&border);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&render_line(row, &widths));
            out.push('\n');
        }
        if !self.rows.is_empty() {
            out.push_str(&border);
            out.push('\n');
        }
        out
    }
}

fn render_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, width)| {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let padding = width.saturating_sub(display_width(cell));
            format!(" {}{} ", cell, " ".repeat(padding))
        })
        .collect();
    format!("|{}|", padded.join("|"))
}

/// Approximate terminal column width of `s`.
///
/// Emoji and pictographs count as two columns, variation selectors and
/// zero-width joiners as none.
pub fn display_width(s: &str) -> usize {
    s.chars()
        .map(|c| match c as u32 {
            0xFE00..=0xFE0F | 0x200B..=0x200D => 0,
            0x1F000..=0x1FAFF | 0x2600..=0x27BF => 2,
            _ => 1,
        })
        .sum()
}
