//! Command output.

/// Output produced by a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Plain text lines.
    Text(String),
    /// Tabular data (header row + data rows).
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// Command produced no visible output.
    None,
    /// Signal to clear the content region.
    Clear,
}

impl CommandOutput {
    /// Convenience constructor for text output.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Render to display lines. Tables are column-aligned with a dashed rule
    /// under the header.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Text(text) => text.lines().map(str::to_string).collect(),
            Self::Table { headers, rows } => render_table(headers, rows),
            Self::None | Self::Clear => Vec::new(),
        }
    }
}

fn render_table(headers: &[String], rows: &[Vec<String>]) -> Vec<String> {
    let cols = headers
        .len()
        .max(rows.iter().map(Vec::len).max().unwrap_or(0));
    let mut widths = vec![0usize; cols];
    for row in std::iter::once(headers).chain(rows.iter().map(Vec::as_slice)) {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let format_row = |row: &[String]| -> String {
        let mut line = String::new();
        for (i, width) in widths.iter().enumerate() {
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            if i > 0 {
                line.push_str("  ");
            }
            line.push_str(cell);
            if i + 1 < cols {
                let pad = width - cell.chars().count();
                line.extend(std::iter::repeat_n(' ', pad));
            }
        }
        line.trim_end().to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    if !headers.is_empty() {
        out.push(format_row(headers));
        let rule_len = widths.iter().sum::<usize>() + 2 * cols.saturating_sub(1);
        out.push("-".repeat(rule_len));
    }
    out.extend(rows.iter().map(|r| format_row(r)));
    out
}
