//! Plain-text rendering for dashboard tables and wizard sections.

use fairy_core::{format_epoch_ms, SampleTable};
use serde_json::Value;
use std::fmt::{Display, Formatter};

const MAX_CELL_CHARS: usize = 48;

/// Left-aligned text table with a header rule.
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

    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells
            .into_iter()
            .map(|cell| truncate(&cell.into()))
            .collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let widths = self.widths();
        write_row(f, &self.headers, &widths)?;
        let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
        write_row(f, &rule, &widths)?;
        for row in &self.rows {
            write_row(f, row, &widths)?;
        }
        Ok(())
    }
}

fn write_row(f: &mut Formatter<'_>, cells: &[String], widths: &[usize]) -> std::fmt::Result {
    let mut line = String::new();
    for (index, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if index > 0 {
            line.push_str("  ");
        }
        line.push_str(cell);
        let padding = width.saturating_sub(cell.chars().count());
        line.extend(std::iter::repeat(' ').take(padding));
    }
    writeln!(f, "{}", line.trim_end())
}

fn truncate(value: &str) -> String {
    let flattened = value.replace(['\n', '\r'], " ");
    if flattened.chars().count() <= MAX_CELL_CHARS {
        return flattened;
    }
    let mut shortened: String = flattened.chars().take(MAX_CELL_CHARS - 3).collect();
    shortened.push_str("...");
    shortened
}

/// Renders epoch milliseconds for display.
pub fn timestamp(epoch_ms: i64) -> String {
    format_epoch_ms(epoch_ms)
}

/// Renders one sample cell; nulls show as empty.
pub fn sample_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Builds a table for the first `limit` sample rows.
pub fn samples_table(samples: &SampleTable, limit: usize) -> Table {
    let mut table = Table::new(samples.columns.iter().cloned());
    for row in samples.rows.iter().take(limit) {
        table.push_row(
            samples
                .columns
                .iter()
                .map(|column| row.get(column).map(sample_cell).unwrap_or_default()),
        );
    }
    table
}

#[cfg(test)]
mod tests {
    use super::{sample_cell, Table};
    use serde_json::json;

    #[test]
    fn table_aligns_columns() {
        let mut table = Table::new(["Title", "Status"]);
        table.push_row(["RNA-seq", "In Progress"]);
        table.push_row(["A", "Archived"]);
        let rendered = table.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Title    Status");
        assert_eq!(lines[1], "-------  -----------");
        assert_eq!(lines[2], "RNA-seq  In Progress");
        assert_eq!(lines[3], "A        Archived");
    }

    #[test]
    fn long_cells_are_truncated_and_flattened() {
        let mut table = Table::new(["Notes"]);
        table.push_row(["x".repeat(80) + "\nmore"]);
        let rendered = table.to_string();
        let last = rendered.lines().last().unwrap_or_default();
        assert!(last.ends_with("..."));
        assert_eq!(last.chars().count(), 48);
    }

    #[test]
    fn sample_cells_render_without_json_quotes() {
        assert_eq!(sample_cell(&json!("liver")), "liver");
        assert_eq!(sample_cell(&json!(3.5)), "3.5");
        assert_eq!(sample_cell(&json!(null)), "");
    }
}
