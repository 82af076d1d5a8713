//! Terminal rendering helpers

use std::io::Write;

use chrono::DateTime;
use evosync_domain::LogEntry;

const MESSAGE_WIDTH: usize = 50;

/// `YYYY-MM-DD HH:MM:SS` in UTC; the raw number when out of range.
pub fn format_timestamp(unix_seconds: i64) -> String {
    DateTime::from_timestamp(unix_seconds, 0)
        .map_or_else(|| unix_seconds.to_string(), |at| at.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// First `max` characters.
pub fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Plain left-aligned table with a header row.
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
        Self { headers: headers.into_iter().map(Into::into).collect(), rows: Vec::new() }
    }

    pub fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }

        let line = |cells: &[String]| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = line(&self.headers);
        out.push('\n');
        out.push_str(&widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  "));
        for row in &self.rows {
            out.push('\n');
            out.push_str(&line(row));
        }
        out
    }
}

const LOG_HEADERS: [&str; 6] = ["ID", "Type", "Severity", "Message", "Order ID", "Created"];

fn log_cells(entry: &LogEntry) -> [String; 6] {
    [
        entry.id.map(|id| id.to_string()).unwrap_or_default(),
        entry.log_type.to_string(),
        entry.severity.to_string(),
        truncate(&entry.message, MESSAGE_WIDTH),
        entry.order_id.map_or_else(|| "-".to_string(), |id| id.to_string()),
        format_timestamp(entry.created_at),
    ]
}

pub fn logs_table(entries: &[LogEntry]) -> String {
    let mut table = Table::new(LOG_HEADERS);
    for entry in entries {
        table.row(log_cells(entry));
    }
    table.render()
}

/// # Errors
/// Writer failures.
pub fn write_logs_csv<W: Write>(writer: W, entries: &[LogEntry]) -> csv::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(LOG_HEADERS)?;
    for entry in entries {
        csv_writer.write_record(log_cells(entry))?;
    }
    csv_writer.flush()?;
    Ok(())
}
