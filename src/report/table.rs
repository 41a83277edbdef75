// src/report/table.rs
// =============================================================================
// Renders tracked websites as an aligned text table:
//
//   No. | Status    | URL                 | Selector | LastUpdated         | LastChecked
//   --- | ------    | ---                 | -------- | -----------         | -----------
//   1   | no change | https://example.com |          |                     | 2024/05/01 09:30:00
//
// Each column is padded to its widest cell. Timestamps are shown in local
// time; a website that was never checked/updated gets an empty cell.
// =============================================================================

use crate::record::Resource;
use chrono::{DateTime, Local, Utc};

const HEADER: [&str; 6] = ["No.", "Status", "URL", "Selector", "LastUpdated", "LastChecked"];
const SEPARATOR: &str = " | ";
const TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

pub fn render_table(records: &[Resource]) -> String {
    let mut rows: Vec<[String; 6]> = Vec::with_capacity(records.len() + 2);
    rows.push(HEADER.map(String::from));
    rows.push(HEADER.map(|title| "-".repeat(title.len())));

    for (i, record) in records.iter().enumerate() {
        rows.push([
            (i + 1).to_string(),
            record.status.map(|s| s.to_string()).unwrap_or_default(),
            record.locator.clone(),
            record.selector.clone(),
            format_timestamp(record.last_updated_at),
            format_timestamp(record.last_checked_at),
        ]);
    }

    // Width of each column = its longest cell (in characters, not bytes)
    let mut widths = [0usize; 6];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in &rows {
        let last = row.len() - 1;
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(col, cell)| {
                if col == last {
                    // No trailing padding on the last column
                    cell.clone()
                } else {
                    format!("{:<width$}", cell, width = widths[col])
                }
            })
            .collect();
        out.push_str(&line.join(SEPARATOR));
        out.push('\n');
    }
    out
}

pub fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp
        .map(|t| t.with_timezone(&Local).format(TIME_FORMAT).to_string())
        .unwrap_or_default()
}
