// src/report/mod.rs
// =============================================================================
// This module summarizes a finished check cycle.
//
// It produces:
// - How many websites failed and how many changed
// - A plain-text table with one row per website
// - The message we print and send to Slack when something happened
//
// Nothing here mutates the records; it only reads them.
// =============================================================================

mod table;

pub use table::render_table;

use crate::record::{Resource, Status};
use std::fmt::Write;

/// Counts and table for one set of records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub error_count: usize,
    pub updated_count: usize,
    pub report: String,
}

impl Summary {
    /// True when the operator should hear about this cycle
    pub fn should_notify(&self) -> bool {
        self.error_count > 0 || self.updated_count > 0
    }

    /// The notification text: counts first, then the table in a code block
    pub fn message(&self) -> String {
        let mut message = String::new();
        if self.error_count > 0 {
            // Writing to a String never fails, so the Result can be ignored
            let _ = writeln!(message, "{} website(s) failed to check.\n", self.error_count);
        }
        if self.updated_count > 0 {
            let _ = writeln!(message, "{} website(s) have been updated.\n", self.updated_count);
        }
        message.push_str("```\n");
        message.push_str(&self.report);
        message.push_str("```\n");
        message
    }
}

// Counts outcomes and renders the report table
pub fn summarize(records: &[Resource]) -> Summary {
    let count = |status: Status| records.iter().filter(|r| r.status == Some(status)).count();

    Summary {
        error_count: count(Status::Error),
        updated_count: count(Status::Updated),
        report: render_table(records),
    }
}
