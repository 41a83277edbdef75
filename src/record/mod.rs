// src/record/mod.rs
// =============================================================================
// This module defines what we remember about each tracked website.
//
// A Resource is plain data:
// - Who it is: the URL and an optional CSS selector (never change)
// - What we last saw: fingerprint, status, last error, timestamps
//
// The check cycle (src/check/) is the only code that mutates the
// "what we last saw" fields. Everything else just reads them.
//
// Rust concepts:
// - Option<T>: For fields that are empty before the first check
// - Enums with data: To store a failure kind together with its details
// - serde derives: So the whole record can be saved to and loaded from disk
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A content fingerprint: the hex digest of the text we extracted.
///
/// `#[serde(transparent)]` makes it serialize as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Fingerprint {
    fn from(value: String) -> Self {
        Fingerprint(value)
    }
}

impl From<&str> for Fingerprint {
    fn from(value: &str) -> Self {
        Fingerprint(value.to_string())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the most recent check of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Fingerprint matched the stored one
    Unchanged,
    /// Fingerprint differed (or this was the first successful check)
    Updated,
    /// The check failed, see `Resource::last_error`
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Unchanged => "no change",
            Status::Updated => "updated",
            Status::Error => "error",
        };
        f.write_str(label)
    }
}

/// Which step of a check went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Fetch,
    SelectorNotFound,
    InvalidSelector,
}

/// A failure stored inline on the record.
///
/// We keep a kind plus a message rather than the error object itself,
/// so the record stays serializable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFailure {
    pub kind: FailureKind,
    pub detail: String,
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.detail)
    }
}

/// One tracked website and its last-known state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// The URL we fetch
    pub locator: String,
    /// CSS selector narrowing the fingerprinted text ("" = whole page)
    #[serde(default)]
    pub selector: String,
    /// Last fingerprint we saw (None until the first successful extraction)
    #[serde(default)]
    pub fingerprint: Option<Fingerprint>,
    /// Result of the last check (None until the first check)
    #[serde(default)]
    pub status: Option<Status>,
    /// Set only while status == Error
    #[serde(default)]
    pub last_error: Option<CheckFailure>,
    /// When the fingerprint last changed
    #[serde(default)]
    pub last_updated_at: Option<DateTime<Utc>>,
    /// When the last check started
    #[serde(default)]
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl Resource {
    /// Creates a record that has never been checked
    pub fn new(locator: impl Into<String>, selector: impl Into<String>) -> Self {
        Resource {
            locator: locator.into(),
            selector: selector.into(),
            fingerprint: None,
            status: None,
            last_error: None,
            last_updated_at: None,
            last_checked_at: None,
        }
    }

    /// Builder-style helper for records registered with a known fingerprint
    pub fn with_fingerprint(mut self, fingerprint: Fingerprint) -> Self {
        self.fingerprint = Some(fingerprint);
        self
    }
}
