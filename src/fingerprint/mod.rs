// src/fingerprint/mod.rs
// =============================================================================
// This module turns a website into a fingerprint.
//
// Submodules:
// - http: Fetches the page over the network (HttpExtractor)
// - html: Picks the text to fingerprint and hashes it
//
// The Extractor trait is the seam the check cycle talks to. The real
// implementation goes to the network; tests plug in fakes.
//
// Rust concepts:
// - Traits: Shared behavior that different types can implement
// - async-trait: Lets a trait have async methods
// - thiserror: Derives std::error::Error for our error enum
// =============================================================================

mod html;
mod http;

pub use html::validate_selector;
pub use http::HttpExtractor;

use crate::record::{CheckFailure, FailureKind, Fingerprint};
use async_trait::async_trait;
use thiserror::Error;

/// Everything that can go wrong while fingerprinting one website
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Network/transport failure, non-2xx status, or unreadable body
    #[error("failed to get the website: {0}")]
    Fetch(String),

    /// The selector was valid but matched no element
    #[error("selector '{0}' did not match anything")]
    SelectorNotFound(String),

    /// The selector could not be parsed as CSS
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
}

impl ExtractError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ExtractError::Fetch(_) => FailureKind::Fetch,
            ExtractError::SelectorNotFound(_) => FailureKind::SelectorNotFound,
            ExtractError::InvalidSelector { .. } => FailureKind::InvalidSelector,
        }
    }
}

impl From<&ExtractError> for CheckFailure {
    fn from(error: &ExtractError) -> Self {
        CheckFailure {
            kind: error.kind(),
            detail: error.to_string(),
        }
    }
}

/// Something that can compute the current fingerprint of a website.
///
/// `selector` is empty when the whole page should be fingerprinted.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, locator: &str, selector: &str) -> Result<Fingerprint, ExtractError>;
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a trait instead of calling HttpExtractor directly?
//    - The check cycle only needs "give me a fingerprint for this URL"
//    - Tests can count how many extractions run at once, or fail on purpose,
//      without touching the network
//
// 2. Why Send + Sync?
//    - The extractor is shared by every check running in a cycle
//    - Send + Sync promise the compiler that sharing it across tasks is safe
//
// 3. What does #[async_trait] do?
//    - It rewrites `async fn` in the trait into a method returning a boxed
//      future, which is what lets us use it behind a reference
// -----------------------------------------------------------------------------
