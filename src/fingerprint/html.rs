// src/fingerprint/html.rs
// =============================================================================
// This module picks the text we fingerprint out of an HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
//
// The fingerprint is a SHA-256 digest of that text, written as 64 lowercase
// hex characters. Same text in, same fingerprint out.
//
// Rust concepts:
// - Result<T, E>: For operations that can fail
// - Iterators: element.text() yields every text node under an element
// =============================================================================

use super::ExtractError;
use crate::record::Fingerprint;
use scraper::{Html, Selector};
use sha2::{Digest, Sha256};

// Computes the fingerprint of an HTML page
//
// Parameters:
//   html: the page body
//   selector: CSS selector, or "" for the whole document
//
// Returns: the fingerprint of the first matching element's text
pub fn fingerprint_html(html: &str, selector: &str) -> Result<Fingerprint, ExtractError> {
    let text = extract_text(html, selector)?;
    Ok(digest_text(&text))
}

// Hashes text into a fingerprint
pub fn digest_text(text: &str) -> Fingerprint {
    let digest = Sha256::digest(text.as_bytes());
    Fingerprint::from(hex::encode(digest))
}

// Returns the text content we should fingerprint
//
// Html is not Send, so this stays a plain (non-async) function: the
// document never lives across an .await.
fn extract_text(html: &str, selector: &str) -> Result<String, ExtractError> {
    let document = Html::parse_document(html);

    if selector.is_empty() {
        return Ok(document.root_element().text().collect());
    }

    // Unlike the fixed selectors elsewhere, this one comes from the user,
    // so a parse failure is an error and never an unwrap()
    let parsed = Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })?;

    document
        .select(&parsed)
        .next()
        .map(|element| element.text().collect())
        .ok_or_else(|| ExtractError::SelectorNotFound(selector.to_string()))
}

// Checks that a selector parses, without needing a page
//
// Used when registering a website so typos are caught up front.
pub fn validate_selector(selector: &str) -> Result<(), ExtractError> {
    if selector.is_empty() {
        return Ok(());
    }
    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ExtractError::InvalidSelector {
            selector: selector.to_string(),
            reason: e.to_string(),
        })
}
