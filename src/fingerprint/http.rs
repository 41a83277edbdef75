// src/fingerprint/http.rs
// =============================================================================
// This module fetches websites over HTTP and fingerprints them.
//
// Key functionality:
// - Makes an HTTP GET request for the page body
// - Treats transport errors and non-2xx answers as fetch failures
// - Hands the body to html.rs for selector matching and hashing
//
// No request timeout is set: a hanging server keeps its concurrency slot
// until it answers or the connection drops.
//
// Rust concepts:
// - async/await: For network I/O
// - map_err: To convert reqwest errors into our own error type
// =============================================================================

use super::html::fingerprint_html;
use super::{ExtractError, Extractor};
use crate::record::Fingerprint;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};

// Identifies us to the websites we poll
const USER_AGENT: &str = concat!("wcc/", env!("CARGO_PKG_VERSION"));

/// Fetches pages with a shared reqwest client
///
/// Cloning a reqwest Client is cheap (it's reference counted internally),
/// and one client gives us connection pooling across the whole cycle.
#[derive(Debug, Clone)]
pub struct HttpExtractor {
    client: Client,
}

impl HttpExtractor {
    pub fn new() -> reqwest::Result<Self> {
        let client = Self::client_builder().build()?;
        Ok(HttpExtractor { client })
    }

    // Client settings shared by new() and the tests
    fn client_builder() -> ClientBuilder {
        Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
    }

    // Fetches a web page and returns its HTML content
    async fn fetch_page(&self, url: &str) -> Result<String, ExtractError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ExtractError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Fetch(format!("HTTP {}", status.as_u16())));
        }

        response
            .text()
            .await
            .map_err(|e| ExtractError::Fetch(e.to_string()))
    }
}

#[async_trait]
impl Extractor for HttpExtractor {
    async fn extract(&self, locator: &str, selector: &str) -> Result<Fingerprint, ExtractError> {
        tracing::debug!(url = locator, selector, "fetching page");
        let html = self.fetch_page(locator).await?;
        fingerprint_html(&html, selector)
    }
}
