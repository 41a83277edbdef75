// src/commands.rs
// =============================================================================
// The work behind each subcommand, without any printing.
//
// Each function takes the store (and extractor/notifier where needed) as a
// parameter, so tests can drive the real workflow with a temp-dir store
// and fake network pieces. main.rs decides what to print and which exit
// code to use.
// =============================================================================

use crate::check::run_check_cycle;
use crate::fingerprint::{validate_selector, ExtractError, Extractor};
use crate::notify::{NotifyError, Notifier};
use crate::record::Resource;
use crate::report::{summarize, Summary};
use crate::store::{ResourceStore, StoreError};
use std::num::NonZeroUsize;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum CommandError {
    /// The user asked for something impossible (bad URL, bad index, ...)
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A new website could not be fingerprinted, so it was not added
    #[error("failed to access {url}: {source}")]
    Register { url: String, source: ExtractError },
}

impl CommandError {
    pub fn is_usage(&self) -> bool {
        matches!(self, CommandError::Usage(_))
    }
}

/// What `check` hands back to the caller
#[derive(Debug)]
pub struct CheckRun {
    /// Records after the cycle, in their saved order
    pub records: Vec<Resource>,
    pub summary: Summary,
}

// Registers a website after fetching its first fingerprint
pub async fn add<S, E>(
    store: &S,
    extractor: &E,
    url: &str,
    selector: &str,
) -> Result<Vec<Resource>, CommandError>
where
    S: ResourceStore + ?Sized,
    E: Extractor + ?Sized,
{
    validate_url(url)?;
    validate_selector(selector).map_err(|e| CommandError::Usage(e.to_string()))?;

    let mut records = store.load()?;

    let fingerprint = extractor
        .extract(url, selector)
        .await
        .map_err(|source| CommandError::Register {
            url: url.to_string(),
            source,
        })?;

    records.push(Resource::new(url, selector).with_fingerprint(fingerprint));
    store.save(&records)?;

    tracing::info!(url, selector, websites = records.len(), "website added");
    Ok(records)
}

// Removes the website at a 1-based position
pub fn remove<S>(store: &S, index: usize) -> Result<Vec<Resource>, CommandError>
where
    S: ResourceStore + ?Sized,
{
    let mut records = store.load()?;

    if index == 0 || index > records.len() {
        return Err(CommandError::Usage(format!(
            "index {} is out of range (1..={})",
            index,
            records.len()
        )));
    }

    let removed = records.remove(index - 1);
    store.save(&records)?;

    tracing::info!(url = %removed.locator, "website removed");
    Ok(records)
}

pub fn list<S>(store: &S) -> Result<Vec<Resource>, CommandError>
where
    S: ResourceStore + ?Sized,
{
    Ok(store.load()?)
}

// Runs one check cycle and saves the results
//
// Returns Ok(None) when nothing is registered (nothing is saved either).
// If saving fails the error is returned and the in-memory results are lost;
// running `wcc check` again is safe.
pub async fn check<S, E>(
    store: &S,
    extractor: &E,
    concurrency: NonZeroUsize,
) -> Result<Option<CheckRun>, CommandError>
where
    S: ResourceStore + ?Sized,
    E: Extractor + ?Sized,
{
    let mut records = store.load()?;
    if records.is_empty() {
        return Ok(None);
    }

    run_check_cycle(&mut records, extractor, concurrency).await;
    store.save(&records)?;

    let summary = summarize(&records);
    Ok(Some(CheckRun { records, summary }))
}

// Sends the report if anything changed or failed
//
// Returns Ok(true) when a message was sent, Ok(false) when there was
// nothing worth sending or no notifier configured.
pub async fn notify_if_needed<N>(summary: &Summary, notifier: Option<&N>) -> Result<bool, NotifyError>
where
    N: Notifier + ?Sized,
{
    let Some(notifier) = notifier else {
        return Ok(false);
    };
    if !summary.should_notify() {
        tracing::debug!("nothing changed, skipping notification");
        return Ok(false);
    }

    notifier.send(&summary.message()).await?;
    Ok(true)
}

// Only http(s) URLs can be fetched
fn validate_url(url: &str) -> Result<(), CommandError> {
    let parsed = Url::parse(url).map_err(|e| CommandError::Usage(format!("invalid URL '{}': {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(CommandError::Usage(format!(
            "unsupported URL scheme '{}' (use http or https)",
            other
        ))),
    }
}
