// src/check/cycle.rs
// =============================================================================
// This module implements one check cycle.
//
// How it works:
// 1. Note the cycle start time once
// 2. Build one future per record; each future borrows only its own record
// 3. Each future stamps last_checked_at, waits for a semaphore permit,
//    asks the extractor for a fingerprint, and releases the permit
// 4. The outcome is written back into the record in a single step
// 5. join_all() waits until every future has finished
//
// The permit is an RAII guard: it is returned to the pool when it goes out
// of scope, on the success path and on every error path alike.
//
// Rust concepts:
// - join_all: Runs many futures concurrently and waits for all of them
// - Semaphore permits: Released automatically when dropped
// - NonZeroUsize: A limit of zero can't even be constructed
// =============================================================================

use crate::fingerprint::{ExtractError, Extractor};
use crate::record::{CheckFailure, Fingerprint, Resource, Status};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::num::NonZeroUsize;
use tokio::sync::Semaphore;

/// How many extractions may run at once unless configured otherwise
pub const DEFAULT_CONCURRENCY: usize = 5;

// Checks every record, mutating each one in place
//
// Parameters:
//   records: the tracked websites, in their saved order
//   extractor: computes the current fingerprint of one website
//   limit: the maximum number of extractions running at the same time
//
// Returns once every record has been checked. The order of `records` is
// never changed, only their state fields.
pub async fn run_check_cycle<E>(records: &mut [Resource], extractor: &E, limit: NonZeroUsize)
where
    E: Extractor + ?Sized,
{
    if records.is_empty() {
        return;
    }

    let started_at = Utc::now();
    let slots = Semaphore::new(limit.get());

    tracing::info!(
        websites = records.len(),
        concurrency = limit.get(),
        "starting check cycle"
    );

    // iter_mut() hands out one &mut per record, so no two checks can ever
    // touch the same record and no lock is needed around record data
    let checks = records
        .iter_mut()
        .map(|record| check_one(record, extractor, &slots, started_at));
    join_all(checks).await;

    let updated = records
        .iter()
        .filter(|r| r.status == Some(Status::Updated))
        .count();
    let failed = records
        .iter()
        .filter(|r| r.status == Some(Status::Error))
        .count();
    tracing::info!(updated, failed, "check cycle finished");
}

// Checks a single record
async fn check_one<E>(
    record: &mut Resource,
    extractor: &E,
    slots: &Semaphore,
    started_at: DateTime<Utc>,
) where
    E: Extractor + ?Sized,
{
    record.last_checked_at = Some(started_at);

    let result = match slots.acquire().await {
        Ok(_permit) => extractor.extract(&record.locator, &record.selector).await,
        // Only happens if the semaphore were closed, which we never do
        Err(e) => Err(ExtractError::Fetch(format!("no check slot available: {}", e))),
    };

    let outcome = match result {
        Ok(fingerprint) => {
            tracing::debug!(url = %record.locator, %fingerprint, "fingerprint extracted");
            Ok(fingerprint)
        }
        Err(e) => {
            tracing::warn!(url = %record.locator, error = %e, "check failed");
            Err(CheckFailure::from(&e))
        }
    };

    apply_outcome(record, outcome, started_at);
}

// Writes the outcome of one check into its record
//
// status, fingerprint, last_error and last_updated_at all change here
// together, through one &mut borrow, so nobody can observe a new status
// paired with an old fingerprint.
fn apply_outcome(
    record: &mut Resource,
    outcome: Result<Fingerprint, CheckFailure>,
    checked_at: DateTime<Utc>,
) {
    match outcome {
        Err(failure) => {
            record.status = Some(Status::Error);
            record.last_error = Some(failure);
        }
        Ok(fingerprint) if record.fingerprint.as_ref() == Some(&fingerprint) => {
            record.status = Some(Status::Unchanged);
            record.last_error = None;
        }
        Ok(fingerprint) => {
            record.status = Some(Status::Updated);
            record.last_error = None;
            record.last_updated_at = Some(checked_at);
            record.fingerprint = Some(fingerprint);
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why join_all instead of tokio::spawn?
//    - tokio::spawn needs 'static data, so records would have to be wrapped
//      in Arc<Mutex<...>> and copied back afterwards
//    - join_all polls all futures on the current task; they still run
//      concurrently because each one yields while waiting on the network
//    - Each future borrows its own record, and the borrow checker proves
//      no two futures share one
//
// 2. Why a Semaphore?
//    - It holds `limit` permits
//    - acquire() waits until a permit is free
//    - Dropping the permit gives it back, even if extract() returned an error
//
// 3. Why is started_at computed once?
//    - Every record checked in the same cycle gets the same timestamp,
//      which makes the report easy to read
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FailureKind;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    // A fake extractor that answers from a table and records concurrency
    struct FakeExtractor {
        answers: HashMap<String, Result<String, &'static str>>,
        delay: Duration,
        active: AtomicUsize,
        max_active: AtomicUsize,
        calls: AtomicUsize,
        finished: Mutex<Vec<String>>,
    }

    impl FakeExtractor {
        fn new(answers: &[(&str, Result<&str, &'static str>)]) -> Self {
            FakeExtractor {
                answers: answers
                    .iter()
                    .map(|(url, answer)| (url.to_string(), (*answer).map(|s| s.to_string())))
                    .collect(),
                delay: Duration::from_millis(0),
                active: AtomicUsize::new(0),
                max_active: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
                finished: Mutex::new(Vec::new()),
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    #[async_trait]
    impl Extractor for FakeExtractor {
        async fn extract(&self, locator: &str, _selector: &str) -> Result<Fingerprint, ExtractError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);

            tokio::time::sleep(self.delay).await;

            self.active.fetch_sub(1, Ordering::SeqCst);
            self.finished.lock().unwrap().push(locator.to_string());

            match self.answers.get(locator) {
                Some(Ok(fp)) => Ok(Fingerprint::from(fp.as_str())),
                Some(Err(message)) => Err(ExtractError::Fetch(message.to_string())),
                None => Err(ExtractError::Fetch("unknown url".to_string())),
            }
        }
    }

    fn limit(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_empty_cycle_does_nothing() {
        let extractor = FakeExtractor::new(&[]);
        let mut records: Vec<Resource> = Vec::new();
        run_check_cycle(&mut records, &extractor, limit(5)).await;
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_first_check_marks_updated() {
        let extractor = FakeExtractor::new(&[("https://a.test", Ok("abc"))]);
        let mut records = vec![Resource::new("https://a.test", "")];

        run_check_cycle(&mut records, &extractor, limit(5)).await;

        let record = &records[0];
        assert_eq!(record.status, Some(Status::Updated));
        assert_eq!(record.fingerprint, Some(Fingerprint::from("abc")));
        assert!(record.last_updated_at.is_some());
        assert_eq!(record.last_updated_at, record.last_checked_at);
        assert!(record.last_error.is_none());
    }

    #[tokio::test]
    async fn test_same_fingerprint_is_unchanged() {
        let extractor = FakeExtractor::new(&[("https://a.test", Ok("abc"))]);
        let mut records = vec![Resource::new("https://a.test", "").with_fingerprint("abc".into())];

        run_check_cycle(&mut records, &extractor, limit(5)).await;

        let record = &records[0];
        assert_eq!(record.status, Some(Status::Unchanged));
        assert_eq!(record.fingerprint, Some(Fingerprint::from("abc")));
        assert!(record.last_updated_at.is_none());
        assert!(record.last_checked_at.is_some());
    }

    #[tokio::test]
    async fn test_fetch_error_keeps_fingerprint() {
        let extractor = FakeExtractor::new(&[("https://a.test", Err("connection refused"))]);
        let mut records = vec![Resource::new("https://a.test", "").with_fingerprint("abc".into())];

        run_check_cycle(&mut records, &extractor, limit(5)).await;

        let record = &records[0];
        assert_eq!(record.status, Some(Status::Error));
        let failure = record.last_error.as_ref().unwrap();
        assert_eq!(failure.kind, FailureKind::Fetch);
        assert!(failure.detail.contains("connection refused"));
        assert_eq!(record.fingerprint, Some(Fingerprint::from("abc")));
        assert!(record.last_updated_at.is_none());
    }

    #[tokio::test]
    async fn test_success_clears_previous_error() {
        let extractor = FakeExtractor::new(&[("https://a.test", Ok("abc"))]);
        let mut record = Resource::new("https://a.test", "").with_fingerprint("abc".into());
        record.status = Some(Status::Error);
        record.last_error = Some(CheckFailure {
            kind: FailureKind::Fetch,
            detail: "timed out".to_string(),
        });
        let mut records = vec![record];

        run_check_cycle(&mut records, &extractor, limit(1)).await;

        assert_eq!(records[0].status, Some(Status::Unchanged));
        assert!(records[0].last_error.is_none());
    }

    #[tokio::test]
    async fn test_second_cycle_is_idempotent() {
        let extractor = FakeExtractor::new(&[
            ("https://a.test", Ok("1")),
            ("https://b.test", Ok("2")),
            ("https://c.test", Ok("3")),
        ]);
        let mut records = vec![
            Resource::new("https://a.test", ""),
            Resource::new("https://b.test", "#x"),
            Resource::new("https://c.test", ""),
        ];

        run_check_cycle(&mut records, &extractor, limit(2)).await;
        let after_first = records.clone();

        run_check_cycle(&mut records, &extractor, limit(2)).await;

        for (before, after) in after_first.iter().zip(&records) {
            assert_eq!(after.status, Some(Status::Unchanged));
            assert_eq!(after.fingerprint, before.fingerprint);
            assert_eq!(after.last_updated_at, before.last_updated_at);
            assert!(after.last_checked_at >= before.last_checked_at);
        }
    }

    #[tokio::test]
    async fn test_every_record_checked_and_order_kept() {
        let urls: Vec<String> = (0..12).map(|i| format!("https://site{}.test", i)).collect();
        let answers: Vec<(&str, Result<&str, &'static str>)> =
            urls.iter().map(|u| (u.as_str(), Ok("same"))).collect();
        let extractor = FakeExtractor::new(&answers);
        let mut records: Vec<Resource> = urls.iter().map(|u| Resource::new(u.as_str(), "")).collect();

        run_check_cycle(&mut records, &extractor, limit(3)).await;

        assert_eq!(records.len(), urls.len());
        for (record, url) in records.iter().zip(&urls) {
            assert_eq!(&record.locator, url);
            assert!(record.last_checked_at.is_some());
        }
        assert_eq!(extractor.calls.load(Ordering::SeqCst), urls.len());
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_limit() {
        let urls: Vec<String> = (0..20).map(|i| format!("https://site{}.test", i)).collect();
        let answers: Vec<(&str, Result<&str, &'static str>)> =
            urls.iter().map(|u| (u.as_str(), Ok("fp"))).collect();
        let extractor = FakeExtractor::new(&answers).with_delay(Duration::from_millis(10));
        let mut records: Vec<Resource> = urls.iter().map(|u| Resource::new(u.as_str(), "")).collect();

        run_check_cycle(&mut records, &extractor, limit(4)).await;

        let max = extractor.max_active.load(Ordering::SeqCst);
        assert!(max <= 4, "saw {} extractions at once", max);
        // With 20 slow records the pool should actually fill up
        assert_eq!(max, 4);
        assert_eq!(extractor.active.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failures_release_their_slot() {
        // Every fetch fails; with one slot, a leaked permit would hang the cycle
        let urls: Vec<String> = (0..6).map(|i| format!("https://down{}.test", i)).collect();
        let answers: Vec<(&str, Result<&str, &'static str>)> =
            urls.iter().map(|u| (u.as_str(), Err("boom"))).collect();
        let extractor = FakeExtractor::new(&answers);
        let mut records: Vec<Resource> = urls.iter().map(|u| Resource::new(u.as_str(), "")).collect();

        let cycle = run_check_cycle(&mut records, &extractor, limit(1));
        tokio::time::timeout(Duration::from_secs(5), cycle)
            .await
            .expect("cycle should not hang after failed checks");

        assert!(records.iter().all(|r| r.status == Some(Status::Error)));
    }

    #[tokio::test]
    async fn test_failure_does_not_touch_siblings() {
        let extractor = FakeExtractor::new(&[
            ("https://ok.test", Ok("old")),
            ("https://down.test", Err("dns error")),
            ("https://new.test", Ok("fresh")),
        ]);
        let long_ago = Utc.with_ymd_and_hms(2023, 1, 15, 12, 0, 0).unwrap();
        let mut healthy = Resource::new("https://ok.test", "").with_fingerprint("old".into());
        healthy.last_updated_at = Some(long_ago);
        let mut records = vec![
            healthy,
            Resource::new("https://down.test", ""),
            Resource::new("https://new.test", "").with_fingerprint("stale".into()),
        ];

        // One slot, so the checks run one after another
        run_check_cycle(&mut records, &extractor, limit(1)).await;

        assert_eq!(records[0].status, Some(Status::Unchanged));
        assert_eq!(records[0].fingerprint, Some(Fingerprint::from("old")));
        assert!(records[0].last_error.is_none());
        assert_eq!(records[0].last_updated_at, Some(long_ago));
        assert!(records[0].last_checked_at.is_some());

        assert_eq!(records[1].status, Some(Status::Error));
        assert_eq!(records[1].fingerprint, None);
        assert_eq!(records[1].last_updated_at, None);

        assert_eq!(records[2].status, Some(Status::Updated));
        assert_eq!(records[2].fingerprint, Some(Fingerprint::from("fresh")));
        assert!(records[2].last_error.is_none());
        assert_eq!(records[2].last_updated_at, records[2].last_checked_at);
    }

    #[tokio::test]
    async fn test_single_slot_waits_for_all() {
        let extractor = FakeExtractor::new(&[
            ("https://one.test", Ok("1")),
            ("https://two.test", Err("refused")),
            ("https://three.test", Ok("3")),
        ])
        .with_delay(Duration::from_millis(5));
        let mut records = vec![
            Resource::new("https://one.test", ""),
            Resource::new("https://two.test", ""),
            Resource::new("https://three.test", ""),
        ];

        run_check_cycle(&mut records, &extractor, limit(1)).await;

        assert_eq!(extractor.finished.lock().unwrap().len(), 3);
        assert_eq!(extractor.max_active.load(Ordering::SeqCst), 1);
        let statuses: Vec<_> = records.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![Some(Status::Updated), Some(Status::Error), Some(Status::Updated)]
        );
    }
}
