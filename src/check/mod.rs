// src/check/mod.rs
// =============================================================================
// This module runs a check cycle over every tracked website.
//
// Features:
// - One concurrent check per website
// - At most N fingerprint extractions in flight (a counting semaphore)
// - Every website gets a status, even when its fetch fails
//
// Rust concepts:
// - Semaphore: A pool of permits shared between tasks
// - &mut borrows: Each check owns exactly one record while it runs
// =============================================================================

mod cycle;

pub use cycle::{run_check_cycle, DEFAULT_CONCURRENCY};
