// src/config.rs
// =============================================================================
// Defaults and environment settings.
//
// Every setting can come from (highest priority first):
// 1. A command-line flag (--data-file, --concurrency, --slack)
// 2. An environment variable (WCC_DATA_FILE, WCC_CONCURRENCY, SLACK_WEBHOOK_URL)
// 3. A .env file in the current directory (loaded into the environment)
// 4. The defaults below
//
// Logging is configured here too: WCC_LOG takes a tracing filter such as
// "wcc=debug". Without it we only show warnings, or info with --verbose.
// =============================================================================

use crate::check::DEFAULT_CONCURRENCY;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_DATA_FILE: &str = "wcc.json";

pub const ENV_DATA_FILE: &str = "WCC_DATA_FILE";
pub const ENV_CONCURRENCY: &str = "WCC_CONCURRENCY";
pub const ENV_SLACK_WEBHOOK: &str = "SLACK_WEBHOOK_URL";
pub const ENV_LOG: &str = "WCC_LOG";

pub fn default_concurrency() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_CONCURRENCY).unwrap_or(NonZeroUsize::MIN)
}

// Loads .env if there is one. Must run before the CLI is parsed so that
// clap's env fallbacks can see the values.
//
// Returns the path of the .env file that was loaded, if any; logging isn't
// set up yet at this point, so the caller logs it later.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

// Sends tracing output to stderr, keeping stdout for the report itself
pub fn init_logging(verbose: bool) {
    let fallback = if verbose { "wcc=info,warn" } else { "warn" };
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new(fallback));

    // try_init() so a second call (e.g. from tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
