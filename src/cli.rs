// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Commands:
//   wcc add <URL> [SELECTOR]   start tracking a website
//   wcc rm <INDEX>             stop tracking (index from `wcc list`)
//   wcc list                   show tracked websites
//   wcc check                  check everything for changes
// =============================================================================

use crate::config;
use clap::{Parser, Subcommand};
use std::num::NonZeroUsize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "wcc",
    version,
    about = "Track websites and find out when their content changes",
    long_about = "wcc remembers a fingerprint of each website you add. `wcc check` fetches them \
                  all again and reports which ones changed or could not be fetched, optionally \
                  posting the report to a Slack webhook."
)]
pub struct Cli {
    /// Where the list of tracked websites is stored
    #[arg(long, global = true, env = config::ENV_DATA_FILE, default_value = config::DEFAULT_DATA_FILE)]
    pub data_file: PathBuf,

    /// Show progress logs on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a website to check for updates
    ///
    /// Example: wcc add https://example.com/news "#headlines"
    Add {
        /// Website URL (http or https)
        url: String,

        /// CSS selector; only the first matching element is compared.
        /// Leave it out to compare the whole page.
        selector: Option<String>,
    },

    /// Remove a website from the list
    ///
    /// Example: wcc rm 2
    Rm {
        /// Position shown by `wcc list` (starts at 1)
        index: usize,
    },

    /// Show the tracked websites
    List {
        /// Output the records as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Check every website for updates
    ///
    /// Example: wcc check --slack https://hooks.slack.com/services/...
    Check {
        /// Slack incoming webhook to notify when something changed or failed
        #[arg(long, env = config::ENV_SLACK_WEBHOOK)]
        slack: Option<String>,

        /// How many websites to fetch at the same time
        #[arg(long, env = config::ENV_CONCURRENCY, default_value_t = config::default_concurrency())]
        concurrency: NonZeroUsize,

        /// Output the records as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}
