// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Load .env, parse command-line arguments, set up logging
// 2. Dispatch to the appropriate subcommand (src/commands.rs)
// 3. Print the table / report / JSON
// 4. Exit with proper code (0 = success, 1 = operational error, 2 = usage error)
//
// Rust concepts used:
// - async/await: Because a check makes many network requests concurrently
// - Result<T, E>: For error handling (T = success type, E = error type)
// - match: Pattern matching to handle different subcommands
// =============================================================================

// Module declarations - tells Rust about our other source files
mod check;         // src/check/ - the concurrent check cycle
mod cli;           // src/cli.rs - command-line parsing
mod commands;      // src/commands.rs - what each subcommand does
mod config;        // src/config.rs - defaults, env vars, logging setup
mod fingerprint;   // src/fingerprint/ - fetch a page and hash its text
mod notify;        // src/notify/ - Slack webhook
mod record;        // src/record/ - what we remember per website
mod report;        // src/report/ - counts and the text table
mod store;         // src/store/ - the JSON data file

#[cfg(test)]
mod test_support;

use clap::Parser;  // Parser trait enables the parse() method
use cli::{Cli, Commands};
use commands::CommandError;
use fingerprint::HttpExtractor;
use notify::SlackNotifier;
use record::Resource;
use store::JsonFileStore;

// anyhow::Result lets us return any error type with the ? operator
// and attach context messages on the way up
use anyhow::{Context, Result};

const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

#[tokio::main]
async fn main() {
    // .env has to be loaded before clap reads environment fallbacks
    let dotenv_path = config::load_dotenv();
    let cli = Cli::parse();
    config::init_logging(cli.verbose);
    if let Some(path) = dotenv_path {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let exit_code = match run(cli).await {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            if e.downcast_ref::<CommandError>().is_some_and(CommandError::is_usage) {
                EXIT_USAGE
            } else {
                EXIT_ERROR
            }
        }
    };

    std::process::exit(exit_code);
}

// This is the main application logic
async fn run(cli: Cli) -> Result<()> {
    let store = JsonFileStore::new(&cli.data_file);
    tracing::debug!(path = %store.path().display(), "using data file");

    match cli.command {
        Commands::Add { url, selector } => {
            let extractor = HttpExtractor::new().context("failed to create HTTP client")?;
            let selector = selector.unwrap_or_default();
            let records = commands::add(&store, &extractor, &url, &selector).await?;
            print_records(&records, false)?;
        }
        Commands::Rm { index } => {
            let records = commands::remove(&store, index)?;
            print_records(&records, false)?;
        }
        Commands::List { json } => {
            let records = commands::list(&store)?;
            print_records(&records, json)?;
        }
        Commands::Check { slack, concurrency, json } => {
            handle_check(&store, slack, concurrency, json).await?;
        }
    }

    Ok(())
}

// Handles the 'check' subcommand
//
// Order matters: the cycle runs, results are saved, the report is printed,
// and only then do we try Slack. A Slack failure can't lose any results.
async fn handle_check(
    store: &JsonFileStore,
    slack: Option<String>,
    concurrency: std::num::NonZeroUsize,
    json: bool,
) -> Result<()> {
    let extractor = HttpExtractor::new().context("failed to create HTTP client")?;

    let Some(run) = commands::check(store, &extractor, concurrency).await? else {
        println!("No websites registered yet. Add one with `wcc add <URL>`.");
        return Ok(());
    };

    if json {
        print_records(&run.records, true)?;
    } else if run.summary.should_notify() {
        println!("{}", run.summary.message());
    } else {
        print!("{}", run.summary.report);
    }

    let notifier = slack.filter(|url| !url.is_empty()).map(SlackNotifier::new);
    commands::notify_if_needed(&run.summary, notifier.as_ref())
        .await
        .context("check results were saved, but the notification was not delivered")?;

    Ok(())
}

// Prints records either as a table or JSON
fn print_records(records: &[Resource], json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(records)?;
        println!("{}", json_output);
    } else {
        print!("{}", report::render_table(records));
    }
    Ok(())
}
