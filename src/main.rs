// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing) on stderr
// 3. Build the crawl configuration and warm the site
// 4. Print the summary (table-ish text or JSON)
// 5. Exit with proper code (0 = all warmed, 1 = some URLs failed, 2 = error)
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, WarmArgs};
use edge_warmer::{warm_site, CrawlConfig, Reporter};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG wins; otherwise only warnings, or everything from us with -v
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "edge_warmer=debug"
    } else {
        "edge_warmer=warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// Returns the process exit code
async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Warm(args) => handle_warm(args).await,
    }
}

async fn handle_warm(args: WarmArgs) -> Result<i32> {
    let config = CrawlConfig::new(&args.url)?
        .with_max_urls(args.max_urls)
        .with_max_concurrent(args.max_concurrent)
        .with_timeout(Duration::from_millis(args.timeout))
        .with_batch_delay(Duration::from_millis(args.delay))
        .with_failure_list_limit(args.failure_list_limit)
        .with_deadline(args.deadline.map(Duration::from_secs));

    // With --json, stdout is reserved for the summary document
    let reporter = if args.json {
        Reporter::stderr(config.failure_list_limit)
    } else {
        Reporter::stdout(config.failure_list_limit)
    };

    let summary = warm_site(config, reporter).await?;

    if args.json {
        let json = serde_json::to_string_pretty(&summary)
            .context("failed to serialize summary")?;
        println!("{}", json);
    }

    if summary.failed > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}
