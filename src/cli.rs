// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API, which lets us describe the CLI as plain Rust
// structs and enums and have clap generate the parsing, --help and
// validation for us.
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Enums: Types that can be one of several variants
// - Derive macros: Automatically generate code for our types
// =============================================================================

use clap::{Args, Parser, Subcommand};
use edge_warmer::config::{
    DEFAULT_BATCH_DELAY_MS, DEFAULT_FAILURE_LIST_LIMIT, DEFAULT_MAX_CONCURRENT, DEFAULT_MAX_URLS,
    DEFAULT_TIMEOUT_MS,
};

#[derive(Parser, Debug)]
#[command(
    name = "edge-warmer",
    version,
    about = "Crawl a website to warm its edge/CDN cache",
    long_about = "edge-warmer crawls a single site breadth-first and requests every same-origin \
                  page, stylesheet, script, image and font it finds, so the edge cache is \
                  populated before real users arrive."
)]
pub struct Cli {
    /// Print debug logs to stderr (RUST_LOG overrides this)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Warm the cache for a website
    ///
    /// Example: edge-warmer warm https://example.com --max-concurrent 4
    Warm(WarmArgs),
}

#[derive(Args, Debug)]
pub struct WarmArgs {
    /// Seed URL; only links on its host are followed
    pub url: String,

    /// Maximum number of URLs to fetch
    #[arg(long, default_value_t = DEFAULT_MAX_URLS)]
    pub max_urls: usize,

    /// Maximum number of requests in flight at once (the batch size)
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT)]
    pub max_concurrent: usize,

    /// Per-request timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout: u64,

    /// Pause between batches in milliseconds
    #[arg(long, default_value_t = DEFAULT_BATCH_DELAY_MS)]
    pub delay: u64,

    /// List failed URLs in the summary only when there are at most this many
    #[arg(long, default_value_t = DEFAULT_FAILURE_LIST_LIMIT)]
    pub failure_list_limit: usize,

    /// Stop starting new batches after this many seconds
    #[arg(long)]
    pub deadline: Option<u64>,

    /// Print the final summary as JSON (progress moves to stderr)
    #[arg(long)]
    pub json: bool,
}
