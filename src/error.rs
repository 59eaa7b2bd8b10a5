// src/error.rs
// =============================================================================
// Errors that can stop a warm-up run before it gets going.
//
// Only a handful of things are fatal:
// - The seed URL doesn't parse (or isn't http/https)
// - A configuration knob is out of range (zero budget, zero concurrency...)
// - The HTTP client can't be built
//
// Everything that goes wrong *during* the crawl (404s, timeouts, bad HTML)
// is recorded in the visit cache and shows up in the summary instead.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    /// The seed URL can't be used to start a crawl
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A configuration value makes the crawl impossible
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// reqwest refused to build the shared client
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
