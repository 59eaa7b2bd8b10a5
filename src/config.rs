// src/config.rs
// =============================================================================
// Crawl configuration.
//
// A CrawlConfig is created once from the seed URL, tweaked with the builder
// methods, validated, and then handed to the crawler. From that point on it
// never changes: every fetch task reads the same values.
//
// Rust concepts:
// - Builder pattern: `with_*` methods take `self` and return `Self`
// - Duration: Typed time spans instead of raw millisecond integers
// =============================================================================

use crate::error::CrawlError;
use std::time::Duration;
use url::Url;

/// Upper bound on total fetch attempts
pub const DEFAULT_MAX_URLS: usize = 1500;
/// Batch size / concurrency ceiling
pub const DEFAULT_MAX_CONCURRENT: usize = 2;
/// Per-request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 8000;
/// Pause between batches in milliseconds
pub const DEFAULT_BATCH_DELAY_MS: u64 = 100;
/// Failed URLs are only listed in the summary when there are at most this many
pub const DEFAULT_FAILURE_LIST_LIMIT: usize = 10;

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Where the crawl starts; its host bounds the crawl
    pub seed: Url,
    pub max_urls: usize,
    pub max_concurrent: usize,
    pub timeout: Duration,
    pub batch_delay: Duration,
    pub failure_list_limit: usize,
    /// Optional crawl-wide wall-clock limit, checked between batches
    pub deadline: Option<Duration>,
}

impl CrawlConfig {
    /// Creates a config with default limits for the given seed URL.
    ///
    /// Fails fast (before any network activity) when the seed isn't an
    /// absolute http(s) URL with a host.
    pub fn new(seed: &str) -> Result<Self, CrawlError> {
        let seed = parse_seed(seed)?;

        Ok(Self {
            seed,
            max_urls: DEFAULT_MAX_URLS,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            batch_delay: Duration::from_millis(DEFAULT_BATCH_DELAY_MS),
            failure_list_limit: DEFAULT_FAILURE_LIST_LIMIT,
            deadline: None,
        })
    }

    pub fn with_max_urls(mut self, max_urls: usize) -> Self {
        self.max_urls = max_urls;
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_batch_delay(mut self, batch_delay: Duration) -> Self {
        self.batch_delay = batch_delay;
        self
    }

    pub fn with_failure_list_limit(mut self, limit: usize) -> Self {
        self.failure_list_limit = limit;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Rejects values that would make the crawl do nothing or spin forever
    pub fn validate(&self) -> Result<(), CrawlError> {
        if self.max_urls == 0 {
            return Err(CrawlError::InvalidConfig(
                "max-urls must be at least 1".to_string(),
            ));
        }
        if self.max_concurrent == 0 {
            return Err(CrawlError::InvalidConfig(
                "max-concurrent must be at least 1".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(CrawlError::InvalidConfig(
                "timeout must be greater than 0 ms".to_string(),
            ));
        }
        Ok(())
    }
}

// Parses and checks the seed URL
fn parse_seed(raw: &str) -> Result<Url, CrawlError> {
    let trimmed = raw.trim();
    let invalid = |reason: String| CrawlError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("URL has no host".to_string()));
    }

    Ok(url)
}
