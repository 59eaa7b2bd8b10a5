// src/lib.rs
// =============================================================================
// edge-warmer as a library.
//
// The binary in main.rs is a thin clap wrapper around this. Other tools can
// embed the crawler directly:
//
//   let config = CrawlConfig::new("https://example.com")?.with_max_urls(200);
//   let summary = warm_site(config, Reporter::stdout(10)).await?;
//
// Modules:
// - config: Crawl limits and seed URL validation
// - crawl: Visit cache, pending queue, fetcher and the batch loop
// - links: Blacklist, URL normalization and link extraction
// - report: Progress and summary output
// - error: The errors that can stop a crawl before it starts
// =============================================================================

pub mod config;
pub mod crawl;
pub mod error;
pub mod links;
pub mod report;

pub use config::CrawlConfig;
pub use crawl::{warm_site, CrawlSummary, Crawler};
pub use error::CrawlError;
pub use report::Reporter;
