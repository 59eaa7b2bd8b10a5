// src/crawl/mod.rs
// =============================================================================
// This module handles the cache-warming crawl.
//
// Features:
// - Breadth-first crawling in bounded batches starting from a seed URL
// - Same-host restriction (other sites are never warmed)
// - A visit cache so no URL is fetched twice
// - URL budget, per-request timeout and optional crawl deadline
// - Polite crawling with a delay between batches
//
// Submodules:
// - cache: Visited / failed URL sets shared by the fetch tasks
// - queue: FIFO of discovered URLs waiting to be fetched
// - fetch: One timed GET per URL
// - engine: The batch loop that ties it together
// =============================================================================

mod cache;
mod engine;
mod fetch;
mod queue;

pub use cache::VisitCache;
pub use engine::{warm_site, BatchStats, CrawlSummary, Crawler, StopReason};
pub use fetch::FetchOutcome;
