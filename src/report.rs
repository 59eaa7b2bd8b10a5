// src/report.rs
// =============================================================================
// Human-readable progress and summary output.
//
// The reporter never makes decisions; it only prints what the engine tells
// it. Fetch tasks run in parallel, so every write goes through a Mutex to
// keep lines from interleaving.
//
// Output goes to stdout by default. With --json the final summary owns
// stdout, so progress is sent to stderr instead.
// =============================================================================

use crate::crawl::{BatchStats, CrawlSummary, StopReason};
use parking_lot::Mutex;
use std::io::{self, Write};
use url::Url;

pub struct Reporter {
    out: Mutex<Box<dyn Write + Send>>,
    failure_list_limit: usize,
}

impl Reporter {
    pub fn new(out: Box<dyn Write + Send>, failure_list_limit: usize) -> Self {
        Self {
            out: Mutex::new(out),
            failure_list_limit,
        }
    }

    pub fn stdout(failure_list_limit: usize) -> Self {
        Self::new(Box::new(io::stdout()), failure_list_limit)
    }

    pub fn stderr(failure_list_limit: usize) -> Self {
        Self::new(Box::new(io::stderr()), failure_list_limit)
    }

    /// Discards everything (handy for tests and embedding)
    pub fn sink() -> Self {
        Self::new(Box::new(io::sink()), 0)
    }

    pub fn start(&self, seed: &Url, max_urls: usize, max_concurrent: usize, timeout_ms: u128) {
        self.line(&format!(
            "🔥 Warming cache for: {} (max {} URLs, {} concurrent, {}ms timeout)",
            seed, max_urls, max_concurrent, timeout_ms
        ));
    }

    /// One line per URL as its fetch starts
    pub fn progress(&self, index: usize, budget: usize, url: &str) {
        let width = budget.to_string().len();
        self.line(&format!("  [{:>width$}/{}] {}", index, budget, url, width = width));
    }

    pub fn failure(&self, url: &str, reason: &str) {
        self.line(&format!("  ❌ {} ({})", url, reason));
    }

    pub fn batch(&self, stats: &BatchStats) {
        self.line(&format!(
            "📦 Batch {}: {} processed, {} failed, {} new, {} queued (total {}/{})",
            stats.number,
            stats.size,
            stats.failed,
            stats.discovered,
            stats.queued,
            stats.processed_total,
            stats.budget
        ));
    }

    pub fn summary(&self, summary: &CrawlSummary, base: &Url) {
        let mut text = String::new();
        text.push_str("\n📊 Summary:\n");
        text.push_str(&format!("   📋 Processed: {}\n", summary.processed));
        text.push_str(&format!("   ✅ Warmed: {}\n", summary.succeeded));
        text.push_str(&format!("   ❌ Failed: {}\n", summary.failed));
        text.push_str(&format!("   🆕 Discovered: {}\n", summary.discovered));
        text.push_str(&format!("   ⏱️  Elapsed: {:.2}s\n", summary.elapsed_secs));
        text.push_str(&format!("   🚀 Throughput: {:.2} URLs/s\n", summary.throughput));
        text.push_str(&format!("   ⏹️  Stopped: {}", stop_label(summary.stopped_by)));

        if summary.failed > 0 && summary.failed <= self.failure_list_limit {
            text.push_str("\n\n❌ Failed URLs:");
            for url in &summary.failed_urls {
                text.push_str(&format!("\n   {}", abbreviate(url, base)));
            }
        }

        self.line(&text);
    }

    // Writes one line under the lock. Output errors (closed pipe...) must not
    // stop the crawl, so they're dropped here.
    fn line(&self, text: &str) {
        let mut out = self.out.lock();
        let _ = writeln!(out, "{}", text);
        let _ = out.flush();
    }
}

fn stop_label(reason: StopReason) -> &'static str {
    match reason {
        StopReason::QueueExhausted => "no more URLs to warm",
        StopReason::BudgetReached => "URL budget reached",
        StopReason::DeadlineReached => "deadline reached",
    }
}

/// Shortens `url` to its path when it lives on the same origin as `base`
pub fn abbreviate(url: &str, base: &Url) -> String {
    let origin = base.origin().ascii_serialization();
    match url.strip_prefix(&origin) {
        Some("") => "/".to_string(),
        Some(rest) if rest.starts_with('/') || rest.starts_with('?') => rest.to_string(),
        _ => url.to_string(),
    }
}
