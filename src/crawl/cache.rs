// src/crawl/cache.rs
// =============================================================================
// The visit cache: which URLs we've tried, and which of those failed.
//
// Both sets only ever grow during a run, and every failed URL is also a
// visited one. Fetch tasks read the cache concurrently; writes take the lock
// exclusively. We use parking_lot's RwLock because it can't be poisoned, so
// none of these methods can fail.
// =============================================================================

use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct VisitCache {
    inner: RwLock<Sets>,
}

#[derive(Debug, Default)]
struct Sets {
    visited: HashSet<String>,
    failed: HashSet<String>,
}

impl VisitCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.inner.read().visited.contains(url)
    }

    /// Records a fetch attempt. Returns false if the URL was already there,
    /// which lets a task claim a URL atomically.
    pub fn mark_visited(&self, url: &str) -> bool {
        self.inner.write().visited.insert(url.to_string())
    }

    /// Records a failed fetch. The URL is also added to `visited` so the
    /// failed set always stays inside the visited set.
    pub fn mark_failed(&self, url: &str) {
        let mut sets = self.inner.write();
        sets.visited.insert(url.to_string());
        sets.failed.insert(url.to_string());
    }

    pub fn visited_count(&self) -> usize {
        self.inner.read().visited.len()
    }

    pub fn failed_count(&self) -> usize {
        self.inner.read().failed.len()
    }

    /// A snapshot of the failed URLs
    pub fn failed_urls(&self) -> HashSet<String> {
        self.inner.read().failed.clone()
    }
}
