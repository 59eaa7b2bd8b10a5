// src/crawl/queue.rs
// =============================================================================
// The pending queue: URLs we've discovered but not fetched yet.
//
// Breadth-first crawling needs FIFO order, so the queue is a VecDeque. A
// HashSet shadows it so "is this already queued?" is O(1) and nothing gets
// enqueued twice.
//
// The queue itself isn't thread-safe; the engine keeps it behind a Mutex and
// only touches it between batches.
// =============================================================================

use std::collections::{HashSet, VecDeque};

#[derive(Debug, Default)]
pub struct PendingQueue {
    order: VecDeque<String>,
    queued: HashSet<String>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `url` unless it's already waiting. Returns true if it was added.
    pub fn push(&mut self, url: String) -> bool {
        if self.queued.contains(&url) {
            return false;
        }
        self.queued.insert(url.clone());
        self.order.push_back(url);
        true
    }

    /// Removes up to `size` URLs from the front of the queue
    pub fn take_batch(&mut self, size: usize) -> Vec<String> {
        let count = size.min(self.order.len());
        let batch: Vec<String> = self.order.drain(..count).collect();
        for url in &batch {
            self.queued.remove(url);
        }
        batch
    }

    pub fn contains(&self, url: &str) -> bool {
        self.queued.contains(url)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
