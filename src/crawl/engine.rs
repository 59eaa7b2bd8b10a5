// src/crawl/engine.rs
// =============================================================================
// The crawl loop: breadth-first, in batches.
//
// How it works:
// 1. Put the seed URL in the pending queue
// 2. Take up to `max_concurrent` URLs off the front of the queue
// 3. Spawn one tokio task per URL: claim it in the visit cache, fetch it,
//    collect the links it references
// 4. Wait for the whole batch to finish (join_all is the barrier)
// 5. Merge the new links into the queue, skipping anything already visited
//    or already queued
// 6. Report, sleep for the inter-batch delay, go back to 2
//
// The loop stops when the queue is empty, the URL budget is used up, or the
// optional deadline has passed. Batches never overlap, so there are never
// more than `max_concurrent` requests in flight.
// =============================================================================

use super::cache::VisitCache;
use super::fetch::{build_client, fetch, FetchOutcome};
use super::queue::PendingQueue;
use crate::config::CrawlConfig;
use crate::error::CrawlError;
use crate::links::normalize_link;
use crate::report::Reporter;
use futures::future::join_all;
use parking_lot::Mutex;
use reqwest::Client;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};
use url::Url;

/// Why the crawl ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    QueueExhausted,
    BudgetReached,
    DeadlineReached,
}

/// What one batch did, for the progress output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchStats {
    pub number: usize,
    pub size: usize,
    pub failed: usize,
    pub discovered: usize,
    pub queued: usize,
    pub processed_total: usize,
    pub budget: usize,
}

/// Final numbers for a finished crawl
#[derive(Debug, Clone, Serialize)]
pub struct CrawlSummary {
    pub seed: String,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// URLs added to the queue after the seed
    pub discovered: usize,
    pub failed_urls: Vec<String>,
    pub elapsed_secs: f64,
    /// URLs per second
    pub throughput: f64,
    /// Most fetches ever running at the same time
    pub peak_in_flight: usize,
    pub stopped_by: StopReason,
}

// What a single fetch task hands back to the loop
struct TaskResult {
    claimed: bool,
    ok: bool,
    links: BTreeSet<String>,
}

pub struct Crawler {
    config: CrawlConfig,
    client: Client,
    cache: VisitCache,
    queue: Mutex<PendingQueue>,
    reporter: Reporter,
    progress_index: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl Crawler {
    /// Validates the config and builds the shared HTTP client.
    /// No request is made until `run` is called.
    pub fn new(config: CrawlConfig, reporter: Reporter) -> Result<Arc<Self>, CrawlError> {
        config.validate()?;
        let client = build_client(config.timeout)?;

        Ok(Arc::new(Self {
            config,
            client,
            cache: VisitCache::new(),
            queue: Mutex::new(PendingQueue::new()),
            reporter,
            progress_index: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }))
    }

    pub fn cache(&self) -> &VisitCache {
        &self.cache
    }

    /// Runs the crawl to completion and returns (and prints) the summary
    pub async fn run(self: &Arc<Self>) -> CrawlSummary {
        let started = Instant::now();
        let budget = self.config.max_urls;

        self.reporter.start(
            &self.config.seed,
            budget,
            self.config.max_concurrent,
            self.config.timeout.as_millis(),
        );
        self.queue.lock().push(self.seed_entry());

        let mut processed = 0;
        let mut discovered = 0;
        let mut batch_number = 0;

        let stopped_by = loop {
            if self.queue.lock().is_empty() {
                break StopReason::QueueExhausted;
            }
            if processed >= budget {
                break StopReason::BudgetReached;
            }
            if let Some(deadline) = self.config.deadline {
                if started.elapsed() >= deadline {
                    info!(?deadline, "crawl deadline reached");
                    break StopReason::DeadlineReached;
                }
            }

            let size = self.config.max_concurrent.min(budget - processed);
            let batch = self.queue.lock().take_batch(size);
            batch_number += 1;
            debug!(batch = batch_number, size = batch.len(), "dispatching batch");

            let handles = batch
                .iter()
                .map(|url| tokio::spawn(Arc::clone(self).warm_one(url.clone())));
            let joined = join_all(handles).await;

            let mut results = Vec::with_capacity(joined.len());
            for (url, result) in batch.iter().zip(joined) {
                match result {
                    Ok(result) => results.push(result),
                    Err(e) => {
                        error!(%url, "fetch task failed: {}", e);
                        self.cache.mark_failed(url);
                        results.push(TaskResult {
                            claimed: true,
                            ok: false,
                            links: BTreeSet::new(),
                        });
                    }
                }
            }

            let added = self.merge_links(&results);
            discovered += added;

            let claimed = results.iter().filter(|r| r.claimed).count();
            processed += claimed;

            let queued = self.queue.lock().len();
            self.reporter.batch(&BatchStats {
                number: batch_number,
                size: claimed,
                failed: results.iter().filter(|r| r.claimed && !r.ok).count(),
                discovered: added,
                queued,
                processed_total: processed,
                budget,
            });

            if queued > 0 && processed < budget && !self.config.batch_delay.is_zero() {
                tokio::time::sleep(self.config.batch_delay).await;
            }
        };

        let summary = self.summarize(processed, discovered, started, stopped_by);
        self.reporter.summary(&summary, &self.config.seed);
        summary
    }

    // The seed in the same form discovered links take, so "/#top" and a
    // later link to "/" are one queue entry
    fn seed_entry(&self) -> String {
        let seed = &self.config.seed;
        normalize_link(seed.as_str(), seed).unwrap_or_else(|| {
            let mut bare = seed.clone();
            bare.set_fragment(None);
            bare.to_string()
        })
    }

    // Fetches one URL. Runs as its own tokio task.
    async fn warm_one(self: Arc<Self>, url: String) -> TaskResult {
        if !self.cache.mark_visited(&url) {
            debug!(%url, "already visited, skipping");
            return TaskResult {
                claimed: false,
                ok: false,
                links: BTreeSet::new(),
            };
        }

        let index = self.progress_index.fetch_add(1, Ordering::SeqCst) + 1;
        self.reporter.progress(index, self.config.max_urls, &url);

        let parsed = match Url::parse(&url) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.cache.mark_failed(&url);
                self.reporter.failure(&url, &e.to_string());
                return TaskResult {
                    claimed: true,
                    ok: false,
                    links: BTreeSet::new(),
                };
            }
        };

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        let outcome = fetch(&self.client, &parsed).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match outcome {
            FetchOutcome::Warmed { status, links } => {
                debug!(%url, status, links = links.len(), "warmed");
                TaskResult {
                    claimed: true,
                    ok: true,
                    links,
                }
            }
            failure => {
                debug!(%url, reason = %failure.describe(), "fetch failed");
                self.cache.mark_failed(&url);
                self.reporter.failure(&url, &failure.describe());
                TaskResult {
                    claimed: true,
                    ok: false,
                    links: BTreeSet::new(),
                }
            }
        }
    }

    // Appends every new link from the batch under one lock. Returns how many
    // were actually added.
    fn merge_links(&self, results: &[TaskResult]) -> usize {
        let mut queue = self.queue.lock();
        let mut added = 0;

        for link in results.iter().flat_map(|r| r.links.iter()) {
            if self.cache.is_visited(link) || queue.contains(link) {
                continue;
            }
            queue.push(link.clone());
            added += 1;
        }

        added
    }

    fn summarize(
        &self,
        processed: usize,
        discovered: usize,
        started: Instant,
        stopped_by: StopReason,
    ) -> CrawlSummary {
        let elapsed_secs = started.elapsed().as_secs_f64();
        let failed = self.cache.failed_count();

        let mut failed_urls: Vec<String> = self.cache.failed_urls().into_iter().collect();
        failed_urls.sort();

        let throughput = if elapsed_secs > 0.0 {
            processed as f64 / elapsed_secs
        } else {
            0.0
        };

        CrawlSummary {
            seed: self.config.seed.to_string(),
            processed,
            succeeded: processed.saturating_sub(failed),
            failed,
            discovered,
            failed_urls,
            elapsed_secs,
            throughput,
            peak_in_flight: self.peak_in_flight.load(Ordering::SeqCst),
            stopped_by,
        }
    }
}

/// Validates `config`, then warms the site starting from its seed URL.
///
/// The only error is an unusable configuration; fetch failures are counted
/// in the returned summary.
pub async fn warm_site(
    config: CrawlConfig,
    reporter: Reporter,
) -> Result<CrawlSummary, CrawlError> {
    let crawler = Crawler::new(config, reporter)?;
    Ok(crawler.run().await)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why `self: &Arc<Self>`?
//    - tokio::spawn needs futures that own their data ('static)
//    - Each task gets its own Arc clone of the crawler, so the cache, queue
//      and reporter are shared without copying
//
// 2. Why join_all instead of buffer_unordered?
//    - buffer_unordered keeps starting new work as soon as a slot frees up
//    - We want the opposite: the whole batch finishes, then we merge links
//      and form the next batch. join_all waits for every handle.
//
// 3. What is fetch_max?
//    - An atomic "store the bigger of the two values"
//    - It records the highest number of fetches ever in flight, which the
//      tests use to check the concurrency limit
//
// 4. Why parking_lot::Mutex?
//    - Its lock() can't fail (no poisoning), so there is no unwrap() to write
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Mock, ServerGuard};
    use std::io::Write;
    use std::time::Duration;

    async fn page(server: &mut ServerGuard, path: &str, body: &str) -> Mock {
        server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(body)
            .expect(1)
            .create_async()
            .await
    }

    fn config(server: &ServerGuard) -> CrawlConfig {
        CrawlConfig::new(&server.url())
            .unwrap()
            .with_batch_delay(Duration::ZERO)
            .with_timeout(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_warms_same_origin_links_only() {
        let mut server = mockito::Server::new_async().await;
        let root = page(
            &mut server,
            "/",
            r#"
                <a href="/page1">One</a>
                <a href="https://other.com/x">Elsewhere</a>
                <a href="mailto:a@b.com">Mail</a>
                <img src="/img/logo.png">
            "#,
        )
        .await;
        let page1 = page(&mut server, "/page1", "<p>no links</p>").await;
        let logo = server
            .mock("GET", "/img/logo.png")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body([0u8, 1, 2, 3])
            .expect(1)
            .create_async()
            .await;

        let crawler = Crawler::new(config(&server), Reporter::sink()).unwrap();
        let summary = crawler.run().await;

        root.assert_async().await;
        page1.assert_async().await;
        logo.assert_async().await;
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.succeeded, 3);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.discovered, 2);
        assert_eq!(summary.stopped_by, StopReason::QueueExhausted);
        assert_eq!(crawler.cache().visited_count(), summary.processed);
    }

    #[tokio::test]
    async fn test_404_is_recorded_and_crawl_continues() {
        let mut server = mockito::Server::new_async().await;
        let _root = page(&mut server, "/", r#"<a href="/missing">x</a><a href="/ok">y</a>"#).await;
        let _ok = page(&mut server, "/ok", r#"<a href="/deeper">z</a>"#).await;
        let _deeper = page(&mut server, "/deeper", "done").await;
        let _missing = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let summary = warm_site(config(&server), Reporter::sink()).await.unwrap();

        assert_eq!(summary.processed, 4);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.succeeded, 3);
        assert_eq!(summary.failed_urls, vec![format!("{}/missing", server.url())]);
        assert_eq!(summary.stopped_by, StopReason::QueueExhausted);
    }

    #[tokio::test]
    async fn test_budget_is_respected() {
        let mut server = mockito::Server::new_async().await;
        let links: String = (1..=6)
            .map(|i| format!(r#"<a href="/p{}">{}</a>"#, i, i))
            .collect();
        let _root = page(&mut server, "/", &links).await;
        let mut _leaves = Vec::new();
        for i in 1..=6 {
            let leaf = server
                .mock("GET", format!("/p{}", i).as_str())
                .with_status(200)
                .with_body("leaf")
                .create_async()
                .await;
            _leaves.push(leaf);
        }

        let crawler = Crawler::new(config(&server).with_max_urls(3), Reporter::sink()).unwrap();
        let summary = crawler.run().await;

        assert_eq!(summary.processed, 3);
        assert_eq!(crawler.cache().visited_count(), 3);
        assert_eq!(summary.stopped_by, StopReason::BudgetReached);
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_limit() {
        let mut server = mockito::Server::new_async().await;
        let links: String = (1..=9)
            .map(|i| format!(r#"<a href="/p{}">{}</a>"#, i, i))
            .collect();
        let _root = page(&mut server, "/", &links).await;
        let mut _leaves = Vec::new();
        for i in 1..=9 {
            let leaf = server
                .mock("GET", format!("/p{}", i).as_str())
                .with_status(200)
                .with_body("leaf")
                .create_async()
                .await;
            _leaves.push(leaf);
        }

        let summary = warm_site(config(&server).with_max_concurrent(2), Reporter::sink())
            .await
            .unwrap();

        assert_eq!(summary.processed, 10);
        assert!(summary.peak_in_flight >= 1);
        assert!(summary.peak_in_flight <= 2);
    }

    #[tokio::test]
    async fn test_cycles_are_visited_once() {
        let mut server = mockito::Server::new_async().await;
        let root = page(
            &mut server,
            "/",
            r#"<a href="/a">a</a><a href="/a#top">a again</a>"#,
        )
        .await;
        let a = page(&mut server, "/a", r#"<a href="/">home</a><a href="/a">self</a>"#).await;

        let summary = warm_site(config(&server).with_max_concurrent(4), Reporter::sink())
            .await
            .unwrap();

        root.assert_async().await;
        a.assert_async().await;
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.discovered, 1);
    }

    #[tokio::test]
    async fn test_seed_with_fragment_is_fetched_once() {
        let mut server = mockito::Server::new_async().await;
        let root = page(&mut server, "/", r#"<a href="/">home</a>"#).await;

        let config = CrawlConfig::new(&format!("{}/#top", server.url()))
            .unwrap()
            .with_batch_delay(Duration::ZERO);
        let summary = warm_site(config, Reporter::sink()).await.unwrap();

        root.assert_async().await;
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.discovered, 0);
    }

    #[tokio::test]
    async fn test_timed_out_url_is_failed_and_crawl_completes() {
        let mut server = mockito::Server::new_async().await;
        let links = r#"<a href="/slow">slow</a><a href="/fast">fast</a>"#;
        let _root = page(&mut server, "/", links).await;
        let _fast = page(&mut server, "/fast", "ok").await;
        let _slow = server
            .mock("GET", "/slow")
            .with_status(200)
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_millis(500));
                w.write_all(b"too late")
            })
            .create_async()
            .await;

        let config = config(&server).with_timeout(Duration::from_millis(100));
        let summary = warm_site(config, Reporter::sink()).await.unwrap();

        assert_eq!(summary.processed, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failed_urls, vec![format!("{}/slow", server.url())]);
        assert_eq!(summary.stopped_by, StopReason::QueueExhausted);
    }

    #[tokio::test]
    async fn test_batches_are_spaced_by_delay() {
        let mut server = mockito::Server::new_async().await;
        let links: String = (1..=4)
            .map(|i| format!(r#"<a href="/p{}">{}</a>"#, i, i))
            .collect();
        let _root = page(&mut server, "/", &links).await;
        let mut _leaves = Vec::new();
        for i in 1..=4 {
            let leaf = page(&mut server, format!("/p{}", i).as_str(), "leaf").await;
            _leaves.push(leaf);
        }

        // [/], [p1, p2], [p3, p4]: two pauses between three batches
        let delay = Duration::from_millis(150);
        let config = config(&server).with_max_concurrent(2).with_batch_delay(delay);
        let started = Instant::now();
        let summary = warm_site(config, Reporter::sink()).await.unwrap();

        assert_eq!(summary.processed, 5);
        assert!(started.elapsed() >= delay * 2);
        assert!(summary.elapsed_secs >= (delay * 2).as_secs_f64());
    }

    #[tokio::test]
    async fn test_expired_deadline_stops_before_fetching() {
        let config = CrawlConfig::new("http://127.0.0.1:9/")
            .unwrap()
            .with_deadline(Some(Duration::ZERO));

        let summary = warm_site(config, Reporter::sink()).await.unwrap();

        assert_eq!(summary.processed, 0);
        assert_eq!(summary.stopped_by, StopReason::DeadlineReached);
    }

    #[tokio::test]
    async fn test_invalid_config_fails_fast() {
        let config = CrawlConfig::new("https://example.com")
            .unwrap()
            .with_max_concurrent(0);

        let result = warm_site(config, Reporter::sink()).await;
        assert!(matches!(result, Err(CrawlError::InvalidConfig(_))));
    }
}
