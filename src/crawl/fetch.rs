// src/crawl/fetch.rs
// =============================================================================
// This module warms a single URL.
//
// Key functionality:
// - One GET per URL with browser-like headers (some CDNs key on them)
// - A 2xx response is a success; its body feeds the link extractor
// - Anything else (404, 500, timeout, DNS...) is a failure
// - No retries: one attempt per URL per run
//
// Rust concepts:
// - Enums: FetchOutcome describes every way a fetch can end
// - async/await: The task yields while waiting for the network
// =============================================================================

use crate::links::extract_links;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

// How a single fetch ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// 2xx response; holds the same-origin links found in the body
    Warmed { status: u16, links: BTreeSet<String> },
    /// Non-2xx response
    HttpError { status: u16 },
    /// The per-request timeout fired
    Timeout,
    /// Could not connect (DNS, refused, unreachable)
    Connect,
    /// Any other transport error
    Transport { message: String },
}

impl FetchOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, FetchOutcome::Warmed { .. })
    }

    /// Short human-readable reason, used in failure lines
    pub fn describe(&self) -> String {
        match self {
            FetchOutcome::Warmed { status, .. } => format!("HTTP {}", status),
            FetchOutcome::HttpError { status } => format!("HTTP {}", status),
            FetchOutcome::Timeout => "timed out".to_string(),
            FetchOutcome::Connect => "connection failed".to_string(),
            FetchOutcome::Transport { message } => message.clone(),
        }
    }
}

/// Builds the client shared by every fetch in a crawl
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));

    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(timeout)
        .build()
}

/// Fetches `url` once and classifies the result.
///
/// Never returns an error: failures are part of the outcome.
pub async fn fetch(client: &Client, url: &Url) -> FetchOutcome {
    match client.get(url.as_str()).send().await {
        Ok(response) => read_response(response).await,
        Err(e) => categorize_error(e),
    }
}

async fn read_response(response: Response) -> FetchOutcome {
    let status = response.status();
    // After redirects, relative links belong to the page that was served
    let final_url = response.url().clone();
    if !status.is_success() {
        return FetchOutcome::HttpError {
            status: status.as_u16(),
        };
    }

    if !has_linkable_body(&response) {
        // Still download everything so the edge stores the full object
        return match response.bytes().await {
            Ok(_) => FetchOutcome::Warmed {
                status: status.as_u16(),
                links: BTreeSet::new(),
            },
            Err(e) => categorize_error(e),
        };
    }

    match response.text().await {
        Ok(body) => FetchOutcome::Warmed {
            status: status.as_u16(),
            links: extract_links(&body, &final_url),
        },
        Err(e) => categorize_error(e),
    }
}

// HTML and CSS bodies can reference more resources. A missing content type
// is treated as HTML.
fn has_linkable_body(response: &Response) -> bool {
    match response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    {
        Some(content_type) => {
            let content_type = content_type.to_ascii_lowercase();
            content_type.contains("html") || content_type.contains("css")
        }
        None => true,
    }
}

fn categorize_error(error: reqwest::Error) -> FetchOutcome {
    if error.is_timeout() {
        FetchOutcome::Timeout
    } else if error.is_connect() {
        FetchOutcome::Connect
    } else {
        FetchOutcome::Transport {
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn client() -> Client {
        build_client(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_success_extracts_links() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_header("accept-language", ACCEPT_LANGUAGE)
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(r#"<a href="/next">next</a>"#)
            .create_async()
            .await;

        let url = Url::parse(&server.url()).unwrap();
        let outcome = fetch(&client(), &url).await;

        mock.assert_async().await;
        let expected: BTreeSet<String> = [format!("{}/next", server.url())].into();
        assert_eq!(
            outcome,
            FetchOutcome::Warmed {
                status: 200,
                links: expected
            }
        );
    }

    #[tokio::test]
    async fn test_404_is_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/missing", server.url())).unwrap();
        let outcome = fetch(&client(), &url).await;

        assert_eq!(outcome, FetchOutcome::HttpError { status: 404 });
        assert!(!outcome.is_ok());
        assert_eq!(outcome.describe(), "HTTP 404");
    }

    #[tokio::test]
    async fn test_binary_body_has_no_links() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/logo.png")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body(r#"<a href="/not-parsed">"#)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/logo.png", server.url())).unwrap();
        let outcome = fetch(&client(), &url).await;

        assert_eq!(
            outcome,
            FetchOutcome::Warmed {
                status: 200,
                links: BTreeSet::new()
            }
        );
    }

    #[tokio::test]
    async fn test_connection_refused_is_failure() {
        // Port 9 (discard) is essentially never listening on localhost
        let url = Url::parse("http://127.0.0.1:9/").unwrap();
        let outcome = fetch(&client(), &url).await;
        assert!(!outcome.is_ok());
    }

    #[tokio::test]
    async fn test_links_resolve_against_redirect_target() {
        let mut server = mockito::Server::new_async().await;
        let _old = server
            .mock("GET", "/old")
            .with_status(301)
            .with_header("location", "/new/section/")
            .create_async()
            .await;
        let _new = server
            .mock("GET", "/new/section/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(r#"<a href="page.html">page</a>"#)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/old", server.url())).unwrap();
        let outcome = fetch(&client(), &url).await;

        let expected: BTreeSet<String> = [format!("{}/new/section/page.html", server.url())].into();
        assert_eq!(
            outcome,
            FetchOutcome::Warmed {
                status: 200,
                links: expected
            }
        );
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/slow")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_millis(500));
                w.write_all(b"<p>too late</p>")
            })
            .create_async()
            .await;

        let client = build_client(Duration::from_millis(50)).unwrap();
        let url = Url::parse(&format!("{}/slow", server.url())).unwrap();
        let outcome = fetch(&client, &url).await;

        assert_eq!(outcome, FetchOutcome::Timeout);
        assert_eq!(outcome.describe(), "timed out");
    }
}
