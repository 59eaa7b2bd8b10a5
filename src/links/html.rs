// src/links/html.rs
// =============================================================================
// This module finds every resource a page references that an edge cache
// would serve: other pages, stylesheets, scripts, images, icons and fonts.
//
// We use the `scraper` crate for anything that lives in an attribute:
//   <a href>, <form action>, <link href> (.css / canonical / icons),
//   <script src> (.js), <img src>, <meta http-equiv="refresh">
//
// CSS references live inside text, not attributes, so those are found with
// `regex`:
//   @font-face { src: url(...) }
//   background: url(...) / background-image: url(...)
// The same regexes work on a stylesheet body, so fetched .css files feed
// their fonts and background images back into the crawl too.
//
// Every candidate goes through normalize_link (blacklist + same-origin +
// query pruning). Whatever survives ends up in a sorted, de-duplicated set.
// =============================================================================

use super::normalize::normalize_link;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;
use url::Url;

// Selectors are constants, so a parse failure is a programmer error
static ANCHOR: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static FORM: Lazy<Selector> = Lazy::new(|| selector("form[action]"));
static LINK: Lazy<Selector> = Lazy::new(|| selector("link[href]"));
static SCRIPT: Lazy<Selector> = Lazy::new(|| selector("script[src]"));
static IMAGE: Lazy<Selector> = Lazy::new(|| selector("img[src]"));
static META: Lazy<Selector> = Lazy::new(|| selector("meta[http-equiv][content]"));

static FONT_FACE: Lazy<Regex> = Lazy::new(|| pattern(r"(?is)@font-face\s*\{([^}]*)\}"));
static CSS_URL: Lazy<Regex> = Lazy::new(|| pattern(r#"(?i)url\(\s*['"]?([^'")\s]+)['"]?\s*\)"#));
static BACKGROUND: Lazy<Regex> = Lazy::new(|| {
    pattern(r#"(?i)background(?:-image)?\s*:[^;{}]*?url\(\s*['"]?([^'")\s]+)['"]?\s*\)"#)
});
static REFRESH_TARGET: Lazy<Regex> = Lazy::new(|| pattern(r#"(?i)url\s*=\s*['"]?([^'"\s;]+)"#));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("static regex must compile")
}

/// Extracts every warmable same-origin link referenced by `html`.
///
/// Relative links are resolved against `base_url` (the page the HTML came
/// from). Finding nothing is not an error, it just returns an empty set.
pub fn extract_links(html: &str, base_url: &Url) -> BTreeSet<String> {
    let mut candidates: Vec<String> = Vec::new();

    let document = Html::parse_document(html);

    candidates.extend(attrs(&document, &ANCHOR, "href"));
    candidates.extend(attrs(&document, &FORM, "action"));
    candidates.extend(attrs(&document, &IMAGE, "src"));

    candidates.extend(
        attrs(&document, &SCRIPT, "src").filter(|src| has_extension(src, &[".js", ".mjs"])),
    );

    for element in document.select(&LINK) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let rel = rel_tokens(&element);

        let is_stylesheet = has_extension(href, &[".css"]);
        let is_canonical = rel.iter().any(|r| r == "canonical");
        let is_icon = rel.iter().any(|r| r.contains("icon"));

        if is_stylesheet || is_canonical || is_icon {
            candidates.push(href.to_string());
        }
    }

    for element in document.select(&META) {
        let value = element.value();
        let is_refresh = value
            .attr("http-equiv")
            .is_some_and(|v| v.eq_ignore_ascii_case("refresh"));
        if !is_refresh {
            continue;
        }
        if let Some(content) = value.attr("content") {
            candidates.extend(refresh_target(content));
        }
    }

    candidates.extend(extract_css_urls(html));

    candidates
        .iter()
        .filter_map(|candidate| normalize_link(candidate, base_url))
        .collect()
}

/// Finds `@font-face` sources and `background[-image]: url(...)` references
/// in CSS text, either a stylesheet or an HTML page with inline styles.
/// Returns the raw, un-normalized references.
pub fn extract_css_urls(text: &str) -> Vec<String> {
    let mut found = Vec::new();

    for block in FONT_FACE.captures_iter(text) {
        for url in CSS_URL.captures_iter(&block[1]) {
            found.push(url[1].to_string());
        }
    }

    for background in BACKGROUND.captures_iter(text) {
        found.push(background[1].to_string());
    }

    found
}

// Iterates over the values of `attr` on every element matching `selector`
fn attrs<'a>(
    document: &'a Html,
    selector: &'a Selector,
    attr: &'a str,
) -> impl Iterator<Item = String> + 'a {
    document
        .select(selector)
        .filter_map(move |element| element.value().attr(attr))
        .map(str::to_string)
}

fn rel_tokens(element: &ElementRef<'_>) -> Vec<String> {
    element
        .value()
        .attr("rel")
        .unwrap_or("")
        .split_whitespace()
        .map(str::to_ascii_lowercase)
        .collect()
}

// "/app.js?v=3" counts as a .js file; the query string is ignored
fn has_extension(link: &str, extensions: &[&str]) -> bool {
    let path = link.split(['?', '#']).next().unwrap_or("").to_ascii_lowercase();
    extensions.iter().any(|ext| path.ends_with(ext))
}

// Pulls the target out of a meta refresh value like "5; url=/next"
fn refresh_target(content: &str) -> Option<String> {
    REFRESH_TARGET
        .captures(content)
        .map(|caps| caps[1].to_string())
}
