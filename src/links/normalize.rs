// src/links/normalize.rs
// =============================================================================
// Turns a raw link found in a page into a clean, absolute, same-origin URL.
//
// The steps, in order:
// 1. Trim, drop empty links and the bare "#"
// 2. Cut the fragment ("/page#top" and "/page" are the same resource)
// 3. Resolve against the base URL (absolute, //host, /root, ./, ../, bare)
// 4. Keep only links on the base origin (scheme + host + port)
// 5. Drop blacklisted resources (checked on the raw link and the resolved path)
// 6. Rebuild the query string from an allow-list of parameter names
// 7. Drop anything that smells like an obfuscated host (punycode, '@')
//
// The function is pure: the same (link, base) pair always gives the same
// answer, and normalizing an already-normalized URL returns it unchanged.
//
// Rust concepts:
// - Option<T> + the ? operator: any failed step short-circuits to None
// - Borrowing: we read the base URL, we never modify it
// =============================================================================

use super::blacklist::is_blacklisted;
use url::Url;

/// Query parameters that change what a page shows. Everything else
/// (utm_*, fbclid, cache busters...) is dropped so the same page isn't
/// warmed twice under different URLs. Kept parameters are emitted in this order.
const QUERY_ALLOW_LIST: &[&str] = &[
    "id", "page", "p", "q", "query", "search", "s", "category", "tag", "sort", "lang", "locale",
    "hl",
];

/// Markers of hosts we refuse to touch even when they pass the origin check
const SUSPICIOUS_MARKERS: &[&str] = &["xn--", "@"];

/// Normalizes `link` against `base`.
///
/// Returns `None` when the link should be discarded: empty, fragment-only,
/// cross-origin, blacklisted, malformed or suspicious.
///
/// # Examples
/// ```ignore
/// let base = Url::parse("https://example.com/dir/").unwrap();
/// assert_eq!(
///     normalize_link("../up.html", &base),
///     Some("https://example.com/up.html".to_string())
/// );
/// ```
pub fn normalize_link(link: &str, base: &Url) -> Option<String> {
    let trimmed = link.trim();
    if trimmed.is_empty() || is_blacklisted(trimmed) {
        return None;
    }

    let without_fragment = match trimmed.find('#') {
        Some(index) => &trimmed[..index],
        None => trimmed,
    };
    if without_fragment.is_empty() {
        return None;
    }

    let mut resolved = resolve(without_fragment, base)?;

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }
    // Scheme, host and port all have to match the page the link came from
    if resolved.origin() != base.origin() {
        return None;
    }
    if is_blacklisted(resolved.path()) {
        return None;
    }

    resolved.set_fragment(None);
    prune_query(&mut resolved);

    let normalized = resolved.to_string();
    if SUSPICIOUS_MARKERS.iter().any(|marker| normalized.contains(marker)) {
        return None;
    }

    Some(normalized)
}

// Resolves a fragment-free link to an absolute URL
fn resolve(link: &str, base: &Url) -> Option<Url> {
    let lower = link.to_ascii_lowercase();

    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Url::parse(link).ok();
    }

    if link.starts_with("//") {
        return Url::parse(&format!("{}:{}", base.scheme(), link)).ok();
    }

    // "/path" and "?query" are relative to the base itself, not its directory
    if link.starts_with('/') || link.starts_with('?') {
        return base.join(link).ok();
    }

    // "./path", "../path" and bare "path"
    directory_of(base).join(link).ok()
}

// Returns the base URL with its path pointing at a directory.
//
// "/docs/" stays as is, "/docs/index.html" keeps its file segment (join drops
// it), and "/docs" is treated as the directory "/docs/" since its last segment
// has no extension.
fn directory_of(base: &Url) -> Url {
    let mut dir = base.clone();
    dir.set_query(None);
    dir.set_fragment(None);

    let path = base.path();
    if path.ends_with('/') {
        return dir;
    }

    let last_segment = path.rsplit('/').next().unwrap_or("");
    if !last_segment.contains('.') {
        dir.set_path(&format!("{}/", path));
    }
    dir
}

// Keeps only allow-listed query parameters, in allow-list order
fn prune_query(url: &mut Url) {
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

    let kept: Vec<(&str, &str)> = QUERY_ALLOW_LIST
        .iter()
        .flat_map(|allowed| pairs.iter().filter(move |pair| pair.0 == **allowed))
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
}
