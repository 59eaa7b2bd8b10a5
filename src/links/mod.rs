// src/links/mod.rs
// =============================================================================
// This module decides which URLs are worth warming.
//
// Submodules:
// - blacklist: Substrings (extensions, schemes) we never fetch
// - normalize: Resolves a raw link into a clean same-origin URL
// - html: Finds candidate links in HTML and CSS text
//
// The crawl engine only needs `extract_links`; the other functions are
// exported for callers that want to filter single URLs.
// =============================================================================

mod blacklist;
mod html;
mod normalize;

pub use blacklist::is_blacklisted;
pub use html::extract_links;
pub use normalize::normalize_link;
