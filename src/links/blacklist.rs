// src/links/blacklist.rs
// =============================================================================
// Resources we never try to warm.
//
// Two kinds of entries:
// - File extensions for documents, archives, media and installers. These are
//   big, rarely cached at the edge, and not worth the bandwidth.
// - URI schemes that aren't HTTP at all (mailto:, tel:, javascript:, ...)
//
// Matching is a case-insensitive substring check against the raw link, so
// "REPORT.PDF" and "/files/report.pdf?v=2" are both caught.
// =============================================================================

/// Substrings that mark a link as not warmable
const BLACKLIST: &[&str] = &[
    // Documents
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".odt", ".rtf",
    // Archives and installers
    ".zip", ".rar", ".7z", ".tar", ".gz", ".bz2", ".exe", ".msi", ".dmg", ".iso", ".apk",
    // Audio / video
    ".mp3", ".mp4", ".avi", ".mov", ".wmv", ".flv", ".mkv", ".webm", ".wav", ".ogg",
    // Non-HTTP schemes
    "mailto:", "tel:", "javascript:", "data:", "ftp:", "file:", "sms:", "skype:", "whatsapp:",
];

/// The bare fragment marker. Only rejected when it is the entire link;
/// "/page#section" is a real page with a fragment, not a blacklisted link.
const BARE_FRAGMENT: &str = "#";

/// Returns true if the link should never be fetched
pub fn is_blacklisted(link: &str) -> bool {
    let trimmed = link.trim();
    if trimmed == BARE_FRAGMENT {
        return true;
    }

    let lower = trimmed.to_ascii_lowercase();
    BLACKLIST.iter().any(|entry| lower.contains(entry))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_are_blacklisted() {
        assert!(is_blacklisted("https://example.com/file.pdf"));
        assert!(is_blacklisted("/downloads/archive.ZIP"));
        assert!(is_blacklisted("video.mp4?autoplay=1"));
    }

    #[test]
    fn test_images_are_not_blacklisted() {
        assert!(!is_blacklisted("https://example.com/image.jpg"));
        assert!(!is_blacklisted("/img/logo.png"));
        assert!(!is_blacklisted("/fonts/inter.woff2"));
    }

    #[test]
    fn test_schemes_are_blacklisted() {
        assert!(is_blacklisted("mailto:a@b.com"));
        assert!(is_blacklisted("tel:+123456"));
        assert!(is_blacklisted("JavaScript:void(0)"));
        assert!(is_blacklisted("data:image/png;base64,AAAA"));
    }

    #[test]
    fn test_bare_fragment() {
        assert!(is_blacklisted("#"));
        assert!(is_blacklisted("  #  "));
        assert!(!is_blacklisted("/page#section"));
    }
}
