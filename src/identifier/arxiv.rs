use once_cell::sync::Lazy;
use regex::Regex;

// New-style IDs: YYMM.NNNNN, four digits, a dot, four or five digits.
static NEWSTYLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}\.\d{4,5}").unwrap());
// Legacy IDs: archive name, slash, seven digits (e.g., "hep-ph/0123456").
static LEGACY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z-]+/\d{7}").unwrap());

/// Finds the first arXiv identifier embedded anywhere in `s`.
///
/// The input may be a bare ID, a prefixed form like "arXiv:2410.01204v2", or a
/// full abs/pdf URL. New-style IDs are tried before legacy ones, and a version
/// suffix ("v2") is never part of the returned slice.
pub fn extract_arxiv_id(s: &str) -> Option<&str> {
    NEWSTYLE_RE
        .find(s)
        .or_else(|| LEGACY_RE.find(s))
        .map(|m| m.as_str())
}
