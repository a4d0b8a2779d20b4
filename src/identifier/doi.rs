use once_cell::sync::Lazy;
use regex::Regex;

// Everything after a "doi.org/" host segment, to end of line.
static DOI_ORG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"doi\.org/(.+)").unwrap());
// Bare registrant form: "10.", digits, slash, suffix.
static BARE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"10\.\d+/.+").unwrap());

/// Finds the first DOI embedded anywhere in `s`.
///
/// A `doi.org/` URL wins over a bare `10.xxxx/...` form, so resolver URLs like
/// "https://doi.org/10.1103/PhysRevD.102.034021" yield just the DOI itself.
pub fn extract_doi(s: &str) -> Option<&str> {
    if let Some(caps) = DOI_ORG_RE.captures(s) {
        return caps.get(1).map(|m| m.as_str());
    }
    BARE_RE.find(s).map(|m| m.as_str())
}
