//! Prioritized lookup chain matching one publication to its index record.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::identifier::{arxiv, doi};
use crate::inspire::{MetadataSource, ResolvedMetadata};
use crate::publication::Publication;
use crate::throttle::Throttle;

/// Minimum Jaccard similarity for a title-search candidate to count as the
/// same paper. Strictly greater-than.
pub const SIMILARITY_THRESHOLD: f64 = 0.8;

static NON_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

/// Resolves one record against the index, stopping at the first hit.
///
/// NOTE: Ordering is important here. The stored index id is authoritative;
/// arXiv links are cheaper and more precise than DOI links; a title search is
/// the last resort and must clear [`SIMILARITY_THRESHOLD`]. Lookup failures
/// are logged and fall through to the next step. The throttle fires after
/// every unsuccessful eprint or DOI query to respect the index's rate limits.
pub fn resolve(
    source: &dyn MetadataSource,
    throttle: &dyn Throttle,
    record: &Publication,
) -> Option<ResolvedMetadata> {
    if let Some(id) = record.inspire_id.as_deref().filter(|s| !s.is_empty()) {
        match source.by_id(id) {
            Ok(found) => return Some(found),
            Err(e) => eprintln!("INSPIRE-HEP ID search failed for {id}: {e:#}"),
        }
    }

    for link in &record.links {
        if link.kind.as_deref() == Some("arxiv")
            && let Some(arxiv_id) = arxiv::extract_arxiv_id(link.text.as_deref().unwrap_or(""))
        {
            match source.by_eprint(arxiv_id) {
                Ok(Some(found)) => return Some(found),
                Ok(None) => {}
                Err(e) => eprintln!("arXiv search failed for {arxiv_id}: {e:#}"),
            }
            throttle.pause();
        }
    }

    for link in &record.links {
        if link.kind.as_deref() == Some("doi")
            && let Some(doi) = doi::extract_doi(link.url.as_deref().unwrap_or(""))
        {
            match source.by_doi(doi) {
                Ok(Some(found)) => return Some(found),
                Ok(None) => {}
                Err(e) => eprintln!("DOI search failed for {doi}: {e:#}"),
            }
            throttle.pause();
        }
    }

    if let Some(title) = record.title.as_deref().filter(|t| !t.is_empty()) {
        match source.by_title(&title_query(title)) {
            Ok(candidates) => {
                for candidate in candidates {
                    let candidate_title = candidate.title.as_deref().unwrap_or("");
                    if title_similarity(title, candidate_title) > SIMILARITY_THRESHOLD {
                        return Some(candidate);
                    }
                }
            }
            Err(e) => eprintln!("Title search failed for '{title}': {e:#}"),
        }
    }

    None
}

/// Builds the title-search phrase: punctuation collapsed to spaces, first five
/// whitespace-delimited tokens.
pub fn title_query(title: &str) -> String {
    let cleaned = NON_WORD_RE.replace_all(title, " ");
    cleaned
        .split_whitespace()
        .take(5)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Jaccard index over the lower-cased word-token sets of two titles.
/// 0 when either side has no tokens.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let tokens_a = word_set(a);
    let tokens_b = word_set(b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }
    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();
    intersection as f64 / union as f64
}

fn word_set(s: &str) -> HashSet<String> {
    WORD_RE
        .find_iter(&s.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}
