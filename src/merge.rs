//! Field-level merge of resolved index metadata into a publication record.

use crate::inspire::ResolvedMetadata;
use crate::publication::{Link, Publication, is_blank};

/// Applies the merge policy and returns the updated record.
///
/// `citations` and `last_updated` are always taken from the index. `title`,
/// `authors` and `inspire_id` are filled only when the record's own value is
/// missing or empty. `categories` and `urls` are replaced wholesale when the
/// index delivered a non-empty set. Venue fields (journal, volume, pages,
/// year) are never written to the record; they only shape new link text.
pub fn merge_metadata(current: &Publication, resolved: &ResolvedMetadata) -> Publication {
    let mut updated = current.clone();

    updated.citations = Some(resolved.citations);
    updated.last_updated = Some(resolved.last_updated.clone());

    if is_blank(&updated.title) && resolved.title.is_some() {
        updated.title = resolved.title.clone();
    }
    if is_blank(&updated.authors) && resolved.authors.is_some() {
        updated.authors = resolved.authors.clone();
    }
    if is_blank(&updated.inspire_id) {
        updated.inspire_id = Some(resolved.inspire_id.clone());
    }
    if !resolved.categories.is_empty() {
        updated.categories = Some(resolved.categories.clone());
    }
    if !resolved.urls.is_empty() {
        updated.urls = Some(resolved.urls.clone());
    }

    update_links(&mut updated, resolved);
    updated
}

/// Appends auto-managed `doi` and `arxiv` links when the record lacks them.
/// Existing links of those types are never touched, so reapplying the same
/// resolved data is a no-op.
pub fn update_links(record: &mut Publication, resolved: &ResolvedMetadata) {
    if let Some(doi) = resolved.doi.as_deref().filter(|d| !d.is_empty())
        && !record.has_link("doi")
    {
        // Journal reference as display text when the venue is known, the DOI
        // itself otherwise.
        let text = if resolved.journal.is_empty() {
            doi.to_string()
        } else {
            format!(
                "{} {}, {} ({})",
                resolved.journal, resolved.volume, resolved.pages, resolved.year
            )
        };
        record
            .links
            .push(Link::new("doi", text, format!("https://doi.org/{doi}")));
    }

    if let Some(arxiv_id) = resolved.arxiv_id.as_deref().filter(|a| !a.is_empty())
        && !record.has_link("arxiv")
    {
        record.links.push(Link::new(
            "arxiv",
            format!("arXiv:{arxiv_id}"),
            format!("https://arxiv.org/abs/{arxiv_id}"),
        ));
    }
}

/// Human-readable summary of what a merge changed, for the per-record console
/// line. Empty when the merge was a no-op apart from `last_updated`.
pub fn diff_changes(before: &Publication, after: &Publication) -> Vec<String> {
    let mut changes = Vec::new();
    if before.citation_count() != after.citation_count() {
        changes.push(format!(
            "citations: {} → {}",
            before.citation_count(),
            after.citation_count()
        ));
    }
    if before.inspire_id != after.inspire_id {
        changes.push(format!(
            "inspire_id: {} → {}",
            before.inspire_id.as_deref().unwrap_or("None"),
            after.inspire_id.as_deref().unwrap_or("None")
        ));
    }
    for (name, old, new) in [
        ("title", &before.title, &after.title),
        ("authors", &before.authors, &after.authors),
    ] {
        let old_val = old.as_deref().unwrap_or("");
        let new_val = new.as_deref().unwrap_or("");
        if old_val != new_val && !new_val.is_empty() {
            changes.push(format!("{name}: updated"));
        }
    }
    changes
}
