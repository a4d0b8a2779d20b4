//! INSPIRE-HEP literature API client and response normalization.

use std::time::Duration;

use anyhow::Context;
use chrono::Local;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Deserialize;

use crate::publication::UrlRef;

pub const API_BASE: &str = "https://inspirehep.net/api";

const USER_AGENT: &str = "Mozilla/5.0 (compatible; sitemaint/0.1; +https://kenshikuroki.github.io)";

const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Lookup surface of the metadata index.
///
/// The resolver drives its fallback chain through this trait so tests can
/// substitute a canned source instead of the live service.
pub trait MetadataSource {
    /// Fetch one record by its index identifier.
    fn by_id(&self, inspire_id: &str) -> anyhow::Result<ResolvedMetadata>;
    /// Search by arXiv eprint number; `None` when the index has no hit.
    fn by_eprint(&self, arxiv_id: &str) -> anyhow::Result<Option<ResolvedMetadata>>;
    /// Search by DOI; `None` when the index has no hit.
    fn by_doi(&self, doi: &str) -> anyhow::Result<Option<ResolvedMetadata>>;
    /// Search by title phrase, returning up to five candidates in rank order.
    fn by_title(&self, query: &str) -> anyhow::Result<Vec<ResolvedMetadata>>;
}

/// Fields pulled out of one index record, normalized to the publications-file
/// shape. Venue fields default to empty strings; they only feed link text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedMetadata {
    pub inspire_id: String,
    pub citations: u64,
    pub last_updated: String,
    pub title: Option<String>,
    pub authors: Option<String>,
    pub journal: String,
    pub volume: String,
    pub pages: String,
    pub year: String,
    pub arxiv_id: Option<String>,
    pub arxiv_categories: Vec<String>,
    pub categories: Vec<String>,
    pub doi: Option<String>,
    pub urls: Vec<UrlRef>,
}

pub struct InspireClient {
    agent: ureq::Agent,
    base: String,
}

impl InspireClient {
    pub fn new() -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_connect(Some(Duration::from_secs(5)))
            .timeout_global(Some(Duration::from_secs(30)))
            .build();
        InspireClient {
            agent: ureq::Agent::new_with_config(config),
            base: API_BASE.to_string(),
        }
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> anyhow::Result<T> {
        let body: String = self
            .agent
            .get(url)
            .header("User-Agent", USER_AGENT)
            .call()
            .with_context(|| format!("request failed: {url}"))?
            .into_body()
            .read_to_string()
            .context("failed to read response body")?;
        serde_json::from_str(&body).with_context(|| format!("unexpected response shape from {url}"))
    }

    fn search(&self, query: &str, size: u8) -> anyhow::Result<SearchResponse> {
        let mut url = url::Url::parse(&format!("{}/literature", self.base))
            .context("bad literature search URL")?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("size", &size.to_string());
        self.get_json(url.as_str())
    }
}

impl Default for InspireClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataSource for InspireClient {
    fn by_id(&self, inspire_id: &str) -> anyhow::Result<ResolvedMetadata> {
        let id = utf8_percent_encode(inspire_id, PATH_SEGMENT_ENCODE_SET);
        let url = format!("{}/literature/{}", self.base, id);
        let response: FetchResponse = self.get_json(&url)?;
        Ok(extract_metadata(inspire_id, &response.metadata))
    }

    fn by_eprint(&self, arxiv_id: &str) -> anyhow::Result<Option<ResolvedMetadata>> {
        let response = self.search(&format!("eprint:{arxiv_id}"), 1)?;
        Ok(response.first_hit())
    }

    fn by_doi(&self, doi: &str) -> anyhow::Result<Option<ResolvedMetadata>> {
        let response = self.search(&format!("doi:{doi}"), 1)?;
        Ok(response.first_hit())
    }

    fn by_title(&self, query: &str) -> anyhow::Result<Vec<ResolvedMetadata>> {
        let response = self.search(&format!("title:\"{query}\""), 5)?;
        Ok(response
            .hits
            .hits
            .iter()
            .map(|hit| extract_metadata(&hit.id.to_string(), &hit.metadata))
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct FetchResponse {
    metadata: RecordMetadata,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Hits,
}

impl SearchResponse {
    fn first_hit(&self) -> Option<ResolvedMetadata> {
        if self.hits.total == 0 {
            return None;
        }
        self.hits
            .hits
            .first()
            .map(|hit| extract_metadata(&hit.id.to_string(), &hit.metadata))
    }
}

#[derive(Debug, Deserialize)]
struct Hits {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    id: RecordId,
    metadata: RecordMetadata,
}

// The index serves ids as strings on some routes and numbers on others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordId {
    Text(String),
    Number(u64),
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Text(s) => f.write_str(s),
            RecordId::Number(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RecordMetadata {
    citation_count: Option<u64>,
    #[serde(default)]
    titles: Vec<TitleEntry>,
    #[serde(default)]
    authors: Vec<AuthorEntry>,
    #[serde(default)]
    publication_info: Vec<VenueEntry>,
    preprint_date: Option<String>,
    #[serde(default)]
    arxiv_eprints: Vec<EprintEntry>,
    #[serde(default)]
    inspire_categories: Vec<CategoryEntry>,
    #[serde(default)]
    dois: Vec<DoiEntry>,
    #[serde(default)]
    urls: Vec<UrlEntry>,
}

#[derive(Debug, Deserialize)]
struct TitleEntry {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthorEntry {
    full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VenueEntry {
    journal_title: Option<String>,
    journal_volume: Option<String>,
    page_start: Option<String>,
    page_end: Option<String>,
    artid: Option<String>,
    year: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct EprintEntry {
    value: Option<String>,
    #[serde(default)]
    categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CategoryEntry {
    term: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DoiEntry {
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UrlEntry {
    description: Option<String>,
    value: Option<String>,
}

/// Normalizes one raw index record into the publication field shape.
///
/// First title, authors joined with ", ", first venue entry for journal,
/// volume, pages ("start-end" when both bounds are present, else the start
/// page, else the article id), year falling back to the first four characters
/// of the preprint date, first eprint and DOI, all external URLs.
fn extract_metadata(record_id: &str, metadata: &RecordMetadata) -> ResolvedMetadata {
    let mut resolved = ResolvedMetadata {
        inspire_id: record_id.to_string(),
        citations: metadata.citation_count.unwrap_or(0),
        last_updated: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        ..ResolvedMetadata::default()
    };
    if let Some(first) = metadata.titles.first() {
        resolved.title = Some(first.title.clone().unwrap_or_default());
    }
    let names: Vec<&str> = metadata
        .authors
        .iter()
        .filter_map(|a| a.full_name.as_deref())
        .filter(|name| !name.is_empty())
        .collect();
    if !names.is_empty() {
        resolved.authors = Some(names.join(", "));
    }
    if let Some(venue) = metadata.publication_info.first() {
        resolved.journal = venue.journal_title.clone().unwrap_or_default();
        resolved.volume = venue.journal_volume.clone().unwrap_or_default();
        resolved.pages = format_pages(venue);
        if let Some(year) = venue.year {
            resolved.year = year.to_string();
        }
    }
    if resolved.year.is_empty()
        && let Some(date) = metadata.preprint_date.as_deref()
        && !date.is_empty()
    {
        resolved.year = date.chars().take(4).collect();
    }
    if let Some(eprint) = metadata.arxiv_eprints.first() {
        resolved.arxiv_id = Some(eprint.value.clone().unwrap_or_default());
        resolved.arxiv_categories = eprint.categories.clone();
    }
    resolved.categories = metadata
        .inspire_categories
        .iter()
        .filter_map(|c| c.term.clone())
        .filter(|term| !term.is_empty())
        .collect();
    if let Some(doi) = metadata.dois.first() {
        resolved.doi = Some(doi.value.clone().unwrap_or_default());
    }
    resolved.urls = metadata
        .urls
        .iter()
        .map(|u| UrlRef {
            description: u.description.clone().unwrap_or_default(),
            value: u.value.clone().unwrap_or_default(),
        })
        .collect();
    resolved
}

fn format_pages(venue: &VenueEntry) -> String {
    let start = venue.page_start.as_deref().filter(|s| !s.is_empty());
    let end = venue.page_end.as_deref().filter(|s| !s.is_empty());
    let artid = venue.artid.as_deref().filter(|s| !s.is_empty());
    match (start, end, artid) {
        (Some(start), Some(end), _) => format!("{start}-{end}"),
        (Some(start), None, _) => start.to_string(),
        (None, _, Some(artid)) => artid.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(value: serde_json::Value) -> RecordMetadata {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn extracts_core_fields() {
        let meta = metadata(serde_json::json!({
            "citation_count": 12,
            "titles": [{"title": "Dark matter search"}, {"title": "older variant"}],
            "authors": [{"full_name": "Kuroki, K."}, {"full_name": "Sato, R."}],
            "arxiv_eprints": [{"value": "2410.01204", "categories": ["hep-ph", "hep-ex"]}],
            "inspire_categories": [{"term": "Phenomenology-HEP"}, {"term": "Experiment-HEP"}],
            "dois": [{"value": "10.1103/PhysRevD.102.034021"}],
            "urls": [{"description": "journal page", "value": "https://example.org/paper"}]
        }));
        let resolved = extract_metadata("2045170", &meta);
        assert_eq!(resolved.inspire_id, "2045170");
        assert_eq!(resolved.citations, 12);
        assert_eq!(resolved.title.as_deref(), Some("Dark matter search"));
        assert_eq!(resolved.authors.as_deref(), Some("Kuroki, K., Sato, R."));
        assert_eq!(resolved.arxiv_id.as_deref(), Some("2410.01204"));
        assert_eq!(resolved.arxiv_categories, vec!["hep-ph", "hep-ex"]);
        assert_eq!(resolved.categories, vec!["Phenomenology-HEP", "Experiment-HEP"]);
        assert_eq!(resolved.doi.as_deref(), Some("10.1103/PhysRevD.102.034021"));
        assert_eq!(resolved.urls.len(), 1);
        assert_eq!(resolved.urls[0].description, "journal page");
    }

    #[test]
    fn missing_citation_count_defaults_to_zero() {
        let resolved = extract_metadata("1", &metadata(serde_json::json!({})));
        assert_eq!(resolved.citations, 0);
        assert_eq!(resolved.title, None);
        assert_eq!(resolved.authors, None);
    }

    #[test]
    fn nameless_author_entries_produce_no_author_string() {
        let meta = metadata(serde_json::json!({
            "authors": [{"full_name": ""}, {}]
        }));
        assert_eq!(extract_metadata("1", &meta).authors, None);
    }

    #[test]
    fn page_range_joins_both_bounds_with_hyphen() {
        let meta = metadata(serde_json::json!({
            "publication_info": [{
                "journal_title": "Phys. Rev. D",
                "journal_volume": "102",
                "page_start": "211",
                "page_end": "245",
                "year": 2020
            }]
        }));
        let resolved = extract_metadata("1", &meta);
        assert_eq!(resolved.pages, "211-245");
        assert_eq!(resolved.journal, "Phys. Rev. D");
        assert_eq!(resolved.volume, "102");
        assert_eq!(resolved.year, "2020");
    }

    #[test]
    fn lone_start_page_then_artid_fallback() {
        let start_only = metadata(serde_json::json!({
            "publication_info": [{"page_start": "211"}]
        }));
        assert_eq!(extract_metadata("1", &start_only).pages, "211");

        let artid_only = metadata(serde_json::json!({
            "publication_info": [{"artid": "034021"}]
        }));
        assert_eq!(extract_metadata("1", &artid_only).pages, "034021");

        let neither = metadata(serde_json::json!({
            "publication_info": [{"journal_title": "JHEP"}]
        }));
        assert_eq!(extract_metadata("1", &neither).pages, "");
    }

    #[test]
    fn year_falls_back_to_preprint_date_prefix() {
        let meta = metadata(serde_json::json!({
            "preprint_date": "2024-10-03"
        }));
        assert_eq!(extract_metadata("1", &meta).year, "2024");

        let with_venue_year = metadata(serde_json::json!({
            "publication_info": [{"year": 2020}],
            "preprint_date": "2019-01-01"
        }));
        assert_eq!(extract_metadata("1", &with_venue_year).year, "2020");
    }

    #[test]
    fn last_updated_is_a_full_timestamp() {
        let resolved = extract_metadata("1", &metadata(serde_json::json!({})));
        assert!(
            chrono::NaiveDateTime::parse_from_str(&resolved.last_updated, "%Y-%m-%d %H:%M:%S")
                .is_ok(),
            "unexpected timestamp {}",
            resolved.last_updated
        );
    }

    #[test]
    fn search_response_ids_parse_as_strings_or_numbers() {
        let numeric: SearchResponse = serde_json::from_value(serde_json::json!({
            "hits": {"total": 1, "hits": [{"id": 2045170, "metadata": {"citation_count": 4}}]}
        }))
        .unwrap();
        let hit = numeric.first_hit().unwrap();
        assert_eq!(hit.inspire_id, "2045170");
        assert_eq!(hit.citations, 4);

        let text: SearchResponse = serde_json::from_value(serde_json::json!({
            "hits": {"total": 1, "hits": [{"id": "2045170", "metadata": {}}]}
        }))
        .unwrap();
        assert_eq!(text.first_hit().unwrap().inspire_id, "2045170");
    }

    #[test]
    fn zero_total_yields_no_hit() {
        let empty: SearchResponse = serde_json::from_value(serde_json::json!({
            "hits": {"total": 0, "hits": []}
        }))
        .unwrap();
        assert!(empty.first_hit().is_none());
    }
}
