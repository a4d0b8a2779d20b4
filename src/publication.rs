use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// One record of the publications file.
///
/// Only the fields the updater reads or writes are typed; everything else a
/// record carries (conference, location, hand-written venue fields, ...) is
/// kept verbatim in `extra` so a rewrite never drops it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publication {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspire_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<u64>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<UrlRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// An outbound reference rendered on the site, e.g. the arXiv or journal page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A `{description, value}` pair as delivered by the metadata index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlRef {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub value: String,
}

impl Publication {
    pub fn citation_count(&self) -> u64 {
        self.citations.unwrap_or(0)
    }

    pub fn has_link(&self, kind: &str) -> bool {
        self.links.iter().any(|l| l.kind.as_deref() == Some(kind))
    }
}

impl Link {
    pub fn new(kind: &str, text: String, url: String) -> Self {
        Link {
            kind: Some(kind.to_string()),
            text: Some(text),
            url: Some(url),
            extra: serde_json::Map::new(),
        }
    }
}

/// True when the field is missing or holds an empty string.
pub fn is_blank(field: &Option<String>) -> bool {
    field.as_deref().is_none_or(str::is_empty)
}

pub fn load(path: &Path) -> anyhow::Result<Vec<Publication>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let records = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(records)
}

/// Rewrites the whole collection in place: 2-space indentation, non-ASCII
/// characters kept literal. No temp-file swap, matching the site's tooling.
pub fn save(path: &Path, records: &[Publication]) -> anyhow::Result<()> {
    let body =
        serde_json::to_string_pretty(records).context("failed to serialize publications")?;
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
