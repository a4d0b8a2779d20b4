//! Extraction of cross-reference identifiers from link text and URLs.

pub mod arxiv;
pub mod doi;
