//! Adapter interfaces for remote document sources.
//!
//! Adapters provide a unified interface for listing and retrieving
//! UniProt entries, optionally behind an on-disk response cache.

pub mod cache;
pub mod uniprot;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cache::{CachedSource, ResponseCache};
pub use uniprot::UniProtClient;

/// A document could not be retrieved
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetrievalFailure {
    #[error("{target} did not respond within {seconds} seconds")]
    Timeout { target: String, seconds: u64 },

    #[error("{target} was rejected (status code {status})")]
    Status { target: String, status: u16 },

    #[error("Failed to reach {target}: {message}")]
    Transport { target: String, message: String },
}

/// A search for candidate entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free query terms (e.g. "antimicrobial")
    pub terms: String,

    /// Maximum sequence length, in residues
    pub max_length: usize,

    /// Restrict to reviewed (Swiss-Prot) entries
    pub reviewed: bool,
}

impl SearchQuery {
    pub fn new(terms: impl Into<String>, max_length: usize, reviewed: bool) -> Self {
        Self {
            terms: terms.into(),
            max_length,
            reviewed,
        }
    }

    /// Stable key identifying this search in a response cache
    pub fn cache_key(&self) -> String {
        format!(
            "search:{}:{}:{}",
            self.terms, self.max_length, self.reviewed
        )
    }
}

/// Source of raw entry documents
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Human-readable source name
    fn name(&self) -> &str;

    /// List the accessions matching a search
    async fn search(&self, query: &SearchQuery) -> Result<Vec<String>, RetrievalFailure>;

    /// Retrieve the raw document of one accession
    async fn fetch(&self, accession: &str) -> Result<String, RetrievalFailure>;
}

/// Parse a one-column accession listing
///
/// Blank lines and the `Entry` column header are skipped.
pub fn parse_accession_list(listing: &str) -> Vec<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && *line != "Entry")
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accession_list() {
        let listing = "Entry\nP12345\n\n  Q99999 \n";
        assert_eq!(parse_accession_list(listing), ["P12345", "Q99999"]);
        assert!(parse_accession_list("Entry\n").is_empty());
    }

    #[test]
    fn test_cache_key_distinguishes_parameters() {
        let reviewed = SearchQuery::new("antimicrobial", 50, true);
        let all = SearchQuery::new("antimicrobial", 50, false);
        let longer = SearchQuery::new("antimicrobial", 80, true);

        assert_ne!(reviewed.cache_key(), all.cache_key());
        assert_ne!(reviewed.cache_key(), longer.cache_key());
        assert_eq!(reviewed.cache_key(), "search:antimicrobial:50:true");
    }
}
