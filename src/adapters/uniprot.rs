//! UniProt REST client.
//!
//! Searches go through the `stream` endpoint (one accession per line, TSV);
//! entries are retrieved as XML.

use std::time::Duration;

use async_trait::async_trait;

use super::{parse_accession_list, DocumentSource, RetrievalFailure, SearchQuery};

/// Default UniProtKB REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://rest.uniprot.org/uniprotkb";

/// UniProt REST client
pub struct UniProtClient {
    /// Base URL of the UniProtKB API
    base_url: String,
    /// Timeout for searches
    search_timeout: Duration,
    /// Timeout for single-entry retrieval
    fetch_timeout: Duration,
    /// HTTP client
    client: reqwest::Client,
}

impl Default for UniProtClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl UniProtClient {
    /// Create a client with default timeouts (60s search, 5s fetch)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            search_timeout: Duration::from_secs(60),
            fetch_timeout: Duration::from_secs(5),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeouts(mut self, search: Duration, fetch: Duration) -> Self {
        self.search_timeout = search;
        self.fetch_timeout = fetch;
        self
    }

    /// Build the search URL endpoint
    fn search_url(&self) -> String {
        format!("{}/stream", self.base_url)
    }

    /// Build the entry URL
    fn entry_url(&self, accession: &str) -> String {
        format!("{}/{}.xml", self.base_url, accession)
    }

    /// UniProt query expression for a search
    pub fn query_expression(query: &SearchQuery) -> String {
        format!(
            "({}) AND (length:[1 TO {}]) AND (reviewed:{})",
            query.terms, query.max_length, query.reviewed
        )
    }

    async fn get_text(
        &self,
        request: reqwest::RequestBuilder,
        target: &str,
        timeout: Duration,
    ) -> Result<String, RetrievalFailure> {
        let failure = |e: reqwest::Error| {
            if e.is_timeout() {
                RetrievalFailure::Timeout {
                    target: target.to_string(),
                    seconds: timeout.as_secs(),
                }
            } else {
                RetrievalFailure::Transport {
                    target: target.to_string(),
                    message: e.to_string(),
                }
            }
        };

        let response = request.timeout(timeout).send().await.map_err(failure)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalFailure::Status {
                target: target.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(failure)
    }
}

#[async_trait]
impl DocumentSource for UniProtClient {
    fn name(&self) -> &str {
        "uniprot"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<String>, RetrievalFailure> {
        let expression = Self::query_expression(query);
        tracing::info!(query = %expression, "Interrogating UniProt");

        let request = self.client.get(self.search_url()).query(&[
            ("query", expression.as_str()),
            ("fields", "accession"),
            ("format", "tsv"),
        ]);

        let listing = self
            .get_text(request, &query.terms, self.search_timeout)
            .await?;
        let accessions = parse_accession_list(&listing);

        tracing::info!("UniProt returned {} entries", accessions.len());
        Ok(accessions)
    }

    async fn fetch(&self, accession: &str) -> Result<String, RetrievalFailure> {
        tracing::debug!(accession, "Retrieving entry from UniProt");

        let request = self.client.get(self.entry_url(accession));
        self.get_text(request, accession, self.fetch_timeout).await
    }
}
