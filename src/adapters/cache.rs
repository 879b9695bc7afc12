//! Content-addressed response cache.
//!
//! Responses are stored as files named after SHA256(key)[0:16]. The cache
//! is advisory: read or write failures are logged and ignored.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::fs;

use super::{parse_accession_list, DocumentSource, RetrievalFailure, SearchQuery};

/// On-disk response cache
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for a key (first 8 bytes of its SHA256, hex encoded)
    pub fn file_name(key: &str) -> String {
        let digest = Sha256::digest(key.as_bytes());
        hex::encode(&digest[..8])
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(Self::file_name(key))
    }

    /// Read a cached response
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);

        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read cache file: {}", path.display())),
        }
    }

    /// Store a response
    pub async fn put(&self, key: &str, content: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create cache directory: {}", self.dir.display()))?;

        let path = self.path_for(key);
        fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write cache file: {}", path.display()))?;

        Ok(())
    }

    async fn lookup(&self, key: &str) -> Option<String> {
        match self.get(key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!("Ignoring unreadable cache entry for {}: {:#}", key, e);
                None
            }
        }
    }

    async fn store(&self, key: &str, content: &str) {
        if let Err(e) = self.put(key, content).await {
            tracing::warn!("Failed to cache response for {}: {:#}", key, e);
        }
    }
}

/// A document source that answers from the cache when it can
pub struct CachedSource<S> {
    inner: S,
    cache: ResponseCache,
}

impl<S: DocumentSource> CachedSource<S> {
    pub fn new(inner: S, cache: ResponseCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    fn entry_key(accession: &str) -> String {
        format!("entry:{}", accession)
    }
}

#[async_trait]
impl<S: DocumentSource> DocumentSource for CachedSource<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<String>, RetrievalFailure> {
        let key = query.cache_key();

        if let Some(listing) = self.cache.lookup(&key).await {
            tracing::info!("Search '{}' answered from cache", query.terms);
            return Ok(parse_accession_list(&listing));
        }

        let accessions = self.inner.search(query).await?;
        self.cache.store(&key, &accessions.join("\n")).await;
        Ok(accessions)
    }

    async fn fetch(&self, accession: &str) -> Result<String, RetrievalFailure> {
        let key = Self::entry_key(accession);

        if let Some(document) = self.cache.lookup(&key).await {
            tracing::debug!(accession, "Loaded entry from cache");
            return Ok(document);
        }

        let document = self.inner.fetch(accession).await?;
        self.cache.store(&key, &document).await;
        Ok(document)
    }
}
