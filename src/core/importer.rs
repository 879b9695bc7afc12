//! Import pipeline: search, retrieve, classify, index.
//!
//! Retrieval failures are counted and skipped; once more than `max_errors`
//! accessions failed the run stops early and keeps what it has.

use std::fmt;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::adapters::{DocumentSource, SearchQuery};
use crate::domain::{DiagnosticSink, Entry};
use crate::library::Library;

use super::classifier::Classifier;
use super::document::Document;

/// Default number of tolerated retrieval errors
pub const DEFAULT_MAX_ERRORS: usize = 10;

/// Counters of one import run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Accessions returned by the search
    pub listed: usize,

    /// Documents retrieved and parsed
    pub retrieved: usize,

    /// Entries whose sequence is not in the reference library
    pub new_entries: usize,

    /// Entries whose sequence already is in the reference library
    pub known_entries: usize,

    /// Accessions that could not be retrieved or parsed
    pub errors: usize,

    /// Diagnostics routed to the sink
    pub diagnostics: usize,

    /// Whether the run stopped after too many errors
    pub aborted: bool,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries retrieved -> {} new entries (i.e. not already in ADAPTABLE)",
            self.retrieved, self.new_entries
        )
    }
}

/// Imports UniProt entries into a library
pub struct Importer {
    source: Box<dyn DocumentSource>,
    classifier: Classifier,
    max_errors: usize,
    reference: Option<Library>,
}

impl Importer {
    pub fn new(source: impl DocumentSource + 'static, classifier: Classifier) -> Self {
        Self {
            source: Box::new(source),
            classifier,
            max_errors: DEFAULT_MAX_ERRORS,
            reference: None,
        }
    }

    /// Stop after more than `max_errors` failed accessions
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }

    /// Count entries already present in `reference` as known rather than new
    pub fn with_reference(mut self, reference: Library) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Search the source and import every match
    #[instrument(skip(self, library, sink), fields(source = %self.source.name(), query = %query.terms))]
    pub async fn run(
        &self,
        query: &SearchQuery,
        library: &mut Library,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<ImportSummary> {
        let accessions = self
            .source
            .search(query)
            .await
            .with_context(|| format!("Search '{}' failed", query.terms))?;

        info!("Search returned {} entries", accessions.len());
        Ok(self.import(&accessions, library, sink).await)
    }

    /// Import a list of accessions
    pub async fn import(
        &self,
        accessions: &[String],
        library: &mut Library,
        sink: &mut dyn DiagnosticSink,
    ) -> ImportSummary {
        let mut summary = ImportSummary {
            listed: accessions.len(),
            ..Default::default()
        };

        for (num, accession) in accessions.iter().enumerate() {
            debug!(accession = %accession, "Processing entry {}/{}", num + 1, accessions.len());

            let (document, mut entry) = match self.retrieve(accession).await {
                Ok(retrieved) => retrieved,
                Err(e) => {
                    warn!("Could not retrieve ID:{} from UniProt, it will be ignored: {:#}", accession, e);
                    summary.errors += 1;

                    if summary.errors > self.max_errors {
                        warn!("Max errors ({}) reached... Aborting", self.max_errors);
                        summary.aborted = true;
                        break;
                    }
                    continue;
                }
            };
            summary.retrieved += 1;

            let known = self
                .reference
                .as_ref()
                .map_or(false, |reference| reference.contains(entry.sequence()));
            if known {
                summary.known_entries += 1;
            } else {
                summary.new_entries += 1;
            }
            debug!(accession = %accession, known, "Entry '{}'", ellipsize(entry.sequence(), 50));

            let classification = self.classifier.populate(&mut entry, &document);
            summary.diagnostics += classification.diagnostics.len();
            sink.warn_all(&classification.diagnostics);

            library.insert(entry);
        }

        info!(
            retrieved = summary.retrieved,
            errors = summary.errors,
            "Import finished"
        );
        summary
    }

    async fn retrieve(&self, accession: &str) -> Result<(Document, Entry)> {
        let xml = self.source.fetch(accession).await?;
        let document = Document::parse(&xml)
            .with_context(|| format!("Failed to parse entry {}", accession))?;
        let sequence = document
            .sequence()
            .with_context(|| format!("Entry {} has no usable sequence", accession))?;
        let entry = Entry::try_new(sequence)
            .with_context(|| format!("Entry {} has no usable sequence", accession))?;

        Ok((document, entry))
    }
}

/// Shorten long sequences for log lines
fn ellipsize(sequence: &str, max: usize) -> String {
    match sequence.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &sequence[..idx]),
        None => sequence.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ellipsize() {
        assert_eq!(ellipsize("ACDE", 50), "ACDE");
        assert_eq!(ellipsize("ACDEFG", 3), "ACD...");
    }

    #[test]
    fn test_summary_display() {
        let summary = ImportSummary {
            retrieved: 12,
            new_entries: 7,
            ..Default::default()
        };
        assert_eq!(
            summary.to_string(),
            "12 entries retrieved -> 7 new entries (i.e. not already in ADAPTABLE)"
        );
    }
}
