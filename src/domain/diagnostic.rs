//! Advisory diagnostics produced while classifying documents.
//!
//! Diagnostics never block processing. The classifier returns them as
//! plain data and the caller routes them to one or more sinks.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Kind of advisory diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCategory {
    /// A cross-reference to a database type nobody triaged yet
    UnrecognizedDatabaseType,

    /// Free text hints at a property whose slot is still empty
    UnmatchedHeuristicHit,

    /// Full listing of an entry that raised heuristic hits
    EntryContent,

    /// A structured element lacks an expected child, attribute or text
    MalformedElement,

    /// A structured value could not be stored in the entry
    RejectedValue,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiagnosticCategory::UnrecognizedDatabaseType => "unrecognized_database_type",
            DiagnosticCategory::UnmatchedHeuristicHit => "unmatched_heuristic_hit",
            DiagnosticCategory::EntryContent => "entry_content",
            DiagnosticCategory::MalformedElement => "malformed_element",
            DiagnosticCategory::RejectedValue => "rejected_value",
        };
        f.write_str(label)
    }
}

/// A structured warning about one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Canonical entry identifier (accession), or "UNKNOWN"
    pub entry_id: String,

    /// Kind of diagnostic
    pub category: DiagnosticCategory,

    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(
        entry_id: impl Into<String>,
        category: DiagnosticCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            entry_id: entry_id.into(),
            category,
            message: message.into(),
        }
    }
}

/// Destination for diagnostics
pub trait DiagnosticSink {
    /// Record one diagnostic
    fn warn(&mut self, diagnostic: &Diagnostic);

    /// Record every diagnostic in order
    fn warn_all(&mut self, diagnostics: &[Diagnostic]) {
        for diagnostic in diagnostics {
            self.warn(diagnostic);
        }
    }
}

/// Emits diagnostics as `tracing` warnings
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warn(&mut self, diagnostic: &Diagnostic) {
        tracing::warn!(
            entry_id = %diagnostic.entry_id,
            category = %diagnostic.category,
            "{}",
            diagnostic.message
        );
    }
}

/// Collects diagnostics in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink for MemorySink {
    fn warn(&mut self, diagnostic: &Diagnostic) {
        self.diagnostics.push(diagnostic.clone());
    }
}

/// Appends diagnostics to a plain-text log file
///
/// Line format: `<RFC3339 timestamp> WARNING: <message>`.
pub struct LogFileSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl LogFileSink {
    /// Create (or truncate) the log file
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffered lines to disk
    pub fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .with_context(|| format!("Failed to flush log file: {}", self.path.display()))
    }
}

impl DiagnosticSink for LogFileSink {
    fn warn(&mut self, diagnostic: &Diagnostic) {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        if let Err(e) = writeln!(self.writer, "{} WARNING: {}", timestamp, diagnostic.message) {
            tracing::error!("Failed to write to {}: {}", self.path.display(), e);
        }
    }
}

impl Drop for LogFileSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Forwards every diagnostic to several sinks
#[derive(Default)]
pub struct FanoutSink<'a> {
    sinks: Vec<&'a mut dyn DiagnosticSink>,
}

impl<'a> FanoutSink<'a> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with(mut self, sink: &'a mut dyn DiagnosticSink) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl DiagnosticSink for FanoutSink<'_> {
    fn warn(&mut self, diagnostic: &Diagnostic) {
        for sink in self.sinks.iter_mut() {
            sink.warn(diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Diagnostic {
        Diagnostic::new(
            "P12345",
            DiagnosticCategory::UnrecognizedDatabaseType,
            "Uniprot Entry 'P12345' -> the following Database (FooBar) is ignored",
        )
    }

    #[test]
    fn test_memory_sink_collects_in_order() {
        let mut sink = MemorySink::default();
        let other = Diagnostic::new("P1", DiagnosticCategory::EntryContent, "dump");

        sink.warn_all(&[sample(), other.clone()]);

        assert_eq!(sink.diagnostics, vec![sample(), other]);
    }

    #[test]
    fn test_log_file_sink_format() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("importer.log");

        {
            let mut sink = LogFileSink::create(&path).unwrap();
            sink.warn(&sample());
            sink.flush().unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let line = content.lines().next().unwrap();
        assert!(line.contains(" WARNING: Uniprot Entry 'P12345'"));
        assert!(line.contains('T'));
    }

    #[test]
    fn test_fanout_reaches_every_sink() {
        let mut first = MemorySink::default();
        let mut second = MemorySink::default();

        {
            let mut fanout = FanoutSink::new().with(&mut first).with(&mut second);
            fanout.warn(&sample());
        }

        assert_eq!(first.diagnostics.len(), 1);
        assert_eq!(second.diagnostics.len(), 1);
    }

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&DiagnosticCategory::UnmatchedHeuristicHit).unwrap();
        assert_eq!(json, "\"unmatched_heuristic_hit\"");
        assert_eq!(
            DiagnosticCategory::UnmatchedHeuristicHit.to_string(),
            "unmatched_heuristic_hit"
        );
    }
}
