//! ADAPTABLE database files.
//!
//! A library is a flat file of two-line records (see [`crate::core::codec`]),
//! loaded into an ordered map keyed by sequence.
//!
//! Two orderings are kept:
//! - the keyed map, one entry per sequence; a later entry with the same
//!   sequence replaces the earlier one in place
//! - the read order, every entry ever loaded or inserted, including those
//!   later replaced

pub mod legacy;

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use thiserror::Error;
use tokio::fs;

use crate::core::codec::{self, RecordError, MARKER};
use crate::domain::Entry;

/// Errors raised while reading a library
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Malformed stream at line {line}: {reason}")]
    MalformedStream { line: usize, reason: &'static str },

    #[error("Malformed record at line {line}: {source}")]
    Record { line: usize, source: RecordError },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of a lenient load
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Entries that were decoded
    pub library: Library,

    /// Records skipped because they were malformed
    pub skipped: Vec<LibraryError>,
}

/// Ordered collection of entries keyed by sequence
#[derive(Debug, Clone, Default)]
pub struct Library {
    entries: IndexMap<String, Entry>,
    read_order: Vec<Entry>,
}

impl Library {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, replacing any entry with the same sequence
    ///
    /// Returns the replaced entry. Both entries stay in the read order.
    pub fn insert(&mut self, entry: Entry) -> Option<Entry> {
        self.read_order.push(entry.clone());
        let replaced = self.entries.insert(entry.sequence().to_string(), entry);

        if let Some(old) = &replaced {
            tracing::debug!(sequence = %old.sequence(), "Replacing entry with the same sequence");
        }
        replaced
    }

    /// Entry by sequence
    pub fn get(&self, sequence: &str) -> Option<&Entry> {
        self.entries.get(sequence)
    }

    /// Entry by position in the read order
    pub fn get_index(&self, index: usize) -> Option<&Entry> {
        self.read_order.get(index)
    }

    pub fn contains(&self, sequence: &str) -> bool {
        self.entries.contains_key(sequence)
    }

    /// Number of distinct sequences
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in keyed order (the order they are saved in)
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    /// Every entry in read/insertion order, replaced ones included
    pub fn read_order(&self) -> &[Entry] {
        &self.read_order
    }

    /// Load a library, failing on the first malformed record
    pub fn load<R: BufRead>(reader: R) -> Result<Self, LibraryError> {
        parse(reader, true).map(|outcome| outcome.library)
    }

    /// Load a library, skipping malformed records
    ///
    /// Only I/O errors are fatal.
    pub fn load_lenient<R: BufRead>(reader: R) -> Result<LoadOutcome, LibraryError> {
        parse(reader, false)
    }

    /// Write every entry in keyed order
    pub fn save<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        for entry in self.entries.values() {
            writer.write_all(codec::encode(entry).as_bytes())?;
        }
        writer.flush()
    }

    /// Load a library file strictly
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .await
            .with_context(|| format!("Failed to read library: {}", path.display()))?;

        Self::load(bytes.as_slice())
            .with_context(|| format!("Failed to load library: {}", path.display()))
    }

    /// Load a library file, skipping malformed records
    pub async fn open_lenient(path: impl AsRef<Path>) -> Result<LoadOutcome> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .await
            .with_context(|| format!("Failed to read library: {}", path.display()))?;

        Self::load_lenient(bytes.as_slice())
            .with_context(|| format!("Failed to load library: {}", path.display()))
    }

    /// Save the library to a file
    pub async fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let mut content = Vec::new();
        self.save(&mut content)?;
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write library: {}", path.display()))?;

        tracing::info!("Library saved to '{}'", path.display());
        Ok(())
    }
}

fn parse<R: BufRead>(mut reader: R, strict: bool) -> Result<LoadOutcome, LibraryError> {
    let mut outcome = LoadOutcome::default();
    let skip = |error: LibraryError, skipped: &mut Vec<LibraryError>| {
        if strict {
            Err(error)
        } else {
            tracing::warn!("Skipping record: {}", error);
            skipped.push(error);
            Ok(())
        }
    };

    let mut buf = Vec::new();
    let mut line_no = 0;
    let mut pending: Option<(usize, String)> = None;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;

        let repaired = legacy::decode_line(&buf);
        if !repaired.unknown.is_empty() {
            tracing::warn!(
                line = line_no,
                "Bytes not encoded in UTF-8: {}",
                hex::encode(&repaired.unknown)
            );
        }

        let line = repaired.text.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with(MARKER) {
            if let Some((header_line, _)) = pending.replace((line_no, line.to_string())) {
                let error = LibraryError::MalformedStream {
                    line: header_line,
                    reason: "header line followed by another header line",
                };
                skip(error, &mut outcome.skipped)?;
            }
        } else if let Some((header_line, header)) = pending.take() {
            match codec::decode(&header, line) {
                Ok(entry) => {
                    outcome.library.insert(entry);
                }
                Err(source) => {
                    let error = LibraryError::Record {
                        line: header_line,
                        source,
                    };
                    skip(error, &mut outcome.skipped)?;
                }
            }
        } else {
            tracing::warn!(line = line_no, "Ignoring sequence line without a header");
        }
    }

    if let Some((header_line, _)) = pending {
        let error = LibraryError::MalformedStream {
            line: header_line,
            reason: "header line at end of stream",
        };
        skip(error, &mut outcome.skipped)?;
    }

    tracing::info!(
        "{} lines read -> {} entries loaded",
        line_no,
        outcome.library.len()
    );
    Ok(outcome)
}
