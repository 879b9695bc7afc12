//! Core record and import logic.
//!
//! This module contains:
//! - Codec: two-line record encoding and decoding
//! - Document: owned element tree of a UniProt entry
//! - Classifier: populates entries from documents
//! - Importer: search, retrieve, classify and index entries

pub mod classifier;
pub mod codec;
pub mod document;
pub mod importer;

// Re-export commonly used types
pub use classifier::{Classification, Classifier, ClassifierTables};
pub use codec::{decode, encode, RecordError};
pub use document::{Document, DocumentError, Element};
pub use importer::{ImportSummary, Importer};
