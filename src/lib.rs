//! adaptable - UniProt importer for the ADAPTABLE peptide database
//!
//! Builds ADAPTABLE database files from UniProt entries. Each entry is a
//! sequence plus 65 multi-valued property slots, stored as a two-line
//! flat-file record.
//!
//! # Architecture
//!
//! The import is a small pipeline:
//! - A search lists accessions for a query
//! - Each accession is fetched as UniProt XML and parsed into a document
//! - The classifier populates an entry from the document, returning
//!   diagnostics for anything it could not place
//! - Entries are indexed by sequence and saved as a flat file
//!
//! # Modules
//!
//! - `adapters`: External sources (UniProt REST, response cache)
//! - `core`: Record codec, document tree, classifier, importer
//! - `domain`: Data structures (Schema, Entry, Diagnostic)
//! - `library`: Database files (load, save, legacy byte repair)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Import reviewed antimicrobial peptides up to 50 residues
//! adaptable import antimicrobial
//!
//! # Classify a saved entry offline
//! adaptable classify P12345.xml
//!
//! # Check a database file
//! adaptable check DATABASE_antimicrobial
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod library;

// Re-export main types at crate root for convenience
pub use crate::core::{decode, encode, Classification, Classifier, ClassifierTables, Document, Importer};
pub use crate::domain::{Diagnostic, DiagnosticCategory, DiagnosticSink, Entry};
pub use crate::library::Library;
