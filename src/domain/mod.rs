//! Domain types for the ADAPTABLE database.
//!
//! This module contains the core data structures:
//! - Schema: the fixed table of 65 property slots
//! - Entry: one sequence record and its slot values
//! - Diagnostic: advisory warnings and the sinks that receive them

pub mod diagnostic;
pub mod entry;
pub mod schema;

// Re-export commonly used types
pub use diagnostic::{
    Diagnostic, DiagnosticCategory, DiagnosticSink, FanoutSink, LogFileSink, MemorySink,
    TracingSink,
};
pub use entry::{Entry, EntryError};
pub use schema::{slots, UnknownSlot, SLOT_COUNT, SLOT_NAMES};
