//! A single ADAPTABLE record: a sequence and its schema slot values.

use std::fmt;

use thiserror::Error;

use super::schema::{self, slots, UnknownSlot, SLOT_COUNT};

/// Errors raised when reading or writing entry slots
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error(transparent)]
    UnknownSlot(#[from] UnknownSlot),

    #[error("Invalid value {value:?} for property '{slot}': {reason}")]
    InvalidValue {
        slot: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Invalid sequence {sequence:?}: {reason}")]
    InvalidSequence {
        sequence: String,
        reason: &'static str,
    },
}

/// One biological sequence record
///
/// Slot values are only ever appended. Slot 2 (`sequence`) always holds
/// exactly `[sequence]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    sequence: String,
    properties: Vec<Vec<String>>,
}

impl Entry {
    /// Create an entry with every slot unset except `sequence`
    ///
    /// The sequence is taken as is. It must be non-empty and fit on the
    /// sequence line of a record; use [`Entry::try_new`] for sequences read
    /// from outside the crate.
    pub fn new(sequence: impl Into<String>) -> Self {
        let sequence = sequence.into();
        let mut properties = vec![Vec::new(); SLOT_COUNT];
        properties[slots::SEQUENCE - 1].push(sequence.clone());

        Self {
            sequence,
            properties,
        }
    }

    /// Create an entry after checking the sequence
    ///
    /// Rejects empty sequences and sequences containing whitespace, `;`,
    /// or starting with the header marker `>`.
    pub fn try_new(sequence: impl Into<String>) -> Result<Self, EntryError> {
        let sequence = sequence.into();

        let reason = if sequence.is_empty() {
            Some("sequence is empty")
        } else if sequence.chars().any(char::is_whitespace) {
            Some("sequence contains whitespace")
        } else if sequence.contains(';') {
            Some("sequence contains the field separator ';'")
        } else if sequence.starts_with('>') {
            Some("sequence starts with the header marker '>'")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(EntryError::InvalidSequence { sequence, reason }),
            None => Ok(Self::new(sequence)),
        }
    }

    /// The amino-acid sequence (primary key)
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// Values of a slot by id
    pub fn values(&self, slot_id: usize) -> Result<&[String], UnknownSlot> {
        let id = schema::check_id(slot_id)?;
        Ok(&self.properties[id - 1])
    }

    /// Values of a slot by name
    pub fn values_by_name(&self, name: &str) -> Result<&[String], UnknownSlot> {
        self.values(schema::id_of(name)?)
    }

    /// Whether a slot has no values
    pub fn is_unset(&self, slot_id: usize) -> Result<bool, UnknownSlot> {
        Ok(self.values(slot_id)?.is_empty())
    }

    /// Append a value to a slot by id
    ///
    /// The value is trimmed. Empty values, values containing the field
    /// separator `;` or a line break, and values with a lone `_` word are
    /// rejected.
    pub fn push(&mut self, slot_id: usize, value: impl AsRef<str>) -> Result<(), EntryError> {
        let id = schema::check_id(slot_id)?;
        let slot = schema::SLOT_NAMES[id - 1];
        let value = value.as_ref().trim();

        let reason = if value.is_empty() {
            Some("value is empty")
        } else if value.contains(';') {
            Some("value contains the field separator ';'")
        } else if value.contains(['\n', '\r']) {
            Some("value contains a line break")
        } else if value.split_whitespace().any(|token| token == "_") {
            Some("value contains the placeholder '_' as a word")
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(EntryError::InvalidValue {
                slot,
                value: value.to_string(),
                reason,
            });
        }

        if id == slots::SEQUENCE {
            if value != self.sequence {
                return Err(EntryError::InvalidValue {
                    slot,
                    value: value.to_string(),
                    reason: "sequence slot must match the entry sequence",
                });
            }
            return Ok(());
        }

        self.properties[id - 1].push(value.to_string());
        Ok(())
    }

    /// Append a value to a slot by name
    pub fn push_by_name(&mut self, name: &str, value: impl AsRef<str>) -> Result<(), EntryError> {
        let id = schema::id_of(name)?;
        self.push(id, value)
    }

    /// Iterate `(slot id, values)` in serialization order
    pub fn slots(&self) -> impl Iterator<Item = (usize, &[String])> {
        self.properties
            .iter()
            .enumerate()
            .map(|(idx, values)| (idx + 1, values.as_slice()))
    }

    /// First value of the `name` slot, or "UNKNOWN"
    pub fn name(&self) -> &str {
        self.properties[slots::NAME - 1]
            .first()
            .map(String::as_str)
            .unwrap_or("UNKNOWN")
    }

    /// Multi-line listing of every slot, used in diagnostics
    pub fn human_readable(&self) -> String {
        let mut content = String::from("ADAPTABLE Entry:\n");

        for (idx, values) in self.properties.iter().enumerate() {
            content.push_str(&format!(
                "  -> {}: {}\n",
                schema::SLOT_NAMES[idx],
                values.join("; ")
            ));
        }

        content
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name(), self.sequence)
    }
}
