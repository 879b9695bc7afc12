//! Two-line record format of the ADAPTABLE database.
//!
//! ```text
//! >uniprotP12345; ACDEFG; Test protein; _ _ ... _
//! ACDEFG
//! ```
//!
//! The header holds one field per schema slot, in slot order. An unset slot
//! is written as `_`; a set slot is its values joined by `;` with a trailing
//! `;`. The second line is the raw sequence.

use thiserror::Error;

use crate::domain::{slots, Entry, EntryError, SLOT_COUNT};

/// Header line marker
pub const MARKER: char = '>';

/// Field written for a slot without values
pub const PLACEHOLDER: &str = "_";

/// Value separator inside a field
pub const SEPARATOR: char = ';';

/// A record that cannot be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("Header line does not start with '>'")]
    MissingMarker,

    #[error("Sequence line is empty")]
    EmptySequence,

    #[error("Header sequence {header:?} does not match sequence line {sequence:?}")]
    SequenceMismatch { header: String, sequence: String },

    #[error(transparent)]
    Entry(#[from] EntryError),
}

/// Encode an entry as a header line and a sequence line, both newline-terminated
pub fn encode(entry: &Entry) -> String {
    let mut record = String::with_capacity(4 * SLOT_COUNT + 2 * entry.sequence().len());
    record.push(MARKER);

    for (slot_id, values) in entry.slots() {
        if slot_id > 1 {
            record.push(' ');
        }

        if values.is_empty() {
            record.push_str(PLACEHOLDER);
        } else {
            for value in values {
                record.push_str(value);
                record.push(SEPARATOR);
            }
        }
    }

    record.push('\n');
    record.push_str(entry.sequence());
    record.push('\n');
    record
}

/// Decode a header line and its paired sequence line
///
/// Missing trailing fields are unset; fields beyond the schema are ignored.
/// A non-empty `sequence` field must agree with the sequence line.
pub fn decode(header_line: &str, sequence_line: &str) -> Result<Entry, RecordError> {
    let body = header_line
        .trim_end()
        .strip_prefix(MARKER)
        .ok_or(RecordError::MissingMarker)?;

    let sequence = sequence_line.trim();
    if sequence.is_empty() {
        return Err(RecordError::EmptySequence);
    }

    let mut entry = Entry::try_new(sequence)?;

    for (idx, field) in split_fields(body).into_iter().take(SLOT_COUNT).enumerate() {
        let slot_id = idx + 1;
        if field == PLACEHOLDER {
            continue;
        }

        for value in field.split(SEPARATOR).map(str::trim).filter(|v| !v.is_empty()) {
            if slot_id == slots::SEQUENCE && value != sequence {
                return Err(RecordError::SequenceMismatch {
                    header: value.to_string(),
                    sequence: sequence.to_string(),
                });
            }
            entry.push(slot_id, value)?;
        }
    }

    Ok(entry)
}

/// Split a header body into fields
///
/// Fields are whitespace-separated, but a set field always ends with `;`,
/// so whitespace inside a value (`Test protein;`) does not end the field.
/// Tokens are only joined when the run ends in a `;`-terminated token
/// before any `_`. Otherwise every token is its own field, which is how
/// hand-edited headers without separators are read.
fn split_fields(body: &str) -> Vec<&str> {
    let tokens = tokens(body);
    let mut fields = Vec::with_capacity(tokens.len());
    let mut idx = 0;

    while idx < tokens.len() {
        let (start, token) = tokens[idx];
        let run_end = tokens[idx..]
            .iter()
            .position(|(_, t)| *t == PLACEHOLDER || t.ends_with(SEPARATOR))
            .map(|offset| idx + offset)
            .filter(|end| tokens[*end].1.ends_with(SEPARATOR));

        match run_end {
            Some(end) => {
                let (last_start, last) = tokens[end];
                fields.push(&body[start..last_start + last.len()]);
                idx = end + 1;
            }
            None => {
                fields.push(token);
                idx += 1;
            }
        }
    }

    fields
}

/// Whitespace-separated tokens with their byte offsets
fn tokens(body: &str) -> Vec<(usize, &str)> {
    let mut tokens = Vec::new();
    let mut token_start = None;

    for (idx, ch) in body.char_indices() {
        match (ch.is_whitespace(), token_start) {
            (true, Some(start)) => {
                tokens.push((start, &body[start..idx]));
                token_start = None;
            }
            (false, None) => token_start = Some(idx),
            _ => {}
        }
    }

    if let Some(start) = token_start {
        tokens.push((start, &body[start..]));
    }

    tokens
}
