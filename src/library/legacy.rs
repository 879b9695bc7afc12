//! Repair of legacy database lines that are not valid UTF-8.
//!
//! Older database files were edited with cp1252/latin-1 tools and carry
//! stray single bytes. Known bytes are mapped to what the curators meant;
//! anything else becomes U+FFFD and is reported.

use std::borrow::Cow;

/// Known single-byte replacements
pub const REPLACEMENTS: &[(u8, char)] = &[
    (0xA0, ' '), // non-break space
    (0x96, ' '), // start of guarded area
    (0xB5, 'µ'),
    (0xEC, 'µ'), // µ wrongly encoded as ì
    (0xB1, '±'),
];

/// A repaired line and the bytes that had no known replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repaired<'a> {
    pub text: Cow<'a, str>,
    pub unknown: Vec<u8>,
}

/// Decode a raw line, repairing invalid bytes
pub fn decode_line(bytes: &[u8]) -> Repaired<'_> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Repaired {
            text: Cow::Borrowed(text),
            unknown: Vec::new(),
        };
    }

    let mut text = String::with_capacity(bytes.len());
    let mut unknown = Vec::new();
    let mut rest = bytes;

    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                text.push_str(valid);
                break;
            }
            Err(e) => {
                let (valid, after) = rest.split_at(e.valid_up_to());
                text.push_str(std::str::from_utf8(valid).unwrap_or_default());

                let bad_len = e.error_len().unwrap_or(after.len());
                for &byte in &after[..bad_len] {
                    match replacement(byte) {
                        Some(ch) => text.push(ch),
                        None => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            unknown.push(byte);
                        }
                    }
                }
                rest = &after[bad_len..];
            }
        }
    }

    Repaired {
        text: Cow::Owned(text),
        unknown,
    }
}

fn replacement(byte: u8) -> Option<char> {
    REPLACEMENTS
        .iter()
        .find(|(b, _)| *b == byte)
        .map(|(_, ch)| *ch)
}
