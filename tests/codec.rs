//! Record Codec Integration Tests
//!
//! Tests for the two-line record format: field order, placeholders and
//! canonical re-encoding.

use adaptable::core::{decode, encode, RecordError};
use adaptable::domain::{slots, Entry, SLOT_COUNT};

fn header_of(record: &str) -> &str {
    record.lines().next().unwrap()
}

#[test]
fn test_encode_decode_round_trip() {
    let mut entry = Entry::new("ACDEFG");
    entry.push(slots::ID, "uniprotP12345").unwrap();
    entry.push(slots::ID, "pfamPF00001").unwrap();
    entry.push(slots::NAME, "Test protein").unwrap();
    entry.push_by_name("antimicrobial", "antimicrobial").unwrap();

    let record = encode(&entry);
    let mut lines = record.lines();
    let decoded = decode(lines.next().unwrap(), lines.next().unwrap()).unwrap();

    assert_eq!(decoded, entry);
    assert_eq!(encode(&decoded), record);
}

#[test]
fn test_header_has_one_field_per_slot_in_order() {
    let mut entry = Entry::new("ACDEFG");
    entry.push(slots::ID, "uniprotP12345").unwrap();
    entry.push(slots::TAXONOMY, "NCBI:9606").unwrap();

    let record = encode(&entry);
    let fields: Vec<&str> = header_of(&record)[1..].split(' ').collect();

    assert_eq!(fields.len(), SLOT_COUNT);
    assert_eq!(fields[slots::ID - 1], "uniprotP12345;");
    assert_eq!(fields[slots::SEQUENCE - 1], "ACDEFG;");
    assert_eq!(fields[slots::TAXONOMY - 1], "NCBI:9606;");

    // Everything else is a placeholder
    let unset = fields.iter().filter(|f| **f == "_").count();
    assert_eq!(unset, SLOT_COUNT - 3);
}

#[test]
fn test_unset_slots_use_placeholder_and_decode_empty() {
    let record = encode(&Entry::new("KLK"));
    let header = header_of(&record);

    assert!(header.starts_with(">_ KLK; _ _"));

    let decoded = decode(header, "KLK").unwrap();
    for (slot_id, values) in decoded.slots() {
        if slot_id != slots::SEQUENCE {
            assert!(values.is_empty(), "slot {} should be unset", slot_id);
        }
    }
}

#[test]
fn test_name_with_spaces_is_one_field() {
    let header = ">uniprotP12345; ACDEFG; Test protein; Homo sapiens;";
    let entry = decode(header, "ACDEFG").unwrap();

    assert_eq!(entry.values(slots::ID).unwrap(), ["uniprotP12345"]);
    assert_eq!(entry.values(slots::NAME).unwrap(), ["Test protein"]);
    assert_eq!(entry.values(slots::SOURCE).unwrap(), ["Homo sapiens"]);
    assert!(entry.is_unset(slots::GENE).unwrap());
}

#[test]
fn test_short_header_is_padded_on_encode() {
    let entry = decode("> _ _ _", "AA").unwrap();
    assert_eq!(entry.sequence(), "AA");
    assert_eq!(entry.values(slots::SEQUENCE).unwrap(), ["AA"]);

    // Re-encoding gives the canonical 65-field form, which is a fixpoint
    let canonical = encode(&entry);
    assert_eq!(header_of(&canonical)[1..].split(' ').count(), SLOT_COUNT);

    let mut lines = canonical.lines();
    let again = decode(lines.next().unwrap(), lines.next().unwrap()).unwrap();
    assert_eq!(encode(&again), canonical);
}

#[test]
fn test_extra_fields_are_ignored() {
    let mut header = String::from(">");
    header.push_str(&vec!["_"; SLOT_COUNT + 3].join(" "));

    let entry = decode(&header, "AA").unwrap();
    assert_eq!(entry.slots().count(), SLOT_COUNT);
}

#[test]
fn test_multi_valued_field() {
    let entry = decode(">uniprotP1;pfamPF1;supfamSSF1; _", "AA").unwrap();
    assert_eq!(
        entry.values(slots::ID).unwrap(),
        ["uniprotP1", "pfamPF1", "supfamSSF1"]
    );
}

#[test]
fn test_malformed_records() {
    assert_eq!(decode("uniprotP1; _", "AA"), Err(RecordError::MissingMarker));
    assert_eq!(decode(">_ _", ""), Err(RecordError::EmptySequence));
    assert!(matches!(
        decode(">_ GG; _", "AA"),
        Err(RecordError::SequenceMismatch { .. })
    ));
}

#[test]
fn test_round_trip_with_awkward_values() {
    let mut entry = Entry::new("ACDEFG");
    entry.push(slots::NAME, "alpha\tbeta").unwrap();
    entry.push(slots::NAME, "Test   protein").unwrap();
    entry.push(slots::NAME, "_alpha").unwrap();
    entry.push(slots::SOURCE, "Homo sapiens").unwrap();
    entry.push(slots::GENE, "x_ y").unwrap();

    let record = encode(&entry);
    let mut lines = record.lines();
    let decoded = decode(lines.next().unwrap(), lines.next().unwrap()).unwrap();

    assert_eq!(decoded, entry);
}

#[test]
fn test_placeholder_words_cannot_enter_a_record() {
    let mut entry = Entry::new("ACDEFG");

    // A value with a lone `_` word would be read back as an unset slot
    assert!(entry.push(slots::NAME, "_").is_err());
    assert!(entry.push(slots::NAME, "_ alpha").is_err());
    entry.push(slots::SOURCE, "Homo sapiens").unwrap();

    let record = encode(&entry);
    let mut lines = record.lines();
    let decoded = decode(lines.next().unwrap(), lines.next().unwrap()).unwrap();

    assert!(decoded.is_unset(slots::NAME).unwrap());
    assert_eq!(decoded.values(slots::SOURCE).unwrap(), ["Homo sapiens"]);
    assert_eq!(decoded, entry);
}

#[test]
fn test_header_without_separators_reads_one_field_per_word() {
    let entry = decode(">uniprotP1 _ TestName _", "AA").unwrap();

    assert_eq!(entry.values(slots::ID).unwrap(), ["uniprotP1"]);
    assert_eq!(entry.values(slots::NAME).unwrap(), ["TestName"]);
    assert!(entry.is_unset(slots::SOURCE).unwrap());
}

#[test]
fn test_invalid_sequence_line_is_rejected() {
    assert!(matches!(
        decode(">_ _", "AC;DE"),
        Err(RecordError::Entry(_))
    ));
}
