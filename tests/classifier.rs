//! Classifier Integration Tests
//!
//! Tests for trusted dispatch (structured fields, cross-references,
//! curated keywords) and advisory heuristic diagnostics.

use adaptable::core::{Classifier, ClassifierTables, Document, Element};
use adaptable::domain::{slots, DiagnosticCategory, Entry};

const ENTRY_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<uniprot xmlns="http://uniprot.org/uniprot">
<entry dataset="Swiss-Prot" created="1986-07-21" version="120">
  <accession>P12345</accession>
  <accession>Q99999</accession>
  <name>TEST_HUMAN</name>
  <protein>
    <recommendedName>
      <fullName>Test protein</fullName>
      <shortName>TP</shortName>
    </recommendedName>
  </protein>
  <gene>
    <name type="primary">TST1</name>
  </gene>
  <organism>
    <name type="scientific">Homo sapiens</name>
    <dbReference type="NCBI Taxonomy" id="9606"/>
  </organism>
  <comment type="function">
    <text>Has antibacterial activity against Gram-negative bacteria.</text>
  </comment>
  <dbReference type="Pfam" id="PF00001"/>
  <dbReference type="PDB" id="1ABC"/>
  <dbReference type="EMBL" id="X00001"/>
  <dbReference type="FooBar" id="F1"/>
  <keyword id="KW-0929">Antimicrobial</keyword>
  <sequence length="6" mass="700">
    ACDE
    FG
  </sequence>
</entry>
</uniprot>"#;

fn classifier() -> Classifier {
    Classifier::new(ClassifierTables::uniprot().unwrap())
}

fn document(children: Vec<Element>) -> Document {
    let mut root = Element::new("entry");
    root.children = children;
    Document::from_element(root)
}

#[test]
fn test_prefixed_database_goes_to_id() {
    let mut entry = Entry::new("AA");
    let doc = document(vec![Element::new("dbReference")
        .with_attribute("type", "Pfam")
        .with_attribute("id", "PF00001")]);

    let result = classifier().populate(&mut entry, &doc);

    assert_eq!(entry.values(slots::ID).unwrap(), ["pfamPF00001"]);
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_curated_keyword_sets_every_matching_property_once() {
    let mut entry = Entry::new("AA");
    let doc = document(vec![
        Element::new("keyword").with_attribute("id", "KW-0081"),
        Element::new("keyword").with_attribute("id", "KW-0081"),
        Element::new("keyword").with_attribute("id", "KW-0929"),
    ]);

    classifier().populate(&mut entry, &doc);

    assert_eq!(
        entry.values_by_name("antimicrobial").unwrap(),
        ["antimicrobial"]
    );
    assert_eq!(
        entry.values_by_name("antibacterial").unwrap(),
        ["antibacterial"]
    );
    assert!(entry.values_by_name("antifungal").unwrap().is_empty());
}

#[test]
fn test_unknown_database_is_reported_without_mutation() {
    let mut entry = Entry::new("AA");
    let before = entry.clone();
    let doc = document(vec![Element::new("dbReference")
        .with_attribute("type", "FooBar")
        .with_attribute("id", "F1")]);

    let result = classifier().populate(&mut entry, &doc);

    assert_eq!(entry, before);
    assert_eq!(result.diagnostics.len(), 1);

    let diagnostic = &result.diagnostics[0];
    assert_eq!(diagnostic.category, DiagnosticCategory::UnrecognizedDatabaseType);
    assert!(diagnostic.message.contains("(FooBar)"));
    assert!(diagnostic.message.contains(r#"id="F1""#));
}

#[test]
fn test_ignored_database_is_silent() {
    let mut entry = Entry::new("AA");
    let before = entry.clone();
    let doc = document(vec![Element::new("dbReference")
        .with_attribute("type", "EMBL")
        .with_attribute("id", "X1")]);

    let result = classifier().populate(&mut entry, &doc);

    assert_eq!(entry, before);
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_configured_ignore_list_extends_builtin() {
    let tables = ClassifierTables::uniprot()
        .unwrap()
        .with_ignored_databases(["FooBar"]);
    let mut entry = Entry::new("AA");
    let doc = document(vec![Element::new("dbReference").with_attribute("type", "FooBar")]);

    let result = Classifier::new(tables).populate(&mut entry, &doc);

    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_heuristic_hit_only_produces_diagnostics() {
    let mut entry = Entry::new("AA");
    let before = entry.clone();
    let doc = document(vec![Element::new("comment")
        .with_attribute("type", "function")
        .with_child(Element::new("text").with_text("Toxic to insects"))]);

    let result = classifier().populate(&mut entry, &doc);

    assert_eq!(entry, before);

    let hits: Vec<_> = result
        .of_category(DiagnosticCategory::UnmatchedHeuristicHit)
        .collect();
    assert_eq!(hits.len(), 1);
    assert!(hits[0].message.contains("information about toxic properties"));
    assert!(hits[0].message.contains("toxic to insects"));

    // One content dump follows the hits
    assert_eq!(
        result.of_category(DiagnosticCategory::EntryContent).count(),
        1
    );
}

#[test]
fn test_heuristic_hit_on_set_slot_is_suppressed() {
    let mut entry = Entry::new("AA");
    let doc = document(vec![
        Element::new("comment").with_child(Element::new("text").with_text("antimicrobial")),
        Element::new("keyword").with_attribute("id", "KW-0929"),
    ]);

    let result = classifier().populate(&mut entry, &doc);

    // "microbial" is found first but the keyword later sets the slot
    assert_eq!(
        result
            .of_category(DiagnosticCategory::UnmatchedHeuristicHit)
            .count(),
        0
    );
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_full_entry_document() {
    let doc = Document::parse(ENTRY_XML).unwrap();
    let sequence = doc.sequence().unwrap();
    assert_eq!(sequence, "ACDEFG");

    let mut entry = Entry::new(sequence);
    let result = classifier().populate(&mut entry, &doc);

    assert_eq!(result.entry_id, "P12345");
    assert_eq!(
        entry.values(slots::ID).unwrap(),
        ["uniprotP12345", "uniprotQ99999", "pfamPF00001"]
    );
    assert_eq!(
        entry.values(slots::NAME).unwrap(),
        ["TEST_HUMAN", "Test protein", "TP"]
    );
    assert_eq!(entry.values(slots::GENE).unwrap(), ["TST1"]);
    assert_eq!(entry.values(slots::SOURCE).unwrap(), ["Homo sapiens"]);
    assert_eq!(entry.values(slots::TAXONOMY).unwrap(), ["NCBI:9606"]);
    assert_eq!(entry.values(slots::PDB).unwrap(), ["1ABC"]);
    assert_eq!(
        entry.values_by_name("antimicrobial").unwrap(),
        ["antimicrobial"]
    );

    assert_eq!(
        result
            .of_category(DiagnosticCategory::UnrecognizedDatabaseType)
            .count(),
        1
    );

    // The function comment hints at bacterial and gram-negative activity
    let hints: Vec<_> = result
        .of_category(DiagnosticCategory::UnmatchedHeuristicHit)
        .map(|d| d.message.as_str())
        .collect();
    assert!(hints.iter().any(|m| m.contains("antibacterial properties")));
    assert!(hints.iter().any(|m| m.contains("antigram_neg properties")));
    assert!(result.diagnostics.iter().all(|d| d.entry_id == "P12345"));
}

#[test]
fn test_heuristic_scan_sees_text_after_inline_elements() {
    let doc = Document::parse(
        r#"<entry>
  <comment type="function">
    <text>Active against <i>S. aureus</i> and shows hemolytic activity</text>
  </comment>
  <sequence>GIGKFLHSAKKFGKAFVGEIMNS</sequence>
</entry>"#,
    )
    .unwrap();
    let mut entry = Entry::new(doc.sequence().unwrap());
    let before = entry.clone();

    let result = classifier().populate(&mut entry, &doc);

    assert_eq!(entry, before);
    let hits: Vec<_> = result
        .of_category(DiagnosticCategory::UnmatchedHeuristicHit)
        .collect();
    assert_eq!(hits.len(), 1);
    assert!(hits[0].message.contains("information about hemolytic properties"));
    assert!(hits[0].message.contains("and shows hemolytic activity"));
}
