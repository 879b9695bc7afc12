//! Populates entries from UniProt documents.
//!
//! Two tiers of extraction:
//! - **Trusted**: structured fields (accession, names, organism,
//!   cross-references) and curated keyword codes write into the entry.
//! - **Advisory**: free-text fragments in any other element only produce
//!   diagnostics for slots that stayed empty. They never touch the entry.

pub mod tables;

use indexmap::IndexMap;

use crate::domain::schema::{self, slots};
use crate::domain::{Diagnostic, DiagnosticCategory, Entry};

use super::document::{Document, Element};

pub use tables::ClassifierTables;

/// Entry id used in diagnostics before an accession is seen
pub const UNKNOWN_ENTRY_ID: &str = "UNKNOWN";

/// Outcome of populating one entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Primary accession, or "UNKNOWN"
    pub entry_id: String,

    /// Advisory diagnostics in emission order
    pub diagnostics: Vec<Diagnostic>,
}

impl Classification {
    /// Diagnostics of one category
    pub fn of_category(&self, category: DiagnosticCategory) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.category == category)
    }
}

/// Document classifier over a fixed set of dispatch tables
#[derive(Debug, Clone)]
pub struct Classifier {
    tables: ClassifierTables,
}

impl Classifier {
    pub fn new(tables: ClassifierTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &ClassifierTables {
        &self.tables
    }

    /// Populate `entry` from the direct children of `document`
    pub fn populate(&self, entry: &mut Entry, document: &Document) -> Classification {
        let mut walk = Walk {
            entry,
            entry_id: None,
            diagnostics: Vec::new(),
            hits: IndexMap::new(),
        };

        for elem in document.children() {
            match elem.tag.as_str() {
                "accession" => walk.accession(elem),
                "gene" => walk.gene(elem),
                "name" => walk.name(elem),
                "protein" => walk.protein(elem),
                "organism" => walk.organism(elem),
                "dbReference" => self.db_reference(&mut walk, elem),
                "keyword" => self.keyword(&mut walk, elem),
                _ => self.scan(&mut walk, elem),
            }
        }

        walk.report_hits()
    }

    fn db_reference(&self, walk: &mut Walk<'_>, elem: &Element) {
        let Some(db_type) = elem.attribute("type") else {
            walk.malformed(elem, "dbReference without a type attribute");
            return;
        };

        if self.tables.ignored_databases.contains(db_type) {
            return;
        }

        let target = if let Some(prefix) = self.tables.prefixed_databases.get(db_type) {
            Some((slots::ID, prefix.as_str()))
        } else {
            self.tables
                .slotted_databases
                .get(db_type)
                .map(|slot| (*slot, ""))
        };

        let Some((slot, prefix)) = target else {
            let message = format!(
                "Uniprot Entry '{}' -> the following Database ({}) is ignored but could be interesting: {}",
                walk.id(),
                db_type,
                elem.to_markup()
            );
            walk.diagnose(DiagnosticCategory::UnrecognizedDatabaseType, message);
            return;
        };

        match elem.attribute("id") {
            Some(id) => walk.store(slot, format!("{}{}", prefix, id)),
            None => walk.malformed(elem, "dbReference without an id attribute"),
        }
    }

    fn keyword(&self, walk: &mut Walk<'_>, elem: &Element) {
        let Some(code) = elem.attribute("id") else {
            walk.malformed(elem, "keyword without an id attribute");
            return;
        };

        for (slot, codes) in &self.tables.curated_keywords {
            if !codes.iter().any(|c| c == code) {
                continue;
            }
            if walk.entry.values(*slot).map_or(false, |v| v.is_empty()) {
                if let Ok(name) = schema::name_of(*slot) {
                    walk.store(*slot, name);
                }
            }
        }
    }

    fn scan(&self, walk: &mut Walk<'_>, elem: &Element) {
        let flat = elem.to_markup().to_lowercase();

        for (slot, fragments) in &self.tables.heuristic_keywords {
            if fragments.iter().any(|f| flat.contains(f.as_str())) {
                walk.hits.entry(flat.clone()).or_default().push(*slot);
            }
        }
    }
}

/// Mutable state of one `populate` call
struct Walk<'a> {
    entry: &'a mut Entry,
    entry_id: Option<String>,
    diagnostics: Vec<Diagnostic>,
    /// Flattened element text -> candidate slots, in discovery order
    hits: IndexMap<String, Vec<usize>>,
}

impl Walk<'_> {
    fn id(&self) -> &str {
        self.entry_id.as_deref().unwrap_or(UNKNOWN_ENTRY_ID)
    }

    fn diagnose(&mut self, category: DiagnosticCategory, message: String) {
        let diagnostic = Diagnostic::new(self.id(), category, message);
        self.diagnostics.push(diagnostic);
    }

    fn malformed(&mut self, elem: &Element, problem: &str) {
        let message = format!(
            "Uniprot Entry '{}' -> {}: {}",
            self.id(),
            problem,
            elem.to_markup()
        );
        self.diagnose(DiagnosticCategory::MalformedElement, message);
    }

    fn store(&mut self, slot: usize, value: impl AsRef<str>) {
        if let Err(e) = self.entry.push(slot, value.as_ref()) {
            let message = format!("Uniprot Entry '{}' -> value not stored: {}", self.id(), e);
            self.diagnose(DiagnosticCategory::RejectedValue, message);
        }
    }

    fn accession(&mut self, elem: &Element) {
        let Some(accession) = elem.text.as_deref() else {
            self.malformed(elem, "accession without text");
            return;
        };

        self.store(slots::ID, format!("uniprot{}", accession));
        if self.entry_id.is_none() {
            self.entry_id = Some(accession.to_string());
        }
    }

    fn gene(&mut self, elem: &Element) {
        match elem.child(0).and_then(|c| c.text.as_deref()) {
            Some(gene) => self.store(slots::GENE, gene),
            None => self.malformed(elem, "gene without a named child"),
        }
    }

    fn name(&mut self, elem: &Element) {
        match elem.text.as_deref() {
            Some(name) => self.store(slots::NAME, name),
            None => self.malformed(elem, "name without text"),
        }
    }

    fn protein(&mut self, elem: &Element) {
        let Some(names) = elem.child(0) else {
            self.malformed(elem, "protein without a name group");
            return;
        };

        for name in &names.children {
            match name.text.as_deref() {
                Some(text) => self.store(slots::NAME, text),
                None => self.malformed(name, "protein name without text"),
            }
        }
    }

    fn organism(&mut self, elem: &Element) {
        match elem.child(0).and_then(|c| c.text.as_deref()) {
            Some(source) => self.store(slots::SOURCE, source),
            None => self.malformed(elem, "organism without a name"),
        }

        match elem.child(1).and_then(|c| c.attribute("id")) {
            Some(taxon) => self.store(slots::TAXONOMY, format!("NCBI:{}", taxon)),
            None => self.malformed(elem, "organism without a taxonomy reference"),
        }
    }

    /// Turn heuristic hits on still-empty slots into diagnostics
    fn report_hits(mut self) -> Classification {
        let hits = std::mem::take(&mut self.hits);
        let mut any_reported = false;

        for (flat, candidates) in &hits {
            for slot in candidates {
                if !self.entry.values(*slot).map_or(false, |v| v.is_empty()) {
                    continue;
                }

                let message = format!(
                    "Entry {} -> Potential {} ignored but contained in the following element: {}",
                    self.id(),
                    property_label(*slot),
                    flat
                );
                self.diagnose(DiagnosticCategory::UnmatchedHeuristicHit, message);
                any_reported = true;
            }
        }

        if any_reported {
            let message = format!(
                "Entry {} content:\n{}",
                self.id(),
                self.entry.human_readable()
            );
            self.diagnose(DiagnosticCategory::EntryContent, message);
        }

        Classification {
            entry_id: self.id().to_string(),
            diagnostics: self.diagnostics,
        }
    }
}

/// Human label for a property in heuristic diagnostics
fn property_label(slot: usize) -> String {
    match schema::name_of(slot) {
        Ok("pdb") | Ok("DSSP") => "structural information".to_string(),
        Ok("PMID") => "PMID".to_string(),
        Ok(name) => format!("information about {} properties", name),
        Err(_) => format!("information about slot {}", slot),
    }
}
