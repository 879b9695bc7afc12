//! Dispatch tables for UniProt entries.
//!
//! See <https://www.uniprot.org/docs/keywlist> for the keyword codes.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::domain::schema::{self, slots, UnknownSlot};

/// Cross-reference databases known to carry nothing worth importing
pub const IGNORED_DATABASES: &[&str] = &[
    "GO",                // Gene Ontology
    "InterPro",
    "EC",                // ExPASy/Brenda
    "EMBL",              // European Nucleotide Archive
    "EnsemblBacteria",
    "OrthoDB",
    "Proteomes",
    "RefSeq",            // Reference genome sequences
    "PRINTS",            // Protein motif fingerprints
    "PATRIC",            // Pathosystems
    "BioCyc",            // Pathway/genome
    "GeneID",
    "Gene3D",
    "PANTHER",
    "SMART",
    "UniPathway",
    "KEGG",
    "HOGENOM",
    "OMA",
    "UniGene",
    "MGI",               // Mouse genome
    "UCSC",              // Genome browser
    "Bgee",              // Gene expression
    "IntAct",            // Protein-protein interaction
    "PeptideAtlas",
    "PRIDE",
    "FlyBase",
    "eggNOG",
    "PDBsum",            // Redundant with PDB
    "PIR",
    "STRING",
    "PaxDb",             // Protein abundance
    "HOVERGEN",
    "TCDB",              // Transport proteins
    "MINT",
    "EvolutionaryTrace",
    "ArachnoServer",     // Spider toxins
    "CAZy",              // Carbohydrate-active enzymes
    "Ensembl",
    "PMAP-CutDB",        // Proteolysis
    "MaizeGDB",
    "iPTMnet",
    "KO",                // Orthologs
    "Genevisible",
    "ExpressionAtlas",
    "SABIO-RK",          // Biochemical kinetics
    "Allergome",
    "PRO",               // Protein ontology
    "DisProt",
    "InParanoid",
    "Araport",
    "ConoServer",        // Cone snail toxins
];

/// Databases whose id is stored in the `ID` slot behind a short prefix
pub const PREFIXED_DATABASES: &[(&str, &str)] = &[
    ("SUPFAM", "supfam"),
    ("Pfam", "pfam"),
    ("ProteinModelPortal", "pmp"),
    ("TIGRFAMs", "tigrfams"),
    ("HAMAP", "hamap"),
    ("PROSITE", "prosite"),
    ("PIRSF", "pirsf"),
    ("CDD", "cdd"),
    ("ProDom", "prodom"),
    ("SMR", "smr"),
];

/// Databases whose bare id is stored in a dedicated slot
pub const SLOTTED_DATABASES: &[(&str, usize)] = &[("PDB", slots::PDB)];

/// Curated keyword codes that set a property
pub const CURATED_KEYWORDS: &[(&str, &[&str])] = &[
    ("antimicrobial", &["KW-0929", "KW-0081", "KW-0044"]),
    ("antibacterial", &["KW-0081"]),
    ("antifungal", &["KW-0295"]),
    ("antiviral", &["KW-0930"]),
    ("antitumor", &["KW-0043"]),
];

/// Free-text fragments hinting at a property (matched case-insensitively)
pub const HEURISTIC_KEYWORDS: &[(&str, &[&str])] = &[
    ("antimicrobial", &["microbial"]),
    ("antigram_pos", &["gram-positive"]),
    ("antigram_neg", &["gram-negative"]),
    ("antibacterial", &["bacterial"]),
    ("antiviral", &["viral"]),
    ("anticancer", &["cancer", "tumor", "anticancer", "antitumor"]),
    ("antiprotozoal", &["protozoa"]),
    ("antiplasmodial", &["plasmodi"]),
    ("antiparasitic", &["parasit"]),
    ("antitrypanosomic", &["trypanosom"]),
    ("antileishmania", &["leishman"]),
    ("insecticidal", &["insecticid"]),
    ("toxic", &["toxic"]),
    ("cytotoxic", &["cytotoxic"]),
    ("antiangiogenic", &["antiangiogen"]),
    ("hemolytic", &["hemolytic"]),
    ("pdb", &["pdb"]),
    ("PMID", &["PMID"]),
    ("DSSP", &["DSSP"]),
];

/// Immutable dispatch tables consumed by the classifier
#[derive(Debug, Clone)]
pub struct ClassifierTables {
    /// Database types skipped without a diagnostic
    pub ignored_databases: HashSet<String>,

    /// Database type -> prefix for the `ID` slot
    pub prefixed_databases: HashMap<String, String>,

    /// Database type -> slot receiving the bare id
    pub slotted_databases: HashMap<String, usize>,

    /// Slot -> keyword codes that set it (slot order matters)
    pub curated_keywords: IndexMap<usize, Vec<String>>,

    /// Slot -> lower-cased text fragments hinting at it
    pub heuristic_keywords: IndexMap<usize, Vec<String>>,
}

impl ClassifierTables {
    /// Tables for UniProt XML entries
    pub fn uniprot() -> Result<Self, UnknownSlot> {
        let mut slotted_databases = HashMap::new();
        for (db, slot) in SLOTTED_DATABASES {
            slotted_databases.insert(db.to_string(), schema::check_id(*slot)?);
        }

        Ok(Self {
            ignored_databases: IGNORED_DATABASES.iter().map(|db| db.to_string()).collect(),
            prefixed_databases: PREFIXED_DATABASES
                .iter()
                .map(|(db, prefix)| (db.to_string(), prefix.to_string()))
                .collect(),
            slotted_databases,
            curated_keywords: resolve(CURATED_KEYWORDS, |code| code.to_string())?,
            heuristic_keywords: resolve(HEURISTIC_KEYWORDS, str::to_lowercase)?,
        })
    }

    /// Add database types to the ignore list
    pub fn with_ignored_databases<I, S>(mut self, databases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_databases
            .extend(databases.into_iter().map(Into::into));
        self
    }
}

fn resolve(
    table: &[(&str, &[&str])],
    normalize: impl Fn(&str) -> String,
) -> Result<IndexMap<usize, Vec<String>>, UnknownSlot> {
    let mut resolved = IndexMap::new();
    for (name, words) in table {
        let slot = schema::id_of(name)?;
        resolved.insert(slot, words.iter().map(|w| normalize(w)).collect());
    }
    Ok(resolved)
}
