//! Fixed property schema of an ADAPTABLE record.
//!
//! The schema is an ordered table of 65 named slots. Slot order is the
//! serialization order of the header line, so the table must never be
//! reordered.

use std::collections::HashMap;
use std::sync::OnceLock;

use thiserror::Error;

/// Number of slots in the schema
pub const SLOT_COUNT: usize = 65;

/// Slot names, indexed by `slot_id - 1`
pub const SLOT_NAMES: [&str; SLOT_COUNT] = [
    "ID",
    "sequence",
    "name",
    "source",
    "Family",
    "gene",
    "stereo",
    "N_terminus",
    "C_terminus",
    "PTM",
    "cyclic",
    "target",
    "synthetic",
    "antimicrobial",
    "antibacterial",
    "antigram_pos",
    "antigram_neg",
    "antifungal",
    "antiyeast",
    "antiviral",
    "antiprotozoal",
    "antiparasitic",
    "antiplasmodial",
    "antitrypanosomic",
    "antileishmania",
    "insecticidal",
    "anticancer",
    "antitumor",
    "cell_line",
    "tissue",
    "cancer_type",
    "anticancer_activity",
    "anticancer_activity_test",
    "antiangiogenic",
    "toxic",
    "cytotoxic",
    "hemolytic",
    "hemolytic_activity",
    "hemolytic_activity_test",
    "RBC_source",
    "cell_cell",
    "hormone",
    "quorum_sensing",
    "immunomodulant",
    "antihypertensive",
    "drug_delivery",
    "cell_penetrating",
    "tumor_homing",
    "blood_brain",
    "antioxidant",
    "antiproliferative",
    "DSSP",
    "pdb",
    "experim_structure",
    "PMID",
    "taxonomy",
    "all_organisms",
    "activity_viral",
    "activity_viral_test",
    "solubility",
    "activity",
    "activity_test",
    "ribosomal",
    "experimental",
    "biofilm",
];

/// Slot ids used directly by the codec and the classifier
pub mod slots {
    pub const ID: usize = 1;
    pub const SEQUENCE: usize = 2;
    pub const NAME: usize = 3;
    pub const SOURCE: usize = 4;
    pub const GENE: usize = 6;
    pub const PDB: usize = 53;
    pub const TAXONOMY: usize = 56;
}

static IDS_BY_NAME: OnceLock<HashMap<&'static str, usize>> = OnceLock::new();

/// Lookup failure against the slot table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnknownSlot {
    #[error("No such property: {0}")]
    Name(String),

    #[error("No such property id: {0} (valid ids are 1..={SLOT_COUNT})")]
    Id(usize),
}

/// Number of slots in the schema
pub fn slot_count() -> usize {
    SLOT_COUNT
}

/// Name of a slot id (1-based)
pub fn name_of(slot_id: usize) -> Result<&'static str, UnknownSlot> {
    check_id(slot_id).map(|id| SLOT_NAMES[id - 1])
}

/// Slot id (1-based) of a slot name. Names are case-sensitive.
pub fn id_of(name: &str) -> Result<usize, UnknownSlot> {
    let ids = IDS_BY_NAME.get_or_init(|| {
        SLOT_NAMES
            .iter()
            .enumerate()
            .map(|(idx, name)| (*name, idx + 1))
            .collect()
    });

    ids.get(name)
        .copied()
        .ok_or_else(|| UnknownSlot::Name(name.to_string()))
}

/// Validate a slot id
pub fn check_id(slot_id: usize) -> Result<usize, UnknownSlot> {
    if (1..=SLOT_COUNT).contains(&slot_id) {
        Ok(slot_id)
    } else {
        Err(UnknownSlot::Id(slot_id))
    }
}
