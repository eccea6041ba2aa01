use lazy_static::lazy_static;
use std::collections::HashSet;

pub mod analysis;
pub mod ancestral_state;
pub mod cache;
pub mod dependency_graph;
pub mod error;
pub mod find_changes;
pub mod layout_graph;
pub mod metadata;
pub mod report;
pub mod sequence_logo;
pub mod serialize_dag;
pub mod serialize_plan;

/// The 20 canonical amino acid letters.
pub const AMINO_ACIDS: &str = "ARNDCQEGHILKMFPSTWYV";

/// Alignment gap character.
pub const GAP: char = '-';

/// Sentinel for conflicting inheritance from equally-supported lineages.
pub const AMBIGUOUS: char = 'X';

lazy_static! {
    // Letters allowed in an alignment column: the canonical twenty plus gap and ambiguity.
    pub static ref ALIGNMENT_ALPHABET: HashSet<char> = {
        let mut set: HashSet<char> = AMINO_ACIDS.chars().collect();
        set.insert(GAP);
        set.insert(AMBIGUOUS);
        set
    };
}
