use super::ids::{AtomId, ChainId};
use std::collections::HashMap;

/// Identifies a residue the way a structure file does: chain, sequence
/// number, insertion code. Used to locate the key and partner residues of a
/// query within a loaded structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResidueSpec {
    pub chain_id: char,
    pub number: isize,
    pub insertion_code: char,
}

impl ResidueSpec {
    pub fn new(chain_id: char, number: isize, insertion_code: char) -> Self {
        Self {
            chain_id,
            number,
            insertion_code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residue {
    pub number: isize,       // Residue sequence number from source file
    pub insertion_code: char, // Insertion code, ' ' when absent
    pub name: String,        // Three-letter residue name (e.g., "ASN")
    pub chain_id: ChainId,   // ID of the parent chain
    pub(crate) atoms: Vec<AtomId>, // Atoms in file order
    atom_name_map: HashMap<String, AtomId>, // Map from atom name to its stable ID
}

impl Residue {
    pub(crate) fn new(number: isize, insertion_code: char, name: &str, chain_id: ChainId) -> Self {
        Self {
            number,
            insertion_code,
            name: name.to_string(),
            chain_id,
            atoms: Vec::new(),
            atom_name_map: HashMap::new(),
        }
    }

    pub(crate) fn add_atom(&mut self, atom_name: &str, atom_id: AtomId) {
        self.atoms.push(atom_id);
        self.atom_name_map
            .entry(atom_name.to_string())
            .or_insert(atom_id);
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    /// Looks up an atom by exact name. The first atom with the name wins when
    /// a file carries duplicates (alternate locations are not modeled).
    pub fn atom_id_by_name(&self, name: &str) -> Option<AtomId> {
        self.atom_name_map.get(name).copied()
    }
}
