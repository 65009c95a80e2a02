use super::ids::ResidueId;
use nalgebra::Point3;

/// Represents an atom in a protein structure.
///
/// This struct carries the only atom-level information the analysis ever
/// consults: the PDB atom name (used for anchor/donor/acceptor lookup by
/// exact or prefix match) and the 3-D position (read during geometry
/// computations and mutated in place by whole-structure orientation
/// transforms).
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The name of the atom (e.g., "CA", "N", "OD1").
    pub name: String,
    /// The ID of the parent residue this atom belongs to.
    pub residue_id: ResidueId,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    /// Creates a new `Atom` with the given name, parent residue, and position.
    pub fn new(name: &str, residue_id: ResidueId, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            residue_id,
            position,
        }
    }

    /// Returns true if the atom is a hydrogen (or deuterium) by name.
    pub fn is_hydrogen(&self) -> bool {
        matches!(
            self.name.trim().chars().next().map(|c| c.to_ascii_uppercase()),
            Some('H') | Some('D')
        )
    }
}
