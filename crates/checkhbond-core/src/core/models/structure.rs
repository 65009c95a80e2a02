use super::atom::Atom;
use super::chain::Chain;
use super::ids::{AtomId, ChainId, ResidueId};
use super::residue::{Residue, ResidueSpec};
use nalgebra::{Rotation3, Vector3};
use slotmap::SlotMap;
use std::collections::HashMap;

/// Represents a complete protein structure with atoms, residues, and chains.
///
/// This struct is the concrete form of the "structure provider": ordered
/// residue traversal, atom lookup by name within a residue, and the two
/// whole-structure rigid transforms (translation, rotation) that the frame
/// orientation procedure applies. Residue order follows the source file, so
/// "the previous residue" is well defined for peptide-bond checks.
#[derive(Debug, Clone, Default)]
pub struct StructureModel {
    /// Primary storage for atoms using a slot map for efficient ID management.
    atoms: SlotMap<AtomId, Atom>,
    /// Primary storage for residues using a slot map for efficient ID management.
    residues: SlotMap<ResidueId, Residue>,
    /// Primary storage for chains using a slot map for efficient ID management.
    chains: SlotMap<ChainId, Chain>,
    /// Chains in file order.
    chain_order: Vec<ChainId>,
    /// Lookup map for finding chains by their single-character identifier.
    chain_id_map: HashMap<char, ChainId>,
    /// Lookup map for finding residues by chain, number, and insertion code.
    residue_spec_map: HashMap<ResidueSpec, ResidueId>,
}

impl StructureModel {
    /// Creates a new, empty structure.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves an immutable reference to an atom by its ID.
    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    /// Retrieves a mutable reference to an atom by its ID.
    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    /// Returns an iterator over all atoms in the system.
    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter()
    }

    /// Retrieves an immutable reference to a residue by its ID.
    pub fn residue(&self, id: ResidueId) -> Option<&Residue> {
        self.residues.get(id)
    }

    /// Retrieves an immutable reference to a chain by its ID.
    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(id)
    }

    /// Returns all residue IDs in file order (chains in file order, residues
    /// in file order within each chain).
    pub fn residues_in_order(&self) -> Vec<ResidueId> {
        self.chain_order
            .iter()
            .flat_map(|&chain_id| self.chains[chain_id].residues.iter().copied())
            .collect()
    }

    /// Finds a residue by its file identity (chain, number, insertion code).
    pub fn find_residue(&self, spec: &ResidueSpec) -> Option<ResidueId> {
        self.residue_spec_map.get(spec).copied()
    }

    /// Returns the residue preceding `id` within the same chain, if any.
    pub fn previous_residue(&self, id: ResidueId) -> Option<ResidueId> {
        let chain_id = self.residues.get(id)?.chain_id;
        let chain = self.chains.get(chain_id)?;
        let index = chain.residues.iter().position(|&r| r == id)?;
        if index == 0 {
            None
        } else {
            Some(chain.residues[index - 1])
        }
    }

    /// Adds a new chain or returns the existing one with the same identifier.
    pub fn add_chain(&mut self, id: char) -> ChainId {
        if let Some(&existing) = self.chain_id_map.get(&id) {
            return existing;
        }
        let chain_id = self.chains.insert(Chain::new(id));
        self.chain_order.push(chain_id);
        self.chain_id_map.insert(id, chain_id);
        chain_id
    }

    /// Adds a new residue to a chain or returns the existing one with the
    /// same identity.
    pub fn add_residue(
        &mut self,
        chain_id: ChainId,
        number: isize,
        insertion_code: char,
        name: &str,
    ) -> Option<ResidueId> {
        let chain_char = self.chains.get(chain_id)?.id;
        let spec = ResidueSpec::new(chain_char, number, insertion_code);

        if let Some(&existing) = self.residue_spec_map.get(&spec) {
            return Some(existing);
        }

        let residue = Residue::new(number, insertion_code, name, chain_id);
        let residue_id = self.residues.insert(residue);
        self.chains[chain_id].residues.push(residue_id);
        self.residue_spec_map.insert(spec, residue_id);
        Some(residue_id)
    }

    /// Adds an atom to a residue, registering it under its name.
    pub fn add_atom_to_residue(&mut self, residue_id: ResidueId, atom: Atom) -> Option<AtomId> {
        if !self.residues.contains_key(residue_id) {
            return None;
        }
        let name = atom.name.clone();
        let atom_id = self.atoms.insert(atom);
        self.residues[residue_id].add_atom(&name, atom_id);
        Some(atom_id)
    }

    /// Returns the position of the named atom within a residue, if present.
    pub fn atom_position(
        &self,
        residue_id: ResidueId,
        atom_name: &str,
    ) -> Option<nalgebra::Point3<f64>> {
        let atom_id = self.residues.get(residue_id)?.atom_id_by_name(atom_name)?;
        Some(self.atoms[atom_id].position)
    }

    /// Translates every atom in the structure by `offset`.
    pub fn translate_all(&mut self, offset: Vector3<f64>) {
        for atom in self.atoms.values_mut() {
            atom.position += offset;
        }
    }

    /// Rotates every atom in the structure about the origin.
    pub fn rotate_all(&mut self, rotation: &Rotation3<f64>) {
        for atom in self.atoms.values_mut() {
            atom.position = rotation * atom.position;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    pub(crate) fn build_two_residue_chain() -> (StructureModel, ResidueId, ResidueId) {
        let mut structure = StructureModel::new();
        let chain = structure.add_chain('A');
        let gly = structure.add_residue(chain, 1, ' ', "GLY").unwrap();
        structure
            .add_atom_to_residue(gly, Atom::new("N", gly, Point3::new(0.0, 1.4, 0.0)))
            .unwrap();
        structure
            .add_atom_to_residue(gly, Atom::new("CA", gly, Point3::new(0.0, 0.0, 0.0)))
            .unwrap();
        let ala = structure.add_residue(chain, 2, ' ', "ALA").unwrap();
        structure
            .add_atom_to_residue(ala, Atom::new("CA", ala, Point3::new(3.8, 0.0, 0.0)))
            .unwrap();
        (structure, gly, ala)
    }

    #[test]
    fn creation_and_lookup() {
        let (structure, gly, ala) = build_two_residue_chain();

        assert_eq!(structure.atoms_iter().count(), 3);
        assert_eq!(structure.residues_in_order(), vec![gly, ala]);
        assert_eq!(
            structure.find_residue(&ResidueSpec::new('A', 1, ' ')),
            Some(gly)
        );
        assert!(structure.find_residue(&ResidueSpec::new('B', 1, ' ')).is_none());
        assert_eq!(
            structure.atom_position(gly, "CA"),
            Some(Point3::new(0.0, 0.0, 0.0))
        );
        assert!(structure.atom_position(gly, "CB").is_none());
    }

    #[test]
    fn add_chain_and_residue_are_idempotent() {
        let mut structure = StructureModel::new();
        let chain1 = structure.add_chain('A');
        let chain2 = structure.add_chain('A');
        assert_eq!(chain1, chain2);

        let res1 = structure.add_residue(chain1, 1, ' ', "GLY").unwrap();
        let res2 = structure.add_residue(chain1, 1, ' ', "GLY").unwrap();
        assert_eq!(res1, res2);
        assert_eq!(structure.residues_in_order().len(), 1);
    }

    #[test]
    fn previous_residue_respects_chain_boundaries() {
        let (mut structure, gly, ala) = build_two_residue_chain();
        let chain_b = structure.add_chain('B');
        let ser = structure.add_residue(chain_b, 1, ' ', "SER").unwrap();

        assert_eq!(structure.previous_residue(gly), None);
        assert_eq!(structure.previous_residue(ala), Some(gly));
        assert_eq!(structure.previous_residue(ser), None);
    }

    #[test]
    fn translate_moves_every_atom() {
        let (mut structure, gly, ala) = build_two_residue_chain();
        structure.translate_all(Vector3::new(1.0, -1.0, 2.0));
        assert_eq!(
            structure.atom_position(gly, "CA"),
            Some(Point3::new(1.0, -1.0, 2.0))
        );
        assert_eq!(
            structure.atom_position(ala, "CA"),
            Some(Point3::new(4.8, -1.0, 2.0))
        );
    }

    #[test]
    fn rotate_spins_atoms_about_origin() {
        let (mut structure, gly, _) = build_two_residue_chain();
        let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2);
        structure.rotate_all(&rotation);

        let n = structure.atom_position(gly, "N").unwrap();
        assert!((n.x - -1.4).abs() < 1e-12);
        assert!(n.y.abs() < 1e-12);
    }
}
