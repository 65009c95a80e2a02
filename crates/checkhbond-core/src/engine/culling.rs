use crate::core::grid::{GRID_SPACING, GridIndex, VoxelGrid, quantize};
use crate::core::models::ids::ResidueId;
use crate::core::models::structure::StructureModel;

/// Grid cells closer than this to an environment atom are considered
/// sterically blocked (A).
const CLASH_RADIUS: f64 = 2.5;

/// Zeroes every cell of both grids that clashes with the structural
/// environment of a residue pair.
///
/// Statistical preferences accumulated over a corpus say nothing about this
/// particular structure's packing; a cell buried inside a neighboring
/// residue cannot host a hydrogen-bonding atom, whatever the statistics say.
/// Atoms belonging to either residue of the pair are exempt: their own
/// atoms necessarily sit inside the distributions being matched.
///
/// The structure must already be oriented into the frame the grids were
/// accumulated in; culling runs once per frame, right after each
/// orientation.
pub fn cull_environment(
    first: &mut VoxelGrid,
    second: &mut VoxelGrid,
    structure: &StructureModel,
    key: ResidueId,
    partner: ResidueId,
) {
    let radius_cells = (CLASH_RADIUS / GRID_SPACING).ceil() as i64;
    let radius_squared_cells =
        (CLASH_RADIUS / GRID_SPACING) * (CLASH_RADIUS / GRID_SPACING);

    for (_, atom) in structure.atoms_iter() {
        if atom.residue_id == key || atom.residue_id == partner {
            continue;
        }
        let center = match quantize(&atom.position) {
            Some(index) => index,
            None => continue,
        };

        for dx in -radius_cells..=radius_cells {
            for dy in -radius_cells..=radius_cells {
                for dz in -radius_cells..=radius_cells {
                    if ((dx * dx + dy * dy + dz * dz) as f64) > radius_squared_cells {
                        continue;
                    }
                    if let Some(cell) = GridIndex::from_signed(
                        center.x as i64 + dx,
                        center.y as i64 + dy,
                        center.z as i64 + dz,
                    ) {
                        first.clear_cell(cell);
                        second.clear_cell(cell);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use nalgebra::Point3;

    fn structure_with_three_residues() -> (StructureModel, ResidueId, ResidueId, ResidueId) {
        let mut structure = StructureModel::new();
        let chain = structure.add_chain('A');
        let key = structure.add_residue(chain, 1, ' ', "SER").unwrap();
        let partner = structure.add_residue(chain, 2, ' ', "ASN").unwrap();
        let bystander = structure.add_residue(chain, 3, ' ', "LEU").unwrap();

        structure
            .add_atom_to_residue(key, Atom::new("OG", key, Point3::new(6.0, 0.0, 0.0)))
            .unwrap();
        structure
            .add_atom_to_residue(partner, Atom::new("ND2", partner, Point3::new(-6.0, 0.0, 0.0)))
            .unwrap();
        structure
            .add_atom_to_residue(bystander, Atom::new("CD1", bystander, Point3::origin()))
            .unwrap();
        (structure, key, partner, bystander)
    }

    #[test]
    fn environment_atoms_blank_out_nearby_cells() {
        let (structure, key, partner, _) = structure_with_three_residues();
        let mut donate = VoxelGrid::new();
        let mut accept = VoxelGrid::new();

        let near = quantize(&Point3::new(0.3, 0.3, 0.3)).unwrap();
        let far = quantize(&Point3::new(9.0, 9.0, 9.0)).unwrap();
        donate.increment(near);
        donate.increment(far);
        accept.increment(near);

        cull_environment(&mut donate, &mut accept, &structure, key, partner);

        assert_eq!(donate.count(near), 0, "cell beside the bystander atom");
        assert_eq!(accept.count(near), 0);
        assert_eq!(donate.count(far), 1, "distant cell must survive");
    }

    #[test]
    fn pair_atoms_do_not_cull() {
        let (structure, key, partner, _) = structure_with_three_residues();
        let mut donate = VoxelGrid::new();
        let mut accept = VoxelGrid::new();

        // Cells right on top of the key and partner atoms.
        let at_key = quantize(&Point3::new(6.0, 0.0, 0.0)).unwrap();
        let at_partner = quantize(&Point3::new(-6.0, 0.0, 0.0)).unwrap();
        donate.increment(at_key);
        accept.increment(at_partner);

        cull_environment(&mut donate, &mut accept, &structure, key, partner);

        assert_eq!(donate.count(at_key), 1);
        assert_eq!(accept.count(at_partner), 1);
    }
}
