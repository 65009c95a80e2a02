use crate::core::geometry::fit::{BACKBONE_FIT_ATOMS, fit_rotation};
use crate::core::geometry::orientation::{AnchorTriple, orientate};
use crate::core::grid::{GridSet, quantize};
use crate::core::models::ids::ResidueId;
use crate::core::models::structure::StructureModel;
use crate::engine::culling::cull_environment;
use crate::engine::error::EngineError;
use crate::engine::matcher::{match_grids, score_partner_cell};
use nalgebra::{Rotation3, Vector3};
use tracing::debug;

/// The rigid-body relation between the two residues' canonical frames:
/// rotation mapping partner-frame coordinates into the key frame, plus the
/// Calpha-to-Calpha displacement in the key frame. Recomputed fresh for
/// every pair; never cached across queries.
#[derive(Debug, Clone)]
pub struct PairGeometry {
    pub rotation: Rotation3<f64>,
    pub displacement: Vector3<f64>,
}

/// Computes the pair geometry from a structure already oriented into the key
/// residue's frame.
///
/// The fit superimposes the partner's N/CA/C onto the key's, after shifting
/// the partner set by the negated displacement so both are Calpha-centered.
/// Grid coordinates live in each residue's canonical frame, and frames
/// transform opposite to the points that define them, so the rotation handed
/// to the matcher is the fit's inverse: it carries partner-frame coordinates
/// into the key frame.
pub fn pair_geometry(
    structure: &StructureModel,
    key: ResidueId,
    partner: ResidueId,
) -> Result<PairGeometry, EngineError> {
    let key_ca = backbone_position(structure, key, "CA")?;
    let partner_ca = backbone_position(structure, partner, "CA")?;
    let displacement = partner_ca - key_ca;

    let mut key_points = Vec::with_capacity(BACKBONE_FIT_ATOMS.len());
    let mut partner_points = Vec::with_capacity(BACKBONE_FIT_ATOMS.len());
    let mut weights = Vec::with_capacity(BACKBONE_FIT_ATOMS.len());
    for (name, weight) in BACKBONE_FIT_ATOMS {
        key_points.push(backbone_position(structure, key, name)?.coords);
        partner_points.push(backbone_position(structure, partner, name)?.coords - displacement);
        weights.push(weight);
    }

    let backbone_fit = fit_rotation(&key_points, &partner_points, &weights)?;
    Ok(PairGeometry {
        rotation: backbone_fit.inverse(),
        displacement,
    })
}

fn backbone_position(
    structure: &StructureModel,
    residue_id: ResidueId,
    atom_name: &'static str,
) -> Result<nalgebra::Point3<f64>, EngineError> {
    structure.atom_position(residue_id, atom_name).ok_or_else(|| {
        EngineError::BackboneAtomMissing {
            atom_name,
            residue_number: structure
                .residue(residue_id)
                .map(|r| r.number)
                .unwrap_or_default(),
        }
    })
}

/// Tests whether the hydrogen bond between `key` and `partner` survives with
/// the loaded grid statistics, returning the best pseudo-energy.
///
/// The grids must hold the key type's `donate`/`accept` distributions and
/// the (possibly substituted) partner type's `partnertodonate`/
/// `partnertoaccept` distributions. The structure is re-oriented twice,
/// once per residue frame, and both grid halves are sterically culled in
/// their own frame before matching. The donor-side pass (key donors against
/// the partner's preferred donor sites) runs first; the acceptor-side pass
/// runs only when it finds nothing.
///
/// `Ok(None)` means no hydrogen bond is maintained. The structure is left in
/// the key residue's frame on success.
pub fn analyze_pair(
    structure: &mut StructureModel,
    key: ResidueId,
    partner: ResidueId,
    grids: &mut GridSet,
    cutoff: f64,
) -> Result<Option<f64>, EngineError> {
    let geometry = prepare_pair(structure, key, partner, grids)?;

    if let Some(energy) = match_grids(
        &grids.donate,
        &grids.partner_to_accept,
        &geometry.rotation,
        &geometry.displacement,
        cutoff,
    ) {
        debug!(energy, "donor-side pass matched");
        return Ok(Some(energy));
    }

    let energy = match_grids(
        &grids.accept,
        &grids.partner_to_donate,
        &geometry.rotation,
        &geometry.displacement,
        cutoff,
    );
    if let Some(energy) = energy {
        debug!(energy, "acceptor-side pass matched");
    }
    Ok(energy)
}

/// Scores the actually-observed hydrogen bond donated by the key residue's
/// named atom, as a calibration reference for substitution scores.
///
/// The named atom (substring match, the way the HBplus output names arrive)
/// is located in the key residue but quantized in the partner's frame: its
/// cell must be one the partner type likes donors in, and is then mapped
/// into the key frame and scored against the key's donor distribution.
pub fn reference_energy(
    structure: &mut StructureModel,
    key: ResidueId,
    partner: ResidueId,
    donor_atom_name: &str,
    grids: &mut GridSet,
    cutoff: f64,
) -> Result<Option<f64>, EngineError> {
    let geometry = prepare_pair(structure, key, partner, grids)?;

    // Back into the partner frame: the donor atom's cell is looked up in the
    // partner's preference grid.
    orientate(structure, partner, AnchorTriple::NCaCb)?;

    let donor_position = structure
        .residue(key)
        .and_then(|residue| {
            residue.atoms().iter().find_map(|&atom_id| {
                let atom = structure.atom(atom_id)?;
                atom.name.contains(donor_atom_name).then_some(atom.position)
            })
        })
        .ok_or_else(|| EngineError::AtomNotFound {
            atom_name: donor_atom_name.to_string(),
            residue_number: structure
                .residue(key)
                .map(|r| r.number)
                .unwrap_or_default(),
        })?;

    let cell = match quantize(&donor_position) {
        Some(cell) => cell,
        None => return Ok(None),
    };
    let partner_count = grids.partner_to_accept.count(cell);
    if partner_count == 0 {
        return Ok(None);
    }
    let key_total = grids.donate.total();
    let partner_total = grids.partner_to_accept.total();
    if key_total == 0 {
        return Ok(None);
    }

    Ok(score_partner_cell(
        &grids.donate,
        key_total,
        cell,
        partner_count,
        partner_total,
        &geometry.rotation,
        &geometry.displacement,
        cutoff,
    ))
}

/// The shared preamble of both query paths: orient to the partner frame and
/// cull the partner grids, orient to the key frame and cull the key grids,
/// then derive the inter-frame geometry. Leaves the structure in the key
/// frame.
fn prepare_pair(
    structure: &mut StructureModel,
    key: ResidueId,
    partner: ResidueId,
    grids: &mut GridSet,
) -> Result<PairGeometry, EngineError> {
    orientate(structure, partner, AnchorTriple::NCaCb)?;
    cull_environment(
        &mut grids.partner_to_donate,
        &mut grids.partner_to_accept,
        structure,
        key,
        partner,
    );

    orientate(structure, key, AnchorTriple::NCaCb)?;
    cull_environment(&mut grids.donate, &mut grids.accept, structure, key, partner);

    pair_geometry(structure, key, partner)
}
