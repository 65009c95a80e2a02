use super::primitives::{Axis, axis_rotation, true_angle};
use crate::core::models::ids::ResidueId;
use crate::core::models::structure::StructureModel;
use nalgebra::Point3;
use thiserror::Error;

/// Maximum C-to-N distance for two residues to count as peptide-bonded (1.5 A).
const PEPTIDE_BOND_DIST_SQ: f64 = 2.25;

/// Selects the three anchor atoms that define a residue's canonical frame.
///
/// Each variant names the anchor that ends up at the origin, the anchor
/// rotated onto the +X axis, and the anchor rotated into the XY plane. The
/// historical orientation routines (one per donor/acceptor chemistry) are
/// unified here: the rotation pipeline is identical, only the triple differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorTriple {
    /// Backbone frame: Calpha at origin, N on +X, C in the XY plane.
    NCaC,
    /// Backbone-donor frame: N at origin, the preceding residue's C on +X,
    /// Calpha in the XY plane. Requires the two residues to be peptide-bonded.
    CNCa,
    /// Backbone-acceptor frame: C at origin, O on +X, Calpha in the XY plane.
    CaCO,
    /// Side-chain frame: Calpha at origin, N on +X, Cbeta in the XY plane.
    NCaCb,
}

impl AnchorTriple {
    pub fn origin_atom(&self) -> &'static str {
        match self {
            AnchorTriple::NCaC | AnchorTriple::NCaCb => "CA",
            AnchorTriple::CNCa => "N",
            AnchorTriple::CaCO => "C",
        }
    }

    pub fn axis_atom(&self) -> &'static str {
        match self {
            AnchorTriple::NCaC | AnchorTriple::NCaCb => "N",
            AnchorTriple::CNCa => "C",
            AnchorTriple::CaCO => "O",
        }
    }

    pub fn plane_atom(&self) -> &'static str {
        match self {
            AnchorTriple::NCaC => "C",
            AnchorTriple::NCaCb => "CB",
            AnchorTriple::CNCa | AnchorTriple::CaCO => "CA",
        }
    }

    /// Whether the axis anchor is taken from the preceding residue.
    pub fn axis_from_previous(&self) -> bool {
        matches!(self, AnchorTriple::CNCa)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum OrientationError {
    #[error("anchor atom '{atom_name}' not found in residue {residue_number}")]
    MissingAnchorAtom {
        atom_name: &'static str,
        residue_number: isize,
    },

    #[error("residue {residue_number} has no peptide-bonded preceding residue")]
    NoPrecedingResidue { residue_number: isize },
}

/// Re-orients the ENTIRE structure into the canonical frame of one residue.
///
/// Applies, in order: a translation putting the origin anchor at (0,0,0); a
/// rotation about Z by `-atan2(y, x)` of the axis anchor (into the XZ plane);
/// a rotation about Y by `atan2(z, x)` (onto +X); a rotation about X by
/// `-atan2(z, y)` of the plane anchor (into the XY plane). The anchors are
/// re-read from the structure after every step; their stored coordinates are
/// invalidated by the preceding transform and must not be propagated
/// analytically.
///
/// All anchors are checked before the first mutation, so a missing-atom
/// failure leaves the structure untouched. Callers that re-drive a structure
/// through several orientations must accept that each call replaces the
/// previous frame wholesale.
pub fn orientate(
    structure: &mut StructureModel,
    residue_id: ResidueId,
    triple: AnchorTriple,
) -> Result<(), OrientationError> {
    let anchors = AnchorAtoms::resolve(structure, residue_id, triple)?;

    // Step 1: origin anchor to (0,0,0).
    let origin = anchors.origin(structure)?;
    structure.translate_all(-origin.coords);

    // Step 2: axis anchor into the XZ plane.
    let axis = anchors.axis(structure)?;
    structure.rotate_all(&axis_rotation(Axis::Z, -true_angle(axis.y, axis.x)));

    // Step 3: axis anchor onto the +X axis.
    let axis = anchors.axis(structure)?;
    structure.rotate_all(&axis_rotation(Axis::Y, true_angle(axis.z, axis.x)));

    // Step 4: plane anchor into the XY plane.
    let plane = anchors.plane(structure)?;
    structure.rotate_all(&axis_rotation(Axis::X, -true_angle(plane.z, plane.y)));

    Ok(())
}

/// Resolved anchor locations: which residue each anchor lives in, so the
/// current coordinates can be re-read between rotation steps.
struct AnchorAtoms {
    triple: AnchorTriple,
    residue_id: ResidueId,
    axis_residue_id: ResidueId,
    residue_number: isize,
}

impl AnchorAtoms {
    fn resolve(
        structure: &StructureModel,
        residue_id: ResidueId,
        triple: AnchorTriple,
    ) -> Result<Self, OrientationError> {
        let residue_number = structure
            .residue(residue_id)
            .map(|r| r.number)
            .unwrap_or_default();

        let axis_residue_id = if triple.axis_from_previous() {
            let previous = structure.previous_residue(residue_id).ok_or(
                OrientationError::NoPrecedingResidue { residue_number },
            )?;
            if !residues_bonded(structure, previous, residue_id) {
                return Err(OrientationError::NoPrecedingResidue { residue_number });
            }
            previous
        } else {
            residue_id
        };

        let anchors = Self {
            triple,
            residue_id,
            axis_residue_id,
            residue_number,
        };

        // Fail before any mutation if an anchor is absent.
        anchors.origin(structure)?;
        anchors.axis(structure)?;
        anchors.plane(structure)?;
        Ok(anchors)
    }

    fn origin(&self, structure: &StructureModel) -> Result<Point3<f64>, OrientationError> {
        self.lookup(structure, self.residue_id, self.triple.origin_atom())
    }

    fn axis(&self, structure: &StructureModel) -> Result<Point3<f64>, OrientationError> {
        self.lookup(structure, self.axis_residue_id, self.triple.axis_atom())
    }

    fn plane(&self, structure: &StructureModel) -> Result<Point3<f64>, OrientationError> {
        self.lookup(structure, self.residue_id, self.triple.plane_atom())
    }

    fn lookup(
        &self,
        structure: &StructureModel,
        residue_id: ResidueId,
        atom_name: &'static str,
    ) -> Result<Point3<f64>, OrientationError> {
        structure.atom_position(residue_id, atom_name).ok_or(
            OrientationError::MissingAnchorAtom {
                atom_name,
                residue_number: self.residue_number,
            },
        )
    }
}

/// True when the C of `first` and the N of `second` are close enough to be a
/// peptide bond.
pub fn residues_bonded(
    structure: &StructureModel,
    first: ResidueId,
    second: ResidueId,
) -> bool {
    match (
        structure.atom_position(first, "C"),
        structure.atom_position(second, "N"),
    ) {
        (Some(c), Some(n)) => (c - n).norm_squared() <= PEPTIDE_BOND_DIST_SQ,
        _ => false,
    }
}
