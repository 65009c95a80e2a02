use crate::core::geometry::primitives::angle_at;
use nalgebra::Point3;

/// Maximum donor-to-acceptor heavy-atom distance (A).
const MAX_DONOR_ACCEPTOR_DIST: f64 = 3.5;
/// Maximum hydrogen-to-acceptor distance (A), applied when the hydrogen is known.
const MAX_HYDROGEN_ACCEPTOR_DIST: f64 = 2.5;
/// Minimum bonding angle at the hydrogen and at the acceptor, in radians.
const MIN_BOND_ANGLE: f64 = std::f64::consts::FRAC_PI_2;

/// Pure geometric hydrogen-bond test over atom positions.
///
/// The criteria degrade gracefully with the available atoms: the
/// donor-acceptor distance is always enforced; a known hydrogen additionally
/// constrains the H···A distance and the D-H···A angle; a known antecedent
/// additionally constrains the approach angle at the acceptor (measured
/// against the hydrogen when present, the donor otherwise).
pub fn valid_hbond(
    hydrogen: Option<&Point3<f64>>,
    donor: &Point3<f64>,
    acceptor: &Point3<f64>,
    antecedent: Option<&Point3<f64>>,
) -> bool {
    if (donor - acceptor).norm() > MAX_DONOR_ACCEPTOR_DIST {
        return false;
    }

    if let Some(h) = hydrogen {
        if (h - acceptor).norm() > MAX_HYDROGEN_ACCEPTOR_DIST {
            return false;
        }
        if angle_at(donor, h, acceptor) < MIN_BOND_ANGLE {
            return false;
        }
    }

    if let Some(p) = antecedent {
        let approach = hydrogen.unwrap_or(donor);
        if angle_at(approach, acceptor, p) < MIN_BOND_ANGLE {
            return false;
        }
    }

    true
}
