use crate::core::grid::{GRID_SPACING, GridIndex, VoxelGrid, dequantize, quantize};
use nalgebra::{Rotation3, Vector3};

/// Log-likelihood compatibility score of one key/partner cell pairing.
/// Both counts must be positive and no larger than their totals, so each
/// normalized probability is in (0, 1] and the score is non-negative; lower
/// is better.
pub fn pseudo_energy(key_count: u32, key_total: u64, partner_count: u32, partner_total: u64) -> f64 {
    let key_probability = key_count as f64 / key_total as f64;
    let partner_probability = partner_count as f64 / partner_total as f64;
    -key_probability.ln() - partner_probability.ln()
}

/// Finds the best (lowest) pseudo-energy correspondence between a partner
/// grid and a key grid.
///
/// Every occupied partner cell is mapped into the key frame (`rotation` then
/// `displacement`), requantized, and scored against the key grid: an exact
/// cell hit scores directly; a miss triggers a bounded box search of
/// index-radius `ceil(cutoff / spacing)` around the landing cell, accepting
/// occupied key cells whose center lies within `cutoff` of the landing
/// cell's center. Cell distances are measured on the lattice, from the
/// requantized landing cell rather than the exact rotated point; these are
/// the historical cutoff semantics, kept so role-swapped passes score
/// symmetrically.
///
/// Returns `None` when no partner cell finds a qualifying key cell; partner
/// cells landing outside the cube are expected (hydrogen bonds are local)
/// and skipped silently. Ties keep the first candidate in ascending
/// x, y, z order.
pub fn match_grids(
    key: &VoxelGrid,
    partner: &VoxelGrid,
    rotation: &Rotation3<f64>,
    displacement: &Vector3<f64>,
    cutoff: f64,
) -> Option<f64> {
    let key_total = key.total();
    let partner_total = partner.total();
    if key_total == 0 || partner_total == 0 {
        return None;
    }

    let mut best: Option<f64> = None;
    for (cell, partner_count) in partner.occupied() {
        let candidate = score_partner_cell(
            key,
            key_total,
            cell,
            partner_count,
            partner_total,
            rotation,
            displacement,
            cutoff,
        );
        if let Some(energy) = candidate {
            if best.is_none_or(|b| energy < b) {
                best = Some(energy);
            }
        }
    }
    best
}

/// Scores a single occupied partner cell against the key grid. Shared by the
/// full matching pass and the single-atom reference-energy path.
#[allow(clippy::too_many_arguments)]
pub(crate) fn score_partner_cell(
    key: &VoxelGrid,
    key_total: u64,
    partner_cell: GridIndex,
    partner_count: u32,
    partner_total: u64,
    rotation: &Rotation3<f64>,
    displacement: &Vector3<f64>,
    cutoff: f64,
) -> Option<f64> {
    let transformed = rotation * dequantize(partner_cell) + displacement;
    let landing = quantize(&transformed)?;

    let key_count = key.count(landing);
    if key_count > 0 {
        return Some(pseudo_energy(
            key_count,
            key_total,
            partner_count,
            partner_total,
        ));
    }
    if cutoff <= 0.0 {
        return None;
    }

    let radius = (cutoff / GRID_SPACING).ceil() as i64;
    let cutoff_squared = cutoff * cutoff;
    let center = dequantize(landing);

    let mut best: Option<f64> = None;
    for dx in -radius..=radius {
        for dy in -radius..=radius {
            for dz in -radius..=radius {
                let neighbor = match GridIndex::from_signed(
                    landing.x as i64 + dx,
                    landing.y as i64 + dy,
                    landing.z as i64 + dz,
                ) {
                    Some(index) => index,
                    None => continue,
                };
                let neighbor_count = key.count(neighbor);
                if neighbor_count == 0 {
                    continue;
                }
                if (dequantize(neighbor) - center).norm_squared() > cutoff_squared {
                    continue;
                }
                let energy = pseudo_energy(
                    neighbor_count,
                    key_total,
                    partner_count,
                    partner_total,
                );
                if best.is_none_or(|b| energy < b) {
                    best = Some(energy);
                }
            }
        }
    }
    best
}
