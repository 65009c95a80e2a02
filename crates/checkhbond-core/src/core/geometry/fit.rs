use nalgebra::{Matrix3, Rotation3, Vector3};
use thiserror::Error;

/// Backbone atoms entering the rigid fit, with their confidence weights.
/// Calpha and N pin the fit; the carbonyl carbon contributes only weakly
/// because its placement varies most between residue types.
pub const BACKBONE_FIT_ATOMS: [(&str, f64); 3] = [("N", 1.0), ("CA", 1.0), ("C", 0.1)];

/// Singular values below this are treated as zero when ranking the
/// cross-covariance matrix.
const RANK_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Error, PartialEq)]
pub enum FitError {
    #[error("point sets must be the same non-zero length (reference {reference}, mobile {mobile})")]
    LengthMismatch { reference: usize, mobile: usize },

    #[error("degenerate atom arrangement, rotation is underdetermined")]
    Degenerate,
}

/// Computes the weighted, rotation-only least-squares superposition that maps
/// `mobile` onto `reference`.
///
/// Both point sets must already be expressed relative to the shared reference
/// origin (the key residue's Calpha); no translation or centroid shift is
/// applied here, and no scaling or reflection is ever produced. This is the
/// orthogonal Procrustes solution over the weighted cross-covariance matrix,
/// with the determinant-corrected SVD reconstruction.
///
/// # Errors
///
/// Returns [`FitError::Degenerate`] when the points do not determine a unique
/// rotation (collinear or near-collinear input).
pub fn fit_rotation(
    reference: &[Vector3<f64>],
    mobile: &[Vector3<f64>],
    weights: &[f64],
) -> Result<Rotation3<f64>, FitError> {
    if reference.len() != mobile.len() || reference.len() != weights.len() || reference.is_empty()
    {
        return Err(FitError::LengthMismatch {
            reference: reference.len(),
            mobile: mobile.len(),
        });
    }

    let h = reference
        .iter()
        .zip(mobile.iter())
        .zip(weights.iter())
        .fold(Matrix3::zeros(), |acc, ((r, m), &w)| {
            acc + (r * m.transpose()) * w
        });

    let svd = h.svd(true, true);

    // A unique rotation needs at least two independent directions.
    let significant = svd
        .singular_values
        .iter()
        .filter(|&&s| s > RANK_TOLERANCE)
        .count();
    if significant < 2 {
        return Err(FitError::Degenerate);
    }

    let u = svd.u.ok_or(FitError::Degenerate)?;
    let v_t = svd.v_t.ok_or(FitError::Degenerate)?;

    let d = (u * v_t.transpose()).determinant();
    let mut correction = Matrix3::identity();
    if d < 0.0 {
        correction[(2, 2)] = -1.0;
    }

    let rotation_matrix = u * correction * v_t;
    Ok(Rotation3::from_matrix(&rotation_matrix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    const EPS: f64 = 1e-9;

    fn backbone_points() -> Vec<Vector3<f64>> {
        vec![
            Vector3::new(1.46, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(-0.55, 1.42, 0.3),
        ]
    }

    fn weights() -> Vec<f64> {
        BACKBONE_FIT_ATOMS.iter().map(|&(_, w)| w).collect()
    }

    #[test]
    fn identity_case_yields_identity_rotation() {
        let points = backbone_points();
        let rotation = fit_rotation(&points, &points, &weights()).unwrap();
        let angle = rotation.angle();
        assert!(angle.abs() < EPS, "expected identity, got angle {angle}");
    }

    #[test]
    fn recovers_a_known_rotation() {
        let reference = backbone_points();
        let applied = Rotation3::from_euler_angles(0.3, -0.8, 1.9);
        let mobile: Vec<_> = reference
            .iter()
            .map(|p| applied.inverse() * p)
            .collect();

        let recovered = fit_rotation(&reference, &mobile, &weights()).unwrap();

        for (r, m) in reference.iter().zip(mobile.iter()) {
            assert!((recovered * m - r).norm() < EPS);
        }
    }

    #[test]
    fn never_produces_a_reflection() {
        // A mirrored point set must come back as a proper rotation, not a
        // determinant -1 transform.
        let reference = backbone_points();
        let mirrored: Vec<_> = reference
            .iter()
            .map(|p| Vector3::new(p.x, p.y, -p.z))
            .collect();

        let rotation = fit_rotation(&reference, &mirrored, &weights()).unwrap();
        assert!((rotation.matrix().determinant() - 1.0).abs() < EPS);
    }

    #[test]
    fn collinear_points_are_degenerate() {
        let reference = vec![
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(2.0, 0.0, 0.0),
            Vector3::new(3.0, 0.0, 0.0),
        ];
        let mobile = vec![
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 2.0, 0.0),
            Vector3::new(0.0, 3.0, 0.0),
        ];
        let weights = [1.0, 1.0, 1.0];

        assert_eq!(
            fit_rotation(&reference, &mobile, &weights),
            Err(FitError::Degenerate)
        );
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let reference = backbone_points();
        let mobile = vec![Vector3::zeros()];
        assert!(matches!(
            fit_rotation(&reference, &mobile, &[1.0]),
            Err(FitError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn weights_bias_the_fit_toward_heavy_atoms() {
        // Perturb only the low-weight carbonyl carbon; the recovered rotation
        // should stay close to identity.
        let reference = backbone_points();
        let mut mobile = reference.clone();
        mobile[2] += Vector3::new(0.0, 0.12, -0.2);

        let rotation = fit_rotation(&reference, &mobile, &weights()).unwrap();
        assert!(rotation.angle() < 0.05);
    }
}
