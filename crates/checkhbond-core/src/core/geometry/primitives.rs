use nalgebra::{Point3, Rotation3, Vector3};

/// Principal axis selector for the single-axis rotations used by frame
/// orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Returns the angle, in radians, whose tangent is `opp / adj`, in the
/// correct quadrant.
#[inline]
pub fn true_angle(opp: f64, adj: f64) -> f64 {
    opp.atan2(adj)
}

/// Builds a right-handed rotation about one principal axis.
pub fn axis_rotation(axis: Axis, angle: f64) -> Rotation3<f64> {
    match axis {
        Axis::X => Rotation3::from_axis_angle(&Vector3::x_axis(), angle),
        Axis::Y => Rotation3::from_axis_angle(&Vector3::y_axis(), angle),
        Axis::Z => Rotation3::from_axis_angle(&Vector3::z_axis(), angle),
    }
}

/// Squared Euclidean distance between two points.
#[inline]
pub fn distance_squared(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    (a - b).norm_squared()
}

/// Angle at `b` in the path `a`-`b`-`c`, in radians.
pub fn angle_at(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let ba = a - b;
    let bc = c - b;
    ba.angle(&bc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const EPS: f64 = 1e-12;

    #[test]
    fn true_angle_handles_quadrants() {
        assert!((true_angle(0.0, 1.0) - 0.0).abs() < EPS);
        assert!((true_angle(1.0, 0.0) - FRAC_PI_2).abs() < EPS);
        assert!((true_angle(0.0, -1.0) - PI).abs() < EPS);
        assert!((true_angle(-1.0, 0.0) + FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn z_rotation_by_neg_atan2_lands_on_positive_x() {
        // The first orientation step relies on exactly this identity.
        let p = Point3::new(3.0, 4.0, 0.0);
        let rotation = axis_rotation(Axis::Z, -true_angle(p.y, p.x));
        let rotated = rotation * p;
        assert!((rotated.x - 5.0).abs() < EPS);
        assert!(rotated.y.abs() < EPS);
    }

    #[test]
    fn y_rotation_by_pos_atan2_zeroes_z() {
        let p = Point3::new(3.0, 0.0, 4.0);
        let rotation = axis_rotation(Axis::Y, true_angle(p.z, p.x));
        let rotated = rotation * p;
        assert!((rotated.x - 5.0).abs() < EPS);
        assert!(rotated.z.abs() < EPS);
    }

    #[test]
    fn x_rotation_by_neg_atan2_zeroes_z() {
        let p = Point3::new(0.0, 3.0, 4.0);
        let rotation = axis_rotation(Axis::X, -true_angle(p.z, p.y));
        let rotated = rotation * p;
        assert!((rotated.y - 5.0).abs() < EPS);
        assert!(rotated.z.abs() < EPS);
    }

    #[test]
    fn angle_at_right_angle() {
        let a = Point3::new(1.0, 0.0, 0.0);
        let b = Point3::origin();
        let c = Point3::new(0.0, 1.0, 0.0);
        assert!((angle_at(&a, &b, &c) - FRAC_PI_2).abs() < EPS);
    }
}
