//! Numeric primitives shared by the drive algorithms.
//!
//! Angle wrapping, shortest angular difference, and a closed-form
//! 3×3 inverse used by the kinematics least-squares solve.

use std::f64::consts::{PI, TAU};

/// Normalize angle to (-π, π].
///
/// # Example
/// ```
/// use chakra_drive::core::math::normalize_angle;
/// use std::f64::consts::PI;
///
/// assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-9);
/// assert!((normalize_angle(-PI) - PI).abs() < 1e-9);
/// ```
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}

/// Shortest angular difference from angle `a` to angle `b`.
///
/// Returns the signed angle you need to add to `a` to reach `b`,
/// taking the shortest path around the circle.
#[inline]
pub fn angle_diff(a: f64, b: f64) -> f64 {
    normalize_angle(b - a)
}

/// Linear interpolation between two angles, taking the shortest path.
#[inline]
pub fn angle_lerp(a: f64, b: f64, t: f64) -> f64 {
    normalize_angle(a + angle_diff(a, b) * t)
}

/// Inverse of a 3×3 matrix by cofactors.
///
/// Returns `None` when the determinant is below `1e-12`.
pub fn invert_3x3(a: &[[f64; 3]; 3]) -> Option<[[f64; 3]; 3]> {
    let det = a[0][0] * (a[1][1] * a[2][2] - a[1][2] * a[2][1])
        - a[0][1] * (a[1][0] * a[2][2] - a[1][2] * a[2][0])
        + a[0][2] * (a[1][0] * a[2][1] - a[1][1] * a[2][0]);

    if det.abs() < 1e-12 {
        return None;
    }

    let inv_det = 1.0 / det;

    Some([
        [
            (a[1][1] * a[2][2] - a[1][2] * a[2][1]) * inv_det,
            (a[0][2] * a[2][1] - a[0][1] * a[2][2]) * inv_det,
            (a[0][1] * a[1][2] - a[0][2] * a[1][1]) * inv_det,
        ],
        [
            (a[1][2] * a[2][0] - a[1][0] * a[2][2]) * inv_det,
            (a[0][0] * a[2][2] - a[0][2] * a[2][0]) * inv_det,
            (a[0][2] * a[1][0] - a[0][0] * a[1][2]) * inv_det,
        ],
        [
            (a[1][0] * a[2][1] - a[1][1] * a[2][0]) * inv_det,
            (a[0][1] * a[2][0] - a[0][0] * a[2][1]) * inv_det,
            (a[0][0] * a[1][1] - a[0][1] * a[1][0]) * inv_det,
        ],
    ])
}

/// Solve `A·x = b` for a 3×3 system.
pub fn solve_3x3(a: &[[f64; 3]; 3], b: &[f64; 3]) -> Option<[f64; 3]> {
    let inv = invert_3x3(a)?;
    Some([
        inv[0][0] * b[0] + inv[0][1] * b[1] + inv[0][2] * b[2],
        inv[1][0] * b[0] + inv[1][1] * b[1] + inv[1][2] * b[2],
        inv[2][0] * b[0] + inv[2][1] * b[1] + inv[2][2] * b[2],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_angle_zero() {
        assert_relative_eq!(normalize_angle(0.0), 0.0);
    }

    #[test]
    fn test_normalize_angle_half_open() {
        assert_relative_eq!(normalize_angle(PI), PI);
        assert_relative_eq!(normalize_angle(-PI), PI);
    }

    #[test]
    fn test_normalize_angle_wrap() {
        assert_relative_eq!(normalize_angle(2.0 * PI), 0.0, epsilon = 1e-12);
        assert_relative_eq!(normalize_angle(3.0 * PI), PI, epsilon = 1e-12);
        assert_relative_eq!(normalize_angle(-2.5 * PI), -0.5 * PI, epsilon = 1e-12);
    }

    #[test]
    fn test_angle_diff_across_boundary() {
        let a = 179f64.to_radians();
        let b = (-179f64).to_radians();
        assert_relative_eq!(angle_diff(a, b), 2f64.to_radians(), epsilon = 1e-12);
        assert_relative_eq!(angle_diff(b, a), -2f64.to_radians(), epsilon = 1e-12);
    }

    #[test]
    fn test_angle_lerp_shortest_path() {
        let mid = angle_lerp(PI - 0.1, -PI + 0.1, 0.5);
        assert_relative_eq!(mid.abs(), PI, epsilon = 1e-12);
    }

    #[test]
    fn test_solve_3x3() {
        let a = [[2.0, 0.0, 1.0], [0.0, 3.0, 0.0], [1.0, 0.0, 4.0]];
        let x = solve_3x3(&a, &[3.0, 6.0, 5.0]).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(x[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invert_singular() {
        let a = [[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 1.0, 1.0]];
        assert!(invert_3x3(&a).is_none());
    }
}
