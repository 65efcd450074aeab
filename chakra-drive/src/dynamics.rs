//! Discretization correction for one-step chassis commands.
//!
//! A constant `(vx, vy, ω)` held for one control period traces an arc, but
//! the wheels are commanded as if the motion were a straight segment plus a
//! rotation. Taking the SE(2) logarithm of the intended one-step pose delta
//! gives the twist that actually lands on it; dividing that twist by the
//! period gives the velocity to command.

use crate::core::{ChassisVelocity, Twist2D};

/// Correct `velocity` for a control period of `period_s` seconds.
///
/// With `ω = 0` the input is returned unchanged.
pub fn correct_for_dynamics(velocity: &ChassisVelocity, period_s: f64) -> ChassisVelocity {
    if period_s <= 0.0 {
        return *velocity;
    }

    // log(vx·T, vy·T, ω·T) / T, with T folded out of the translation terms
    let twist = Twist2D::from_delta(velocity.vx, velocity.vy, velocity.omega * period_s);
    ChassisVelocity::new(twist.dx, twist.dy, velocity.omega)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Pose2D, Twist2D};
    use approx::assert_relative_eq;

    const LOOP_PERIOD: f64 = 0.02;

    #[test]
    fn test_no_rotation_is_exact() {
        for v in [
            ChassisVelocity::new(1.0, 0.0, 0.0),
            ChassisVelocity::new(-3.7, 2.9, 0.0),
            ChassisVelocity::new(0.1, -0.000_3, 0.0),
        ] {
            assert_eq!(correct_for_dynamics(&v, LOOP_PERIOD), v);
        }
    }

    #[test]
    fn test_small_angle_continuity() {
        let v = ChassisVelocity::new(2.0, 1.0, 0.0);
        let at = |dtheta: f64| {
            correct_for_dynamics(
                &ChassisVelocity::new(v.vx, v.vy, dtheta / LOOP_PERIOD),
                LOOP_PERIOD,
            )
        };
        // 1e-10 and 1e-7 fall in the Taylor branch, 1e-4 in the closed form
        let tiny = at(1e-10);
        let small = at(1e-7);
        let closed = at(1e-4);
        for c in [tiny, small, closed] {
            assert_relative_eq!(c.vx, v.vx, epsilon = 1e-3);
            assert_relative_eq!(c.vy, v.vy, epsilon = 1e-3);
        }
        assert_relative_eq!(tiny.vx, small.vx, epsilon = 1e-6);
        assert_relative_eq!(tiny.vy, small.vy, epsilon = 1e-6);
    }

    #[test]
    fn test_corrected_twist_reaches_target_pose() {
        let v = ChassisVelocity::new(3.0, 0.0, 2.0);
        let corrected = correct_for_dynamics(&v, LOOP_PERIOD);

        // Integrating the corrected twist lands on the straight-line target
        let reached = Pose2D::identity().exp(&Twist2D::new(
            corrected.vx * LOOP_PERIOD,
            corrected.vy * LOOP_PERIOD,
            corrected.omega * LOOP_PERIOD,
        ));
        assert_relative_eq!(reached.x, v.vx * LOOP_PERIOD, epsilon = 1e-12);
        assert_relative_eq!(reached.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(reached.theta, v.omega * LOOP_PERIOD, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_bends_translation() {
        // Turning left while driving forward leans the command to the right
        let corrected = correct_for_dynamics(&ChassisVelocity::new(3.0, 0.0, 2.0), LOOP_PERIOD);
        assert!(corrected.vy < 0.0);
        assert_relative_eq!(corrected.omega, 2.0);
    }
}
