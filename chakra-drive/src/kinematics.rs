//! Swerve kinematics.
//!
//! Maps a robot-relative [`ChassisVelocity`] to four [`WheelState`]s and back.
//! For wheel `i` at offset `(xᵢ, yᵢ)` from the chassis centre the rigid-body
//! constraint is:
//!
//! ```text
//! vᵢₓ = vx - ω · yᵢ
//! vᵢᵧ = vy + ω · xᵢ
//! ```
//!
//! Stacking the four wheels gives an 8×3 system `A · [vx vy ω]ᵀ = b`. The
//! inverse direction solves it in the least-squares sense with the
//! pseudo-inverse `(AᵀA)⁻¹Aᵀ`, computed once at construction.

use std::f64::consts::FRAC_PI_2;

use crate::core::math::{angle_diff, invert_3x3};
use crate::core::{ChassisVelocity, Translation2D, Twist2D, WheelPosition, WheelState};
use crate::error::{Error, Result};

/// Number of wheel modules. Every per-module array is indexed in this order.
pub const MODULE_COUNT: usize = 4;

/// Module names in kinematics order.
pub const MODULE_NAMES: [&str; MODULE_COUNT] = ["front_right", "front_left", "back_right", "back_left"];

/// Four-wheel swerve kinematics with fixed wheel offsets.
#[derive(Debug, Clone)]
pub struct SwerveKinematics {
    offsets: [Translation2D; MODULE_COUNT],
    pseudo_inverse: [[f64; 2 * MODULE_COUNT]; 3],
}

impl SwerveKinematics {
    /// Build from explicit wheel offsets (metres, +x forward, +y left).
    ///
    /// Fails when the offsets cannot distinguish rotation from translation,
    /// e.g. all wheels at the same point.
    pub fn new(offsets: [Translation2D; MODULE_COUNT]) -> Result<Self> {
        let mut ata = [[0.0; 3]; 3];
        for o in &offsets {
            ata[0][0] += 1.0;
            ata[1][1] += 1.0;
            ata[0][2] -= o.y;
            ata[1][2] += o.x;
            ata[2][2] += o.x * o.x + o.y * o.y;
        }
        ata[2][0] = ata[0][2];
        ata[2][1] = ata[1][2];

        let inv = invert_3x3(&ata).ok_or_else(|| {
            Error::InvalidGeometry(format!("wheel offsets {offsets:?} are degenerate"))
        })?;

        let mut pseudo_inverse = [[0.0; 2 * MODULE_COUNT]; 3];
        for (i, o) in offsets.iter().enumerate() {
            // Aᵀ columns for wheel i: [1, 0, -y] and [0, 1, x]
            let col_x = [1.0, 0.0, -o.y];
            let col_y = [0.0, 1.0, o.x];
            for (r, row) in pseudo_inverse.iter_mut().enumerate() {
                row[2 * i] = (0..3).map(|c| inv[r][c] * col_x[c]).sum();
                row[2 * i + 1] = (0..3).map(|c| inv[r][c] * col_y[c]).sum();
            }
        }

        Ok(Self {
            offsets,
            pseudo_inverse,
        })
    }

    /// Rectangular chassis with wheels at the corners.
    pub fn from_dimensions(wheel_base: f64, track_width: f64) -> Result<Self> {
        if wheel_base <= 0.0 || track_width <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "wheel_base {wheel_base} and track_width {track_width} must be positive"
            )));
        }
        let hx = wheel_base / 2.0;
        let hy = track_width / 2.0;
        Self::new([
            Translation2D::new(hx, -hy),
            Translation2D::new(hx, hy),
            Translation2D::new(-hx, -hy),
            Translation2D::new(-hx, hy),
        ])
    }

    pub fn offsets(&self) -> &[Translation2D; MODULE_COUNT] {
        &self.offsets
    }

    /// Chassis velocity to per-wheel speed and angle.
    ///
    /// A wheel with zero required velocity reports angle 0; the module keeps
    /// its current steering in that case.
    pub fn to_wheel_states(&self, velocity: &ChassisVelocity) -> [WheelState; MODULE_COUNT] {
        self.offsets.map(|o| {
            let vx = velocity.vx - velocity.omega * o.y;
            let vy = velocity.vy + velocity.omega * o.x;
            WheelState::new(vx.hypot(vy), vy.atan2(vx))
        })
    }

    /// Least-squares chassis velocity from measured wheel states.
    pub fn to_chassis_velocity(&self, states: &[WheelState; MODULE_COUNT]) -> ChassisVelocity {
        let [vx, vy, omega] = self.solve(states.map(|s| (s.speed, s.angle)));
        ChassisVelocity::new(vx, vy, omega)
    }

    /// Body-frame displacement between two sets of wheel positions.
    ///
    /// Uses the distance travelled by each wheel along its final angle.
    pub fn to_twist(
        &self,
        start: &[WheelPosition; MODULE_COUNT],
        end: &[WheelPosition; MODULE_COUNT],
    ) -> Twist2D {
        let mut deltas = [(0.0, 0.0); MODULE_COUNT];
        for (i, d) in deltas.iter_mut().enumerate() {
            *d = (end[i].distance - start[i].distance, end[i].angle);
        }
        let [dx, dy, dtheta] = self.solve(deltas);
        Twist2D::new(dx, dy, dtheta)
    }

    fn solve(&self, polar: [(f64, f64); MODULE_COUNT]) -> [f64; 3] {
        let mut b = [0.0; 2 * MODULE_COUNT];
        for (i, (magnitude, angle)) in polar.iter().enumerate() {
            let (sin_a, cos_a) = angle.sin_cos();
            b[2 * i] = magnitude * cos_a;
            b[2 * i + 1] = magnitude * sin_a;
        }
        self.pseudo_inverse
            .map(|row| row.iter().zip(b.iter()).map(|(p, v)| p * v).sum())
    }
}

/// Scale all wheel speeds by one factor so none exceeds `max_speed`.
///
/// Leaves the states untouched when already within the limit. Returns the
/// factor applied (1.0 when nothing changed).
pub fn desaturate(states: &mut [WheelState; MODULE_COUNT], max_speed: f64) -> f64 {
    let top = states.iter().fold(0.0_f64, |m, s| m.max(s.speed.abs()));
    if top <= max_speed || top == 0.0 {
        return 1.0;
    }
    let factor = max_speed / top;
    for s in states.iter_mut() {
        s.speed *= factor;
    }
    factor
}

/// Pick the cheaper of `desired` and its 180° flip from `current_angle`.
///
/// The result never requires more than 90° of steering travel.
pub fn optimize(desired: WheelState, current_angle: f64) -> WheelState {
    let delta = angle_diff(current_angle, desired.angle);
    if delta.abs() > FRAC_PI_2 {
        WheelState::new(-desired.speed, desired.angle + std::f64::consts::PI)
    } else {
        desired
    }
}
