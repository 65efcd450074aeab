//! Geometry and state types for the swerve drive.
//!
//! All lengths are metres, angles radians, velocities per second.

use serde::{Deserialize, Serialize};

use super::math::{angle_lerp, normalize_angle};

/// A 2D translation in metres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Translation2D {
    pub x: f64,
    pub y: f64,
}

impl Translation2D {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    #[inline]
    pub fn distance(&self, other: &Translation2D) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Rotate counter-clockwise by `angle` radians.
    #[inline]
    pub fn rotate_by(&self, angle: f64) -> Translation2D {
        let (sin_a, cos_a) = angle.sin_cos();
        Translation2D::new(self.x * cos_a - self.y * sin_a, self.x * sin_a + self.y * cos_a)
    }

    #[inline]
    pub fn minus(&self, other: &Translation2D) -> Translation2D {
        Translation2D::new(self.x - other.x, self.y - other.y)
    }

    #[inline]
    pub fn is_origin(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Platform pose in the field frame.
///
/// Theta is normalized to (-π, π].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    /// X position in metres
    pub x: f64,
    /// Y position in metres
    pub y: f64,
    /// Heading in radians
    pub theta: f64,
}

impl Pose2D {
    /// Create a new pose with theta normalized.
    #[inline]
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self {
            x,
            y,
            theta: normalize_angle(theta),
        }
    }

    /// Create a pose from a heading in degrees.
    #[inline]
    pub fn from_degrees(x: f64, y: f64, theta_deg: f64) -> Self {
        Self::new(x, y, theta_deg.to_radians())
    }

    #[inline]
    pub fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            theta: 0.0,
        }
    }

    #[inline]
    pub fn translation(&self) -> Translation2D {
        Translation2D::new(self.x, self.y)
    }

    /// Same translation, different heading.
    #[inline]
    pub fn with_theta(&self, theta: f64) -> Pose2D {
        Pose2D::new(self.x, self.y, theta)
    }

    /// Compose two poses: self ⊕ other
    ///
    /// ```text
    /// C = A ⊕ B:
    ///   C.x = A.x + B.x * cos(A.θ) - B.y * sin(A.θ)
    ///   C.y = A.y + B.x * sin(A.θ) + B.y * cos(A.θ)
    ///   C.θ = normalize(A.θ + B.θ)
    /// ```
    #[inline]
    pub fn compose(&self, other: &Pose2D) -> Pose2D {
        let (sin_t, cos_t) = self.theta.sin_cos();
        Pose2D::new(
            self.x + other.x * cos_t - other.y * sin_t,
            self.y + other.x * sin_t + other.y * cos_t,
            self.theta + other.theta,
        )
    }

    /// Inverse of this pose.
    #[inline]
    pub fn inverse(&self) -> Pose2D {
        let (sin_t, cos_t) = self.theta.sin_cos();
        Pose2D::new(
            -self.x * cos_t - self.y * sin_t,
            self.x * sin_t - self.y * cos_t,
            -self.theta,
        )
    }

    /// This pose expressed in the frame of `origin`.
    #[inline]
    pub fn relative_to(&self, origin: &Pose2D) -> Pose2D {
        origin.inverse().compose(self)
    }

    /// Apply a constant twist starting from this pose (SE(2) exponential map).
    pub fn exp(&self, twist: &Twist2D) -> Pose2D {
        let dtheta = twist.dtheta;
        let (sin_t, cos_t) = dtheta.sin_cos();

        let (s, c) = if dtheta.abs() < 1e-9 {
            (1.0 - dtheta * dtheta / 6.0, 0.5 * dtheta)
        } else {
            (sin_t / dtheta, (1.0 - cos_t) / dtheta)
        };

        let delta = Pose2D::new(
            twist.dx * s - twist.dy * c,
            twist.dx * c + twist.dy * s,
            dtheta,
        );
        self.compose(&delta)
    }

    /// Twist that carries this pose onto `end` (SE(2) logarithm).
    ///
    /// `self.exp(&self.log(&end))` reproduces `end`.
    pub fn log(&self, end: &Pose2D) -> Twist2D {
        let delta = end.relative_to(self);
        Twist2D::from_delta(delta.x, delta.y, delta.theta)
    }

    /// Interpolate between two timestamped poses.
    ///
    /// Returns `None` if `target_time_us` is outside [start, end].
    pub fn interpolate(
        start: &Timestamped<Pose2D>,
        end: &Timestamped<Pose2D>,
        target_time_us: u64,
    ) -> Option<Pose2D> {
        if target_time_us < start.timestamp_us || target_time_us > end.timestamp_us {
            return None;
        }

        if start.timestamp_us == end.timestamp_us {
            return Some(start.data);
        }

        let t = (target_time_us - start.timestamp_us) as f64
            / (end.timestamp_us - start.timestamp_us) as f64;

        let x = start.data.x + t * (end.data.x - start.data.x);
        let y = start.data.y + t * (end.data.y - start.data.y);
        let theta = angle_lerp(start.data.theta, end.data.theta, t);

        Some(Pose2D { x, y, theta })
    }
}

impl Default for Pose2D {
    fn default() -> Self {
        Self::identity()
    }
}

/// A small rigid-body motion in the body frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Twist2D {
    pub dx: f64,
    pub dy: f64,
    pub dtheta: f64,
}

impl Twist2D {
    #[inline]
    pub const fn new(dx: f64, dy: f64, dtheta: f64) -> Self {
        Self { dx, dy, dtheta }
    }

    /// Closed-form logarithm of a pose delta `(x, y, θ)`.
    ///
    /// ```text
    /// half = θ / 2
    /// k    = 1 - θ²/12                      if |cos θ - 1| < 1e-9
    ///      = -(half · sin θ) / (cos θ - 1)  otherwise
    /// dx   =  k · x + half · y
    /// dy   = -half · x + k · y
    /// ```
    ///
    /// This is the translation rotated by `Rotation(k, -half)` and scaled
    /// by `hypot(k, half)`.
    pub fn from_delta(x: f64, y: f64, theta: f64) -> Twist2D {
        let half = theta / 2.0;
        let cos_minus_one = theta.cos() - 1.0;

        let k = if cos_minus_one.abs() < 1e-9 {
            1.0 - theta * theta / 12.0
        } else {
            -(half * theta.sin()) / cos_minus_one
        };

        Twist2D {
            dx: k * x + half * y,
            dy: -half * x + k * y,
            dtheta: theta,
        }
    }

    /// Per-axis scaling.
    #[inline]
    pub fn scale(&self, kx: f64, ky: f64, ktheta: f64) -> Twist2D {
        Twist2D::new(self.dx * kx, self.dy * ky, self.dtheta * ktheta)
    }
}

/// Platform velocity `(vx, vy, ω)`.
///
/// The frame (robot- or field-relative) is never stored; conversions take
/// the heading explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChassisVelocity {
    /// m/s
    pub vx: f64,
    /// m/s
    pub vy: f64,
    /// rad/s, counter-clockwise positive
    pub omega: f64,
}

impl ChassisVelocity {
    #[inline]
    pub const fn new(vx: f64, vy: f64, omega: f64) -> Self {
        Self { vx, vy, omega }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Convert a field-relative command into the robot frame.
    pub fn from_field_relative(vx: f64, vy: f64, omega: f64, heading: f64) -> Self {
        let robot = Translation2D::new(vx, vy).rotate_by(-heading);
        Self::new(robot.x, robot.y, omega)
    }

    /// Convert this robot-relative velocity into the field frame.
    pub fn to_field_relative(&self, heading: f64) -> Self {
        let field = Translation2D::new(self.vx, self.vy).rotate_by(heading);
        Self::new(field.x, field.y, self.omega)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.vx == 0.0 && self.vy == 0.0 && self.omega == 0.0
    }
}

/// Speed and steering angle of one wheel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WheelState {
    /// Signed drive speed in m/s
    pub speed: f64,
    /// Steering angle in radians, (-π, π]
    pub angle: f64,
}

impl WheelState {
    #[inline]
    pub fn new(speed: f64, angle: f64) -> Self {
        Self {
            speed,
            angle: normalize_angle(angle),
        }
    }
}

/// Cumulative drive distance and steering angle of one wheel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WheelPosition {
    /// Metres travelled since the last encoder zero
    pub distance: f64,
    /// Steering angle in radians
    pub angle: f64,
}

impl WheelPosition {
    #[inline]
    pub fn new(distance: f64, angle: f64) -> Self {
        Self {
            distance,
            angle: normalize_angle(angle),
        }
    }
}

/// Generic timestamp wrapper.
///
/// Timestamps are microseconds on the control loop clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timestamped<T> {
    pub data: T,
    pub timestamp_us: u64,
}

impl<T> Timestamped<T> {
    #[inline]
    pub fn new(data: T, timestamp_us: u64) -> Self {
        Self { data, timestamp_us }
    }
}
