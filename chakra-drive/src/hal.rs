//! Collaborator interfaces for hardware and external services.
//!
//! Everything the drive core reads from or commands into the outside world
//! goes through one of these traits. Implementations live in the device
//! layer (real hardware or simulation); the core only sees the trait.

use serde::{Deserialize, Serialize};

use crate::commands::Command;
use crate::core::Pose2D;
use crate::error::Result;
use crate::field::{Alliance, StartingLocation};

/// Absolute heading sensor.
pub trait Gyro: Send {
    /// Current heading in radians, counter-clockwise positive.
    fn heading(&self) -> Result<f64>;

    /// Redefine the current physical heading as `heading` radians.
    fn reset_heading(&mut self, heading: f64) -> Result<()>;
}

/// Drive and steering motors of one wheel module.
///
/// Reads report [`crate::Error::FeedbackLost`] when the encoder is gone.
pub trait WheelActuator: Send {
    /// Cumulative drive distance in metres since the last zero.
    fn drive_distance(&self) -> Result<f64>;

    /// Drive velocity in m/s.
    fn drive_velocity(&self) -> Result<f64>;

    /// Absolute steering angle in radians.
    fn steer_angle(&self) -> Result<f64>;

    fn set_drive_velocity(&mut self, speed: f64) -> Result<()>;

    fn set_steer_angle(&mut self, angle: f64) -> Result<()>;

    /// Zero drive output. Steering holds its last target.
    fn stop_drive(&mut self) -> Result<()>;

    fn zero_drive_encoder(&mut self) -> Result<()>;
}

/// Best-effort absolute pose reported by the vision system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisionPose {
    /// Field pose of the platform
    pub pose: Pose2D,
    /// Capture-to-publish latency in seconds
    pub latency_s: f64,
}

/// Fiducial and object camera.
///
/// Shared between the control loop and camera readers, so methods take
/// `&self`.
pub trait VisionSource: Send + Sync {
    fn has_target(&self) -> bool;

    /// Number of fiducial tags in the current frame.
    fn target_count(&self) -> usize;

    /// Apparent area of the primary target as a 0..1 fraction of the image.
    fn target_area(&self) -> f64;

    /// Platform pose solved from visible tags, if any.
    fn pose_estimate(&self) -> Option<VisionPose>;
}

/// Match context: which alliance we are and where we started.
pub trait AllianceProvider: Send + Sync {
    fn alliance(&self) -> Option<Alliance>;

    fn starting_location(&self) -> Option<StartingLocation>;
}

/// One sample of driver controls.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DriverInput {
    /// Forward stick, -1..1
    pub x: f64,
    /// Left stick, -1..1
    pub y: f64,
    pub field_oriented: bool,
    pub fine_control: bool,
    /// D-pad angle in degrees (0 up, clockwise), `None` when released
    pub pov: Option<u16>,
}

/// Source of driver controls, sampled once per tick.
pub trait DriverInputSource: Send {
    fn read(&self) -> DriverInput;
}

/// Kinematic limits for a path-follow request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConstraints {
    /// m/s
    pub max_velocity: f64,
    /// m/s²
    pub max_acceleration: f64,
    /// rad/s
    pub max_angular_velocity: f64,
    /// rad/s²
    pub max_angular_acceleration: f64,
}

/// Path-following service.
///
/// Returns a command that drives to `goal` and finishes on arrival. Ending
/// the command cancels the follow.
pub trait PathFollower: Send {
    fn follow(&mut self, goal: Pose2D, constraints: PathConstraints) -> Result<Box<dyn Command>>;
}

/// Readings from two sensors watching the same thing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorPair<T> {
    pub front: T,
    pub back: T,
}

impl SensorPair<Option<bool>> {
    /// True when either sensor positively reports a detection.
    ///
    /// A missing reading counts as not detected.
    pub fn either_detected(&self) -> bool {
        self.front.unwrap_or(false) || self.back.unwrap_or(false)
    }
}
