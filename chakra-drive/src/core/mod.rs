//! Foundation types and math (no internal dependencies).

pub mod math;
pub mod types;

pub use types::{ChassisVelocity, Pose2D, Timestamped, Translation2D, Twist2D, WheelPosition, WheelState};
