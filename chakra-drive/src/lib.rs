//! # Chakra Drive
//!
//! Four-wheel swerve drive core: kinematics, discretization correction,
//! odometry and vision pose fusion, and closed-loop driving commands.
//!
//! ## Data flow
//!
//! ```text
//! wheel modules ─► inverse kinematics ─► odometry ─┐
//!                                                  ├─► PoseEstimator
//! vision frames ─► trust classification ───────────┘        │
//!                                                           ▼
//!                                       Orbit / CenterOnTarget commands
//!                                                           │
//!        wheel modules ◄─ desaturate ◄─ forward kinematics ◄─ dynamics correction
//! ```
//!
//! Hardware and services sit behind the traits in [`hal`]. Nothing here
//! spawns threads; the caller drives [`SwerveDrive::periodic`] and the
//! active [`Command`] once per control tick.
//!
//! ## Coordinate System
//!
//! - X: Forward (positive ahead of robot)
//! - Y: Left (positive to robot's left)
//! - Theta: Rotation in radians, CCW positive from +X axis, (-π, π]

// Foundation types and math
pub mod core;

// Chassis <-> wheel mapping
pub mod kinematics;

// One-step command correction
pub mod dynamics;

// Collaborator traits
pub mod hal;

// Single wheel module
pub mod module;

// Odometry + vision fusion
pub mod estimator;

// PID, slew limiting, deadband
pub mod control;

// Field constants
pub mod field;

// Swerve subsystem
pub mod drivetrain;

// Driving commands
pub mod commands;

pub mod config;
pub mod error;

pub use commands::{CenterOnTargetCommand, Command, OrbitCommand, PathfindLineUp};
pub use config::DriveConfig;
pub use crate::core::{ChassisVelocity, Pose2D, Translation2D, Twist2D, WheelPosition, WheelState};
pub use drivetrain::{SharedDrive, SwerveDrive};
pub use error::{Error, Result};
pub use estimator::{FusionOutcome, PoseEstimator};
pub use field::{Alliance, LineUpTarget, StartingLocation};
pub use kinematics::{MODULE_COUNT, SwerveKinematics};
