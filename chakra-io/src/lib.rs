//! # ChakraIO
//!
//! Simulated swerve hardware and the fixed-rate loop that drives the
//! `chakra-drive` core.
//!
//! ```text
//! SimWorld (ground truth) ─► SimWheel / SimGyro / SimVision
//!                                   │ hal traits
//!                                   ▼
//! DriveRequest ─► ControlLoop ─► SwerveDrive::periodic ─► CommandRunner
//!      ▲
//!      └── DeferredTask (zero heading after boot)
//! ```

pub mod config;
pub mod control_loop;
pub mod deferred;
pub mod error;
pub mod robot;
pub mod runner;
pub mod sim;

pub use config::AppConfig;
pub use control_loop::{ControlLoop, DriveRequest};
pub use deferred::{DeferredTask, TaskOutcome, zero_heading_after};
pub use error::{Error, Result};
pub use robot::SimRobot;
pub use runner::{CommandRunner, RunOutcome};
