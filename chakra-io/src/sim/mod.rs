//! Simulated collaborators for the drive core.
//!
//! Every handle here is a cheap clone over shared state: one clone goes to
//! the drivetrain (behind the `hal` traits), another stays with
//! [`SimWorld`] or a test so it can move the ground truth.

mod context;
mod follower;
mod gyro;
pub mod noise;
mod vision;
mod wheel;
mod world;

pub use context::{ScriptedInput, SimMatch};
pub use follower::SimPathFollower;
pub use gyro::SimGyro;
pub use vision::{SimVision, SimVisionFrame};
pub use wheel::SimWheel;
pub use world::SimWorld;

use chakra_drive::field::Alliance;
use serde::{Deserialize, Serialize};

/// Simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Noise seed; 0 draws from entropy
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Alliance reported by the match context; unset means unknown
    #[serde(default)]
    pub alliance: Option<Alliance>,

    /// Starting slot 1-3; unset means unknown
    #[serde(default)]
    pub location: Option<u8>,

    /// Encoder slip as a fraction of distance rolled (1σ)
    #[serde(default = "default_wheel_slip")]
    pub wheel_slip_std: f64,

    /// Gyro drift per step (rad, 1σ)
    #[serde(default = "default_gyro_drift")]
    pub gyro_drift_std: f64,

    #[serde(default)]
    pub vision: SimVisionConfig,
}

fn default_seed() -> u64 {
    42
}
fn default_wheel_slip() -> f64 {
    0.01
}
fn default_gyro_drift() -> f64 {
    1e-5
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            alliance: None,
            location: None,
            wheel_slip_std: default_wheel_slip(),
            gyro_drift_std: default_gyro_drift(),
            vision: SimVisionConfig::default(),
        }
    }
}

/// Simulated camera
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimVisionConfig {
    #[serde(default = "default_vision_enabled")]
    pub enabled: bool,

    /// Speaker tags are seen within this distance (m)
    #[serde(default = "default_tag_range")]
    pub tag_range_m: f64,

    /// Capture-to-publish latency (s)
    #[serde(default = "default_latency")]
    pub latency_s: f64,

    /// Solved position noise (m, 1σ)
    #[serde(default = "default_xy_noise")]
    pub xy_noise_std: f64,

    /// Apparent tag area at 1 m (0..1)
    #[serde(default = "default_tag_area")]
    pub tag_area_at_1m: f64,

    /// Apparent game-piece area at 1 m (0..1)
    #[serde(default = "default_object_area")]
    pub object_area_at_1m: f64,
}

fn default_vision_enabled() -> bool {
    true
}
fn default_tag_range() -> f64 {
    4.0
}
fn default_latency() -> f64 {
    0.03
}
fn default_xy_noise() -> f64 {
    0.02
}
fn default_tag_area() -> f64 {
    0.05
}
fn default_object_area() -> f64 {
    0.12
}

impl Default for SimVisionConfig {
    fn default() -> Self {
        Self {
            enabled: default_vision_enabled(),
            tag_range_m: default_tag_range(),
            latency_s: default_latency(),
            xy_noise_std: default_xy_noise(),
            tag_area_at_1m: default_tag_area(),
            object_area_at_1m: default_object_area(),
        }
    }
}
