//! Drive configuration.
//!
//! Loaded from TOML. Every field has a default, so a partial file (or none)
//! yields the competition robot's constants.
//!
//! ```toml
//! [geometry]
//! wheel_base = 0.5461
//! track_width = 0.5461
//!
//! [limits]
//! max_module_speed = 5.0
//! loop_period_s = 0.02
//!
//! [orbit.pid]
//! kp = 0.55
//! tolerance = 0.5
//! ```

use std::f64::consts::PI;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::commands::{CenterConfig, OrbitConfig};
use crate::error::{Error, Result};
use crate::estimator::EstimatorConfig;
use crate::hal::PathConstraints;

/// Top-level drive configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriveConfig {
    #[serde(default)]
    pub geometry: GeometryConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub orbit: OrbitConfig,
    #[serde(default)]
    pub center: CenterConfig,
    #[serde(default)]
    pub estimator: EstimatorConfig,
    #[serde(default)]
    pub pathfind: PathConstraints,
    #[serde(default)]
    pub startup: StartupConfig,
}

/// Chassis dimensions, wheel centre to wheel centre (metres).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryConfig {
    /// Front-to-back distance (21.5 in)
    #[serde(default = "default_wheel_base")]
    pub wheel_base: f64,
    /// Left-to-right distance (21.5 in)
    #[serde(default = "default_track_width")]
    pub track_width: f64,
}

fn default_wheel_base() -> f64 {
    0.5461
}
fn default_track_width() -> f64 {
    0.5461
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            wheel_base: default_wheel_base(),
            track_width: default_track_width(),
        }
    }
}

/// Speed ceilings and rate limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Hardware ceiling per wheel (m/s)
    #[serde(default = "default_max_module_speed")]
    pub max_module_speed: f64,
    /// Full stick maps to this many m/s
    #[serde(default = "default_drive_speed_coefficient")]
    pub drive_speed_coefficient: f64,
    /// Full turn output maps to this many rad/s
    #[serde(default = "default_turning_speed_coefficient")]
    pub turning_speed_coefficient: f64,
    /// Stick units per second
    #[serde(default = "default_drive_slew_rate")]
    pub drive_slew_rate: f64,
    /// Turn units per second
    #[serde(default = "default_turning_slew_rate")]
    pub turning_slew_rate: f64,
    /// Control tick (seconds)
    #[serde(default = "default_loop_period")]
    pub loop_period_s: f64,
}

fn default_max_module_speed() -> f64 {
    5.0
}
fn default_drive_speed_coefficient() -> f64 {
    4.0
}
fn default_turning_speed_coefficient() -> f64 {
    PI
}
fn default_drive_slew_rate() -> f64 {
    1.0
}
fn default_turning_slew_rate() -> f64 {
    PI
}
fn default_loop_period() -> f64 {
    0.02
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_module_speed: default_max_module_speed(),
            drive_speed_coefficient: default_drive_speed_coefficient(),
            turning_speed_coefficient: default_turning_speed_coefficient(),
            drive_slew_rate: default_drive_slew_rate(),
            turning_slew_rate: default_turning_slew_rate(),
            loop_period_s: default_loop_period(),
        }
    }
}

/// Driver stick shaping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_deadband")]
    pub deadband: f64,
    /// D-pad translation speed (m/s)
    #[serde(default = "default_dpad_speed")]
    pub dpad_speed: f64,
    #[serde(default = "default_enable_dpad")]
    pub enable_dpad: bool,
}

fn default_deadband() -> f64 {
    0.075
}
fn default_dpad_speed() -> f64 {
    0.25
}
fn default_enable_dpad() -> bool {
    true
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            deadband: default_deadband(),
            dpad_speed: default_dpad_speed(),
            enable_dpad: default_enable_dpad(),
        }
    }
}

fn default_pathfind() -> PathConstraints {
    PathConstraints {
        max_velocity: default_drive_speed_coefficient(),
        max_acceleration: default_drive_slew_rate(),
        max_angular_velocity: default_turning_speed_coefficient(),
        max_angular_acceleration: default_turning_slew_rate() / 3.0,
    }
}

impl Default for PathConstraints {
    fn default() -> Self {
        default_pathfind()
    }
}

/// One-shot actions after boot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupConfig {
    /// Delay before zeroing the heading, letting the gyro settle (ms)
    #[serde(default = "default_zero_heading_delay")]
    pub zero_heading_delay_ms: u64,
}

fn default_zero_heading_delay() -> u64 {
    1000
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            zero_heading_delay_ms: default_zero_heading_delay(),
        }
    }
}

impl DriveConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: DriveConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("geometry.wheel_base", self.geometry.wheel_base),
            ("geometry.track_width", self.geometry.track_width),
            ("limits.max_module_speed", self.limits.max_module_speed),
            ("limits.loop_period_s", self.limits.loop_period_s),
            ("limits.drive_slew_rate", self.limits.drive_slew_rate),
            ("limits.turning_slew_rate", self.limits.turning_slew_rate),
            ("center.slew_rate", self.center.slew_rate),
            ("estimator.history_window_s", self.estimator.history_window_s),
        ];
        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(Error::InvalidParameter(format!("{name} must be positive, got {value}")));
            }
        }
        if self.estimator.state_std_devs.iter().any(|s| s.is_nan() || *s < 0.0) {
            return Err(Error::InvalidParameter(
                "estimator.state_std_devs must be non-negative".into(),
            ));
        }
        Ok(())
    }
}
