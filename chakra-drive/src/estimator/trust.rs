//! Vision trust classification.
//!
//! Decides how much a vision pose is worth before it reaches the filter.
//! Tiers are checked in order and the first match wins:
//!
//! | Tier     | Condition                                   | xy σ (m) | heading σ |
//! |----------|---------------------------------------------|----------|-----------|
//! | multi    | two or more tags                            | 0.5      | 6°        |
//! | large    | one tag, area > 0.8, within 0.5 m of estimate | 1.0    | 12°       |
//! | moderate | one tag, area > 0.1, within 0.3 m of estimate | 2.0    | 30°       |
//!
//! Anything else is rejected.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{Pose2D, Translation2D};
use crate::hal::{VisionPose, VisionSource};

/// Standard deviations attached to a vision observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisionStdDevs {
    /// Metres, applied to both x and y
    pub xy: f64,
    /// Radians
    pub heading: f64,
}

/// One single-tag trust tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SingleTagTier {
    /// Tag area must exceed this (0..1)
    pub min_area: f64,
    /// Estimate-to-observation distance must be below this (m)
    pub max_distance: f64,
    pub xy_std_dev: f64,
    pub heading_std_dev_deg: f64,
}

/// Trust tier thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustConfig {
    #[serde(default = "default_multi_tag_xy")]
    pub multi_tag_xy_std_dev: f64,
    #[serde(default = "default_multi_tag_heading")]
    pub multi_tag_heading_std_dev_deg: f64,
    #[serde(default = "default_large_tier")]
    pub large: SingleTagTier,
    #[serde(default = "default_moderate_tier")]
    pub moderate: SingleTagTier,
}

fn default_multi_tag_xy() -> f64 {
    0.5
}
fn default_multi_tag_heading() -> f64 {
    6.0
}
fn default_large_tier() -> SingleTagTier {
    SingleTagTier {
        min_area: 0.8,
        max_distance: 0.5,
        xy_std_dev: 1.0,
        heading_std_dev_deg: 12.0,
    }
}
fn default_moderate_tier() -> SingleTagTier {
    SingleTagTier {
        min_area: 0.1,
        max_distance: 0.3,
        xy_std_dev: 2.0,
        heading_std_dev_deg: 30.0,
    }
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            multi_tag_xy_std_dev: default_multi_tag_xy(),
            multi_tag_heading_std_dev_deg: default_multi_tag_heading(),
            large: default_large_tier(),
            moderate: default_moderate_tier(),
        }
    }
}

/// Snapshot of the vision collaborator taken at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VisionFrame {
    pub has_target: bool,
    pub tag_count: usize,
    pub tag_area: f64,
    pub estimate: Option<VisionPose>,
}

impl VisionFrame {
    pub fn capture(source: &dyn VisionSource) -> Self {
        Self {
            has_target: source.has_target(),
            tag_count: source.target_count(),
            tag_area: source.target_area(),
            estimate: source.pose_estimate(),
        }
    }
}

/// Why an observation was not fused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NoTarget,
    /// Empty, zeroed or non-finite pose
    Malformed,
    /// Failed every trust tier
    Untrusted,
    /// Timestamp older than the pose history
    OutsideHistory,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectReason::NoTarget => "no target",
            RejectReason::Malformed => "malformed pose",
            RejectReason::Untrusted => "no trust tier matched",
            RejectReason::OutsideHistory => "older than pose history",
        };
        f.write_str(s)
    }
}

/// Check a frame and pick its trust tier.
///
/// `current` is the present pose estimate, used for the agreement check.
pub fn classify(
    frame: &VisionFrame,
    current: &Pose2D,
    config: &TrustConfig,
) -> Result<(VisionPose, VisionStdDevs), RejectReason> {
    if !frame.has_target {
        return Err(RejectReason::NoTarget);
    }
    let estimate = frame.estimate.ok_or(RejectReason::Malformed)?;
    let pose = estimate.pose;
    // An empty solve is published as zeros
    if pose.x == 0.0
        || !pose.x.is_finite()
        || !pose.y.is_finite()
        || !pose.theta.is_finite()
        || !estimate.latency_s.is_finite()
        || estimate.latency_s < 0.0
    {
        return Err(RejectReason::Malformed);
    }
    // A target with no tags behind it carries no fiducial solve
    if frame.tag_count == 0 {
        return Err(RejectReason::Untrusted);
    }

    let std_devs = if frame.tag_count >= 2 {
        VisionStdDevs {
            xy: config.multi_tag_xy_std_dev,
            heading: config.multi_tag_heading_std_dev_deg.to_radians(),
        }
    } else {
        let distance = current.translation().distance(&Translation2D::new(pose.x, pose.y));
        let tier = [&config.large, &config.moderate]
            .into_iter()
            .find(|t| frame.tag_area > t.min_area && distance < t.max_distance)
            .ok_or(RejectReason::Untrusted)?;
        VisionStdDevs {
            xy: tier.xy_std_dev,
            heading: tier.heading_std_dev_deg.to_radians(),
        }
    };

    Ok((estimate, std_devs))
}
