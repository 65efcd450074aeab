//! Simulated AprilTag camera.
//!
//! The world publishes a frame each tick from the true pose; the control
//! loop reads it through [`VisionSource`].

use std::sync::Arc;

use chakra_drive::Pose2D;
use chakra_drive::hal::{VisionPose, VisionSource};
use parking_lot::RwLock;

/// What the camera currently sees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimVisionFrame {
    pub tag_count: usize,
    /// 0..1
    pub area: f64,
    pub pose: Option<Pose2D>,
    pub latency_s: f64,
}

#[derive(Clone, Default)]
pub struct SimVision {
    frame: Arc<RwLock<SimVisionFrame>>,
}

impl SimVision {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, frame: SimVisionFrame) {
        *self.frame.write() = frame;
    }

    pub fn clear(&self) {
        *self.frame.write() = SimVisionFrame::default();
    }
}

impl VisionSource for SimVision {
    fn has_target(&self) -> bool {
        let f = self.frame.read();
        f.tag_count > 0 || f.area > 0.0
    }

    fn target_count(&self) -> usize {
        self.frame.read().tag_count
    }

    fn target_area(&self) -> f64 {
        self.frame.read().area
    }

    fn pose_estimate(&self) -> Option<VisionPose> {
        let f = self.frame.read();
        f.pose.map(|pose| VisionPose {
            pose,
            latency_s: f.latency_s,
        })
    }
}
