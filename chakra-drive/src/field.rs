//! Field constants: alliance, starting poses, orbit points, line-up poses.
//!
//! Coordinates are metres in the blue-origin field frame.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{Pose2D, Translation2D};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alliance {
    Red,
    Blue,
}

impl fmt::Display for Alliance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alliance::Red => write!(f, "red"),
            Alliance::Blue => write!(f, "blue"),
        }
    }
}

/// Driver station slot the robot starts in front of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StartingLocation {
    One,
    Two,
    Three,
}

impl StartingLocation {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            _ => None,
        }
    }
}

/// Scoring element a line-up drives to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineUpTarget {
    Amp,
    Speaker,
}

/// Pose at match start.
///
/// Unknown alliance or location falls back to the origin.
pub fn starting_pose(alliance: Option<Alliance>, location: Option<StartingLocation>) -> Pose2D {
    use StartingLocation::*;
    match (alliance, location) {
        (Some(Alliance::Blue), Some(One)) => Pose2D::from_degrees(0.69, 4.40, 120.0),
        (Some(Alliance::Blue), Some(Two)) => Pose2D::from_degrees(1.34, 5.55, 0.0),
        (Some(Alliance::Blue), Some(Three)) => Pose2D::from_degrees(0.69, 6.69, -120.0),
        (Some(Alliance::Red), Some(One)) => Pose2D::from_degrees(15.85, 4.40, -120.0),
        (Some(Alliance::Red), Some(Two)) => Pose2D::from_degrees(15.2, 5.55, 0.0),
        (Some(Alliance::Red), Some(Three)) => Pose2D::from_degrees(15.85, 6.69, 120.0),
        _ => Pose2D::identity(),
    }
}

/// Field point the orbit command keeps the robot facing.
pub fn orbit_point(alliance: Alliance) -> Translation2D {
    match alliance {
        Alliance::Red => Translation2D::new(16.5, 5.55),
        Alliance::Blue => Translation2D::new(0.0, 5.55),
    }
}

/// Pose to line up at in front of a scoring element.
pub fn line_up_pose(alliance: Alliance, target: LineUpTarget) -> Pose2D {
    match (alliance, target) {
        (Alliance::Blue, LineUpTarget::Amp) => Pose2D::from_degrees(1.34, 5.55, 180.0),
        (Alliance::Blue, LineUpTarget::Speaker) => Pose2D::from_degrees(1.8, 7.66, 90.0),
        (Alliance::Red, LineUpTarget::Amp) => Pose2D::from_degrees(14.7, 7.66, -90.0),
        (Alliance::Red, LineUpTarget::Speaker) => Pose2D::from_degrees(15.2, 5.55, 180.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unknown_context_starts_at_origin() {
        assert_eq!(starting_pose(None, Some(StartingLocation::One)), Pose2D::identity());
        assert_eq!(starting_pose(Some(Alliance::Red), None), Pose2D::identity());
        assert_eq!(starting_pose(None, None), Pose2D::identity());
    }

    #[test]
    fn test_starting_pose_red_one() {
        let p = starting_pose(Some(Alliance::Red), Some(StartingLocation::One));
        assert_relative_eq!(p.x, 15.85);
        assert_relative_eq!(p.y, 4.40);
        assert_relative_eq!(p.theta, (-120f64).to_radians(), epsilon = 1e-12);
    }

    #[test]
    fn test_starting_location_from_index() {
        assert_eq!(StartingLocation::from_index(2), Some(StartingLocation::Two));
        assert_eq!(StartingLocation::from_index(0), None);
        assert_eq!(StartingLocation::from_index(4), None);
    }

    #[test]
    fn test_orbit_points_mirror() {
        let red = orbit_point(Alliance::Red);
        let blue = orbit_point(Alliance::Blue);
        assert_relative_eq!(red.y, blue.y);
        assert!(red.x > blue.x);
    }
}
