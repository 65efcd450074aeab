//! Drive to the alliance's line-up pose for a scoring element.
//!
//! Path following itself belongs to the [`PathFollower`] collaborator; this
//! command only picks the goal and owns the follow's lifetime.

use std::sync::Arc;

use super::{Command, stop_drive};
use crate::drivetrain::SharedDrive;
use crate::error::Result;
use crate::field::{LineUpTarget, line_up_pose};
use crate::hal::{AllianceProvider, PathConstraints, PathFollower};

pub struct PathfindLineUp {
    drive: SharedDrive,
    follower: Box<dyn PathFollower>,
    alliance: Arc<dyn AllianceProvider>,
    target: LineUpTarget,
    constraints: PathConstraints,
    path: Option<Box<dyn Command>>,
    skipped: bool,
}

impl PathfindLineUp {
    pub fn new(
        drive: SharedDrive,
        follower: Box<dyn PathFollower>,
        alliance: Arc<dyn AllianceProvider>,
        target: LineUpTarget,
        constraints: PathConstraints,
    ) -> Self {
        Self {
            drive,
            follower,
            alliance,
            target,
            constraints,
            path: None,
            skipped: false,
        }
    }
}

impl Command for PathfindLineUp {
    fn name(&self) -> &str {
        "PathfindLineUp"
    }

    fn initialize(&mut self) -> Result<()> {
        self.path = None;
        let Some(alliance) = self.alliance.alliance() else {
            log::warn!("PathfindLineUp: alliance unknown, skipping");
            self.skipped = true;
            return Ok(());
        };
        self.skipped = false;

        let goal = line_up_pose(alliance, self.target);
        log::info!(
            "PathfindLineUp: {:?} on {alliance} at ({:.2}, {:.2})",
            self.target,
            goal.x,
            goal.y
        );
        let mut path = self.follower.follow(goal, self.constraints)?;
        path.initialize()?;
        self.path = Some(path);
        Ok(())
    }

    fn execute(&mut self) -> Result<()> {
        match self.path.as_mut() {
            Some(path) => path.execute(),
            None => Ok(()),
        }
    }

    fn end(&mut self, interrupted: bool) {
        if let Some(mut path) = self.path.take() {
            path.end(interrupted);
        }
        stop_drive(&self.drive, "PathfindLineUp");
    }

    fn is_finished(&self) -> bool {
        self.skipped || self.path.as_ref().is_some_and(|p| p.is_finished())
    }
}
