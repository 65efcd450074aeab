//! Fixed-rate control tick.
//!
//! Each tick, in order:
//!
//! ```text
//! drain DriveRequests ─► drivetrain.periodic(now) ─► runner.tick()
//! ```
//!
//! Pose state is only written from here. Other threads ask for heading or
//! pose changes by sending a [`DriveRequest`].

use std::time::Duration;

use chakra_drive::{Pose2D, SharedDrive};
use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::error::Result;
use crate::runner::CommandRunner;

/// Pose changes requested from outside the tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriveRequest {
    ZeroHeading,
    /// Degrees
    SetHeading(f64),
    ResetPose(Pose2D),
    ResetTranslationToVision,
    ZeroDriveEncoders,
}

pub struct ControlLoop {
    drive: SharedDrive,
    runner: CommandRunner,
    requests_tx: Sender<DriveRequest>,
    requests_rx: Receiver<DriveRequest>,
    ticks: u64,
}

impl ControlLoop {
    pub fn new(drive: SharedDrive, period: Duration) -> Self {
        let (requests_tx, requests_rx) = crossbeam_channel::unbounded();
        Self {
            drive,
            runner: CommandRunner::new(period),
            requests_tx,
            requests_rx,
            ticks: 0,
        }
    }

    /// Handle for queueing requests from other threads.
    pub fn requests(&self) -> Sender<DriveRequest> {
        self.requests_tx.clone()
    }

    pub fn runner(&self) -> &CommandRunner {
        &self.runner
    }

    pub fn runner_mut(&mut self) -> &mut CommandRunner {
        &mut self.runner
    }

    pub fn drive(&self) -> &SharedDrive {
        &self.drive
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Run one control tick at `now_us`.
    ///
    /// On a drivetrain failure the active command is ended as interrupted
    /// (the modules are already stopped) and the error is returned.
    pub fn tick(&mut self, now_us: u64) -> Result<Pose2D> {
        self.ticks += 1;

        let pose = self.drain_requests().and_then(|()| Ok(self.drive.lock().periodic(now_us)?));
        let pose = match pose {
            Ok(pose) => pose,
            Err(e) => {
                self.runner.cancel();
                return Err(e);
            }
        };

        self.runner.tick()?;
        Ok(pose)
    }

    /// End the active command and stop the modules.
    pub fn shutdown(&mut self) -> Result<()> {
        self.runner.cancel();
        self.drive.lock().stop()?;
        log::info!("ControlLoop: stopped after {} ticks", self.ticks);
        Ok(())
    }

    fn drain_requests(&mut self) -> Result<()> {
        loop {
            let request = match self.requests_rx.try_recv() {
                Ok(request) => request,
                Err(TryRecvError::Empty) => return Ok(()),
                // We hold a sender ourselves
                Err(TryRecvError::Disconnected) => return Ok(()),
            };
            log::debug!("ControlLoop: applying {request:?}");
            let mut drive = self.drive.lock();
            match request {
                DriveRequest::ZeroHeading => drive.zero_heading()?,
                DriveRequest::SetHeading(deg) => drive.set_heading(deg)?,
                DriveRequest::ResetPose(pose) => drive.reset_pose(pose)?,
                DriveRequest::ResetTranslationToVision => {
                    if !drive.reset_translation_to_vision()? {
                        log::warn!("ControlLoop: no vision pose to reset to");
                    }
                }
                DriveRequest::ZeroDriveEncoders => drive.zero_drive_encoders()?,
            }
        }
    }
}
