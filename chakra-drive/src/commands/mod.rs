//! Closed-loop driving commands.
//!
//! A command is driven by an external periodic scheduler:
//!
//! ```text
//! initialize ─► execute ─► execute ─► … ─► end(interrupted)
//!                  └── is_finished() checked after each execute
//! ```
//!
//! `end` always stops actuation, whether the command finished or was
//! cancelled.

mod center;
mod line_up;
mod orbit;

pub use center::{CenterConfig, CenterOnTargetCommand, CenterState};
pub use line_up::PathfindLineUp;
pub use orbit::{OrbitCommand, OrbitConfig, OrbitState, dpad_translation};

use crate::drivetrain::SharedDrive;
use crate::error::Result;

/// A schedulable unit of robot behaviour.
pub trait Command: Send {
    fn name(&self) -> &str;

    fn initialize(&mut self) -> Result<()>;

    fn execute(&mut self) -> Result<()>;

    /// Called once when the command finishes or is interrupted.
    fn end(&mut self, interrupted: bool);

    fn is_finished(&self) -> bool;
}

/// Stop the drivetrain from an `end` handler, logging failures.
pub(crate) fn stop_drive(drive: &SharedDrive, who: &str) {
    if let Err(e) = drive.lock().stop() {
        log::error!("{who}: stop failed: {e}");
    }
}
