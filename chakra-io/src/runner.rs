//! Periodic command runner.
//!
//! Holds at most one active command and drives its lifecycle once per tick:
//! `initialize` on schedule, then `execute` each tick until `is_finished`,
//! a timeout, a cancel, or an error ends it.

use std::time::Duration;

use chakra_drive::Command;

use crate::error::Result;

struct Active {
    command: Box<dyn Command>,
    /// Ticks left before a forced end
    remaining: Option<u64>,
}

/// How the last command ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Finished(String),
    TimedOut(String),
    Cancelled(String),
}

pub struct CommandRunner {
    period: Duration,
    active: Option<Active>,
    last_outcome: Option<RunOutcome>,
}

impl CommandRunner {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            active: None,
            last_outcome: None,
        }
    }

    /// Start `command`, interrupting whatever is running.
    ///
    /// If `initialize` fails the command is ended as interrupted and the
    /// error is returned.
    pub fn schedule(&mut self, mut command: Box<dyn Command>, timeout: Option<Duration>) -> Result<()> {
        self.cancel();
        log::info!("CommandRunner: scheduling {}", command.name());
        if let Err(e) = command.initialize() {
            command.end(true);
            return Err(e.into());
        }
        let period = self.period.as_nanos().max(1);
        let remaining = timeout.map(|t| t.as_nanos().div_ceil(period).max(1) as u64);
        self.active = Some(Active { command, remaining });
        Ok(())
    }

    /// Run one tick of the active command.
    pub fn tick(&mut self) -> Result<()> {
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };

        if let Err(e) = active.command.execute() {
            log::error!("CommandRunner: {} failed: {e}", active.command.name());
            self.cancel();
            return Err(e.into());
        }

        if active.command.is_finished() {
            self.finish(false, RunOutcome::Finished);
            return Ok(());
        }

        if let Some(remaining) = active.remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                log::warn!("CommandRunner: {} timed out", active.command.name());
                self.finish(true, RunOutcome::TimedOut);
            }
        }
        Ok(())
    }

    /// End the active command as interrupted.
    pub fn cancel(&mut self) {
        if self.active.is_some() {
            self.finish(true, RunOutcome::Cancelled);
        }
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.command.name())
    }

    pub fn last_outcome(&self) -> Option<&RunOutcome> {
        self.last_outcome.as_ref()
    }

    fn finish(&mut self, interrupted: bool, outcome: fn(String) -> RunOutcome) {
        if let Some(mut active) = self.active.take() {
            active.command.end(interrupted);
            let name = active.command.name().to_string();
            log::debug!("CommandRunner: {name} ended (interrupted={interrupted})");
            self.last_outcome = Some(outcome(name));
        }
    }
}
