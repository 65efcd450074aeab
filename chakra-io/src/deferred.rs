//! One-shot background actions.
//!
//! A [`DeferredTask`] waits on its own named thread, runs once, and records
//! what happened in a slot the owner can poll. The control tick never waits
//! on it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use parking_lot::Mutex;

use crate::control_loop::DriveRequest;
use crate::error::{Error, Result};

/// Granularity of the shutdown check while waiting
const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Pending,
    Completed,
    Failed(String),
}

pub struct DeferredTask {
    name: String,
    outcome: Arc<Mutex<TaskOutcome>>,
    handle: Option<JoinHandle<()>>,
}

impl DeferredTask {
    /// Run `action` on a thread named `name` after `delay`.
    ///
    /// Setting `shutdown` during the delay abandons the task as failed.
    pub fn spawn<F>(name: &str, delay: Duration, shutdown: Arc<AtomicBool>, action: F) -> Result<Self>
    where
        F: FnOnce() -> std::result::Result<(), String> + Send + 'static,
    {
        let outcome = Arc::new(Mutex::new(TaskOutcome::Pending));
        let slot = Arc::clone(&outcome);
        let task = name.to_string();

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let result = if wait(delay, &shutdown) {
                    action()
                } else {
                    Err("cancelled by shutdown".to_string())
                };
                let done = match result {
                    Ok(()) => {
                        log::info!("DeferredTask: {task} completed");
                        TaskOutcome::Completed
                    }
                    Err(reason) => {
                        log::warn!("DeferredTask: {task} failed: {reason}");
                        TaskOutcome::Failed(reason)
                    }
                };
                *slot.lock() = done;
            })
            .map_err(|e| Error::Task(format!("failed to spawn {name}: {e}")))?;

        Ok(Self {
            name: name.to_string(),
            outcome,
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn outcome(&self) -> TaskOutcome {
        self.outcome.lock().clone()
    }

    /// Wait for the task and return its final outcome.
    pub fn join(mut self) -> TaskOutcome {
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            *self.outcome.lock() = TaskOutcome::Failed("task panicked".to_string());
        }
        self.outcome()
    }
}

/// Queue a heading zero once the gyro has had `delay` to settle.
pub fn zero_heading_after(
    delay: Duration,
    requests: Sender<DriveRequest>,
    shutdown: Arc<AtomicBool>,
) -> Result<DeferredTask> {
    DeferredTask::spawn("zero-heading", delay, shutdown, move || {
        requests
            .send(DriveRequest::ZeroHeading)
            .map_err(|_| "control loop is gone".to_string())
    })
}

/// Sleep until `delay` has passed. Returns false if shutdown came first.
fn wait(delay: Duration, shutdown: &AtomicBool) -> bool {
    let deadline = Instant::now() + delay;
    loop {
        if shutdown.load(Ordering::Relaxed) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep((deadline - now).min(POLL_INTERVAL));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_heading_is_queued() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let task = zero_heading_after(Duration::from_millis(5), tx, Arc::new(AtomicBool::new(false))).unwrap();
        assert_eq!(task.name(), "zero-heading");
        assert_eq!(task.join(), TaskOutcome::Completed);
        assert_eq!(rx.try_recv().unwrap(), DriveRequest::ZeroHeading);
    }

    #[test]
    fn test_closed_channel_fails() {
        let (tx, rx) = crossbeam_channel::unbounded();
        drop(rx);
        let task = zero_heading_after(Duration::ZERO, tx, Arc::new(AtomicBool::new(false))).unwrap();
        assert!(matches!(task.join(), TaskOutcome::Failed(_)));
    }

    #[test]
    fn test_shutdown_abandons_wait() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let shutdown = Arc::new(AtomicBool::new(false));
        let task = zero_heading_after(Duration::from_secs(60), tx, Arc::clone(&shutdown)).unwrap();
        assert_eq!(task.outcome(), TaskOutcome::Pending);
        shutdown.store(true, Ordering::Relaxed);
        assert_eq!(task.join(), TaskOutcome::Failed("cancelled by shutdown".to_string()));
        assert!(rx.try_recv().is_err());
    }
}
