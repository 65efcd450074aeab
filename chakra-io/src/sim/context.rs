//! Scripted match context and driver controls.

use std::sync::Arc;

use chakra_drive::field::{Alliance, StartingLocation};
use chakra_drive::hal::{AllianceProvider, DriverInput, DriverInputSource};
use parking_lot::RwLock;

/// Alliance and starting slot, changeable at runtime.
#[derive(Clone, Default)]
pub struct SimMatch {
    inner: Arc<RwLock<(Option<Alliance>, Option<StartingLocation>)>>,
}

impl SimMatch {
    pub fn new(alliance: Option<Alliance>, location: Option<StartingLocation>) -> Self {
        Self {
            inner: Arc::new(RwLock::new((alliance, location))),
        }
    }

    pub fn set_alliance(&self, alliance: Option<Alliance>) {
        self.inner.write().0 = alliance;
    }
}

impl AllianceProvider for SimMatch {
    fn alliance(&self) -> Option<Alliance> {
        self.inner.read().0
    }

    fn starting_location(&self) -> Option<StartingLocation> {
        self.inner.read().1
    }
}

/// Driver controls set by a script or test.
#[derive(Clone, Default)]
pub struct ScriptedInput {
    input: Arc<RwLock<DriverInput>>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, input: DriverInput) {
        *self.input.write() = input;
    }
}

impl DriverInputSource for ScriptedInput {
    fn read(&self) -> DriverInput {
        *self.input.read()
    }
}
