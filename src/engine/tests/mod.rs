//! Engine module tests
//!
//! Contains test suites for the engine surface:
//! - Firing literal and pattern definitions through simulated typing
//! - Mode handling (suspend, mute, buffer resets, observer updates)
//! - Timed typing with input lock and replay


use std::cell::RefCell;
use std::rc::Rc;

use crate::engine::buffer::BufferSnapshot;
use crate::host::EngineObserver;

/// Observer that records everything it is told
#[derive(Clone, Default)]
pub(super) struct Recorder {
    pub snapshots: Rc<RefCell<Vec<BufferSnapshot>>>,
    pub statuses: Rc<RefCell<Vec<String>>>,
}

impl Recorder {
    pub fn last_snapshot(&self) -> Option<BufferSnapshot> {
        self.snapshots.borrow().last().cloned()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.statuses.borrow().clone()
    }
}

impl EngineObserver for Recorder {
    fn buffer_changed(&mut self, snapshot: &BufferSnapshot) {
        self.snapshots.borrow_mut().push(snapshot.clone());
    }

    fn status_changed(&mut self, status: &str) {
        self.statuses.borrow_mut().push(status.to_string());
    }
}
