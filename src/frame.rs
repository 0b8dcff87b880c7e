//! Scheduling state of a redraw loop driven by animation-frame callbacks.

use std::cell::Cell;

/// Tracks whether a loop should keep drawing and whether a frame callback is
/// already queued.
///
/// A loop owns exactly one callback. Stopping only clears `running`; the
/// queued callback sees that and lets the loop lapse. Starting again while a
/// callback is still queued reuses it instead of queueing a second one, so at
/// most one `update` runs per frame.
#[derive(Debug, Default)]
pub struct FrameSchedule {
    running: Cell<bool>,
    pending: Cell<bool>,
}

impl FrameSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the loop. Returns whether the caller must queue a callback.
    pub fn start(&self) -> bool {
        self.running.set(true);
        if self.pending.get() {
            return false;
        }
        self.pending.set(true);
        true
    }

    pub fn stop(&self) {
        self.running.set(false);
    }

    /// Enter a frame callback. Returns whether to draw and queue the next
    /// callback.
    pub fn tick(&self) -> bool {
        self.pending.set(false);
        if !self.running.get() {
            return false;
        }
        self.pending.set(true);
        true
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }
}
