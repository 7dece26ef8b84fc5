//! Coalesces bursts of input into a single action after a quiet period.

use std::time::Duration;

use crate::capabilities::{Timer, TimerId};

/// Holds at most one pending timer. Scheduling again cancels the pending one,
/// so only the last call in a burst ever fires.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Debouncer {
    pending: Option<TimerId>,
}

impl Debouncer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule<Ev, F>(&mut self, timer: &Timer<Ev>, delay: Duration, callback: F) -> TimerId
    where
        Ev: Send + 'static,
        F: FnOnce(TimerId) -> Ev + Send + 'static,
    {
        if let Some(previous) = self.pending.take() {
            timer.cancel(previous);
        }
        let id = timer.start(delay, callback);
        self.pending = Some(id);
        id
    }

    /// Accepts a fired timer only if it is the pending one.
    pub fn settle(&mut self, id: TimerId) -> bool {
        if self.pending == Some(id) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn cancel<Ev>(&mut self, timer: &Timer<Ev>)
    where
        Ev: Send + 'static,
    {
        if let Some(previous) = self.pending.take() {
            timer.cancel(previous);
        }
    }

    #[must_use]
    pub fn pending(&self) -> Option<TimerId> {
        self.pending
    }
}
