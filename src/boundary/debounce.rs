//! Reset-on-each-event debounce.
//!
//! Every `touch` pushes the deadline out to `now + window`; there is never
//! more than one pending deadline.

use std::time::{Duration, Instant};

/// Default debounce window for boundary reclassification.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, deadline: None }
    }

    pub fn window(&self) -> Duration { self.window }
    pub fn deadline(&self) -> Option<Instant> { self.deadline }
    pub fn is_pending(&self) -> bool { self.deadline.is_some() }

    /// Record an event at `now`, replacing any pending deadline.
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
        tracing::trace!(window_ms = self.window.as_millis() as u64, "debounce reset");
    }

    /// Consume the pending deadline if it has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
