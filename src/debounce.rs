//! Trailing-edge debouncing for high-frequency triggers.
//!
//! Every trigger restarts the quiet period; the action fires once the
//! triggers have stopped for `delay`. Time is passed in explicitly so the
//! state machine can be driven by a real clock or by tests.

use std::time::{Duration, Instant};

pub const DEFAULT_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    last_trigger: Option<Instant>,
    coalesced: usize,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_trigger: None,
            coalesced: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a trigger at `now`, restarting the quiet period.
    pub fn trigger(&mut self, now: Instant) {
        self.last_trigger = Some(now);
        self.coalesced += 1;
    }

    pub fn is_pending(&self) -> bool {
        self.last_trigger.is_some()
    }

    /// When the pending action becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.last_trigger.map(|t| t + self.delay)
    }

    /// Returns the number of triggers coalesced into this firing if the
    /// action is due at `now`, clearing the pending state.
    pub fn fire(&mut self, now: Instant) -> Option<usize> {
        let deadline = self.deadline()?;
        if now < deadline {
            return None;
        }
        self.last_trigger = None;
        let count = self.coalesced;
        self.coalesced = 0;
        tracing::trace!(coalesced = count, "debounced action due");
        Some(count)
    }
}
