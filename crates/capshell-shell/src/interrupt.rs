//! Double-interrupt force-exit window.

use std::time::{Duration, Instant};

/// What an interrupt should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptOutcome {
    /// First interrupt: warn and arm the window.
    Warned,
    /// Second interrupt inside the window: terminate now.
    ForceExit,
}

/// Tracks whether an interrupt is pending. Time is passed in so the window
/// can be tested without sleeping.
#[derive(Debug, Clone)]
pub struct InterruptGuard {
    window: Duration,
    armed_at: Option<Instant>,
}

impl InterruptGuard {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            armed_at: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn is_armed(&self) -> bool {
        self.armed_at.is_some()
    }

    /// Register an interrupt at `now`.
    pub fn on_interrupt(&mut self, now: Instant) -> InterruptOutcome {
        match self.armed_at {
            Some(at) if now.saturating_duration_since(at) < self.window => {
                self.armed_at = None;
                InterruptOutcome::ForceExit
            },
            _ => {
                self.armed_at = Some(now);
                InterruptOutcome::Warned
            },
        }
    }

    /// Disarm if the window has elapsed. Returns true when this call
    /// disarmed it.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.deadline() {
            Some(deadline) if now >= deadline => {
                self.armed_at = None;
                true
            },
            _ => false,
        }
    }

    /// When the pending window closes.
    pub fn deadline(&self) -> Option<Instant> {
        self.armed_at.map(|at| at + self.window)
    }
}
