//! Per-session inactivity timer.
//!
//! The monitor holds at most one pending deadline. Every user-originated
//! event calls [`InactivityMonitor::reset`], which supersedes the previous
//! deadline. The owner polls [`InactivityMonitor::is_expired`] (or sleeps
//! until [`InactivityMonitor::deadline`]) and runs the session reset path.
//!
//! Times are `tokio::time::Instant` so paused-clock tests drive it.

use std::time::Duration;

use tokio::time::Instant;

/// Cancel-and-reschedule idle timer owned by one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InactivityMonitor {
    timeout: Duration,
    deadline: Option<Instant>,
}

impl InactivityMonitor {
    /// A disarmed monitor with the given idle period.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
        }
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Record activity at `now`, replacing any pending deadline.
    ///
    /// A timeout too long to represent as an instant never expires.
    pub fn reset(&mut self, now: Instant) {
        self.deadline = now.checked_add(self.timeout);
    }

    /// Drop the pending deadline. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Whether the pending deadline has passed.
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }
}
