//! Debounced scan scheduling
//!
//! Triggers inside an open window are coalesced into the scan already scheduled. The
//! scan reads settings and the document when it fires, never when it was requested.

use std::time::Duration;
use tokio::time::Instant;

pub struct ScanScheduler {
    delay: Duration,
    deadline: Option<Instant>,
    coalesced: usize,
}

impl ScanScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
            coalesced: 0,
        }
    }

    /// Request a scan. Returns false if one was already pending.
    pub fn schedule(&mut self, now: Instant) -> bool {
        if self.deadline.is_some() {
            self.coalesced += 1;
            tracing::trace!("Scan already pending, coalescing trigger");
            return false;
        }

        self.deadline = Some(now + self.delay);
        true
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Clear and report the pending scan if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Triggers absorbed by an already pending scan since startup.
    pub fn coalesced(&self) -> usize {
        self.coalesced
    }
}
