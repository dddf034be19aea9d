//! Save scheduling
//!
//! The scheduler owns no timer. The store reports write requests and asks
//! [`SaveScheduler::due`] whenever it gets a chance (`tick`), which keeps the
//! whole thing deterministic under a [`ManualClock`](super::ManualClock).

use chrono::{DateTime, Duration, Utc};

/// Why a flush happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReason {
    /// The debounce window after the first pending write closed
    Debounce,
    /// The periodic safety-net interval elapsed
    Autosave,
}

/// Coalesces bursts of writes into one flush
#[derive(Debug, Clone)]
pub struct SaveScheduler {
    debounce: Duration,
    autosave_interval: Option<Duration>,
    queue: Vec<DateTime<Utc>>,
    deadline: Option<DateTime<Utc>>,
    last_flush: Option<DateTime<Utc>>,
}

impl SaveScheduler {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            autosave_interval: None,
            queue: Vec::new(),
            deadline: None,
            last_flush: None,
        }
    }

    /// Enable (`Some`) or disable (`None`) the periodic flush
    ///
    /// The interval is measured from `now` when nothing was flushed yet.
    pub fn set_autosave(&mut self, interval: Option<Duration>, now: DateTime<Utc>) {
        self.autosave_interval = interval;
        if interval.is_some() && self.last_flush.is_none() {
            self.last_flush = Some(now);
        }
    }

    pub fn autosave_enabled(&self) -> bool {
        self.autosave_interval.is_some()
    }

    /// Record a write request; arms the deadline if the queue was empty
    pub fn request(&mut self, now: DateTime<Utc>) {
        if self.queue.is_empty() {
            self.deadline = Some(now + self.debounce);
        }
        self.queue.push(now);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Whether a flush should happen at `now`
    pub fn due(&self, now: DateTime<Utc>) -> Option<FlushReason> {
        if let Some(deadline) = self.deadline {
            if now >= deadline && !self.queue.is_empty() {
                return Some(FlushReason::Debounce);
            }
        }

        match (self.autosave_interval, self.last_flush) {
            (Some(interval), Some(last)) if now - last >= interval => Some(FlushReason::Autosave),
            _ => None,
        }
    }

    /// Clear the queue after a flush (or a forced save)
    pub fn mark_flushed(&mut self, now: DateTime<Utc>) {
        self.queue.clear();
        self.deadline = None;
        self.last_flush = Some(now);
    }
}
