//! Counters for the background workers
//!
//! Independent counters, so `Relaxed` ordering throughout. Read them through
//! [`WorkerMetrics::snapshot`].

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters shared between a worker handle and its task
#[derive(Debug, Default)]
pub struct WorkerMetrics {
    events_received: AtomicU64,
    events_ignored: AtomicU64,
    events_forwarded: AtomicU64,
    recomputes: AtomicU64,
    recompute_failures: AtomicU64,
}

/// Point-in-time copy of [`WorkerMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerMetricsSnapshot {
    pub events_received: u64,
    pub events_ignored: u64,
    pub events_forwarded: u64,
    pub recomputes: u64,
    pub recompute_failures: u64,
}

impl WorkerMetrics {
    /// Counters starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one received store event.
    pub fn record_event(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Event received but not acted upon (e.g. engine output on `places`).
    pub fn record_ignored(&self) {
        self.events_ignored.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one event handed to the presenter.
    pub fn record_forwarded(&self) {
        self.events_forwarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one recompute run and whether it succeeded.
    pub fn record_recompute(&self, succeeded: bool) {
        self.recomputes.fetch_add(1, Ordering::Relaxed);
        if !succeeded {
            self.recompute_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> WorkerMetricsSnapshot {
        WorkerMetricsSnapshot {
            events_received: self.events_received.load(Ordering::Relaxed),
            events_ignored: self.events_ignored.load(Ordering::Relaxed),
            events_forwarded: self.events_forwarded.load(Ordering::Relaxed),
            recomputes: self.recomputes.load(Ordering::Relaxed),
            recompute_failures: self.recompute_failures.load(Ordering::Relaxed),
        }
    }
}
