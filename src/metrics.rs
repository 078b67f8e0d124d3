use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for the progress pipeline, cheap enough to bump per event.
// No Instant here: std::time is unavailable on wasm32-unknown-unknown.
#[derive(Clone)]
pub struct Metrics {
    pub events_received: Arc<AtomicU64>,
    pub events_malformed: Arc<AtomicU64>,
    pub updates_superseded: Arc<AtomicU64>,
    pub flushes: Arc<AtomicU64>,
    pub rows_rebuilt: Arc<AtomicU64>,
    pub rows_updated: Arc<AtomicU64>,
    pub connections_opened: Arc<AtomicU64>,
    pub connections_closed: Arc<AtomicU64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            events_received: Arc::new(AtomicU64::new(0)),
            events_malformed: Arc::new(AtomicU64::new(0)),
            updates_superseded: Arc::new(AtomicU64::new(0)),
            flushes: Arc::new(AtomicU64::new(0)),
            rows_rebuilt: Arc::new(AtomicU64::new(0)),
            rows_updated: Arc::new(AtomicU64::new(0)),
            connections_opened: Arc::new(AtomicU64::new(0)),
            connections_closed: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn inc_events(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_malformed(&self) {
        self.events_malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_superseded(&self) {
        self.updates_superseded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_flushes(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_rebuilt(&self, count: u64) {
        self.rows_rebuilt.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_updated(&self, count: u64) {
        self.rows_updated.fetch_add(count, Ordering::Relaxed);
    }

    pub fn inc_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_closed(&self) {
        self.connections_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_received: self.events_received.load(Ordering::Relaxed),
            events_malformed: self.events_malformed.load(Ordering::Relaxed),
            updates_superseded: self.updates_superseded.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
            rows_rebuilt: self.rows_rebuilt.load(Ordering::Relaxed),
            rows_updated: self.rows_updated.load(Ordering::Relaxed),
            connections_opened: self.connections_opened.load(Ordering::Relaxed),
            connections_closed: self.connections_closed.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub events_received: u64,
    pub events_malformed: u64,
    pub updates_superseded: u64,
    pub flushes: u64,
    pub rows_rebuilt: u64,
    pub rows_updated: u64,
    pub connections_opened: u64,
    pub connections_closed: u64,
}
