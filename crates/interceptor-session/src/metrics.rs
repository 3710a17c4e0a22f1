//! Counters for persistence work that is deliberately kept out of the UI

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::SessionError;

#[derive(Debug, Default)]
pub struct PersistenceMetrics {
    writes: AtomicU64,
    skipped_saves: AtomicU64,
    coalesced_saves: AtomicU64,
    corrupt_reads: AtomicU64,
    read_failures: AtomicU64,
    write_failures: AtomicU64,
    invalid_urls: AtomicU64,
    restores: AtomicU64,
    restore_misses: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub writes: u64,
    pub skipped_saves: u64,
    pub coalesced_saves: u64,
    pub corrupt_reads: u64,
    pub read_failures: u64,
    pub write_failures: u64,
    pub invalid_urls: u64,
    pub restores: u64,
    pub restore_misses: u64,
}

impl MetricsSnapshot {
    /// Failures that were absorbed instead of surfaced
    pub fn suppressed_failures(&self) -> u64 {
        self.corrupt_reads + self.read_failures + self.write_failures + self.invalid_urls
    }
}

impl PersistenceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skip(&self) {
        self.skipped_saves.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_coalesced(&self) {
        self.coalesced_saves.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_corrupt_read(&self) {
        self.corrupt_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_read_failure(&self) {
        self.read_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_restore(&self) {
        self.restores.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_restore_miss(&self) {
        self.restore_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a failure raised while saving or restoring
    pub fn record_failure(&self, error: &SessionError) {
        let counter = match error {
            SessionError::InvalidUrl(_) => &self.invalid_urls,
            SessionError::Storage(_) | SessionError::Json(_) => &self.write_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            writes: self.writes.load(Ordering::Relaxed),
            skipped_saves: self.skipped_saves.load(Ordering::Relaxed),
            coalesced_saves: self.coalesced_saves.load(Ordering::Relaxed),
            corrupt_reads: self.corrupt_reads.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            invalid_urls: self.invalid_urls.load(Ordering::Relaxed),
            restores: self.restores.load(Ordering::Relaxed),
            restore_misses: self.restore_misses.load(Ordering::Relaxed),
        }
    }
}
