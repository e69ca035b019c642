//! Cache Statistics Module
//!
//! Tracks per-cache performance metrics: hits, misses, and invalidated
//! entries. Counters are atomic so the read path never takes a lock for
//! bookkeeping.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Stat Recorder ==
/// Internal atomic counters owned by a named cache.
#[derive(Debug, Default)]
pub(crate) struct StatRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    invalidated: AtomicU64,
}

impl StatRecorder {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_invalidated(&self, count: u64) {
        self.invalidated.fetch_add(count, Ordering::Relaxed);
    }

    /// Snapshot with the current entry count filled in.
    pub(crate) fn snapshot(&self, entries: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalidated: self.invalidated.load(Ordering::Relaxed),
            entries,
        }
    }
}

// == Cache Stats ==
/// Point-in-time snapshot of a named cache's metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of lookups served from the cache
    pub hits: u64,
    /// Number of lookups that fell through to a compute
    pub misses: u64,
    /// Number of entries removed by point or sweep invalidation
    pub invalidated: u64,
    /// Current number of entries
    pub entries: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// hits / (hits + misses), or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_starts_at_zero() {
        let recorder = StatRecorder::default();
        let stats = recorder.snapshot(0);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.invalidated, 0);
        assert_eq!(stats.entries, 0);
    }

    #[test]
    fn test_hit_rate_no_lookups() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let recorder = StatRecorder::default();
        recorder.record_hit();
        recorder.record_miss();
        assert_eq!(recorder.snapshot(1).hit_rate(), 0.5);
    }

    #[test]
    fn test_invalidated_accumulates() {
        let recorder = StatRecorder::default();
        recorder.record_invalidated(3);
        recorder.record_invalidated(2);
        assert_eq!(recorder.snapshot(0).invalidated, 5);
    }
}
