//! Named Cache Module
//!
//! One keyed result cache per (entity type, operation) pair. Lookups and
//! computes go through `get_or_compute`, which collapses concurrent
//! computes for the same key to a single in-flight call.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

use crate::cache::entry::CacheEntry;
use crate::cache::stats::{CacheStats, StatRecorder};
use crate::error::Result;

// == Named Cache ==
/// Keyed cache for one operation's results, stored as canonical JSON.
#[derive(Debug)]
pub struct NamedCache {
    /// Fully qualified name, `"<entity>:<operation>"`
    name: String,
    /// Key-value storage
    entries: RwLock<HashMap<String, CacheEntry>>,
    /// Per-key gates serializing concurrent computes
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    /// Performance counters
    stats: StatRecorder,
}

impl NamedCache {
    // == Constructor ==
    /// Creates an empty named cache.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            stats: StatRecorder::default(),
        }
    }

    /// The cache's fully qualified name.
    pub fn name(&self) -> &str {
        &self.name
    }

    async fn peek(&self, key: &str) -> Option<Value> {
        self.entries.read().await.get(key).map(|e| e.value.clone())
    }

    // == Get Or Compute ==
    /// Returns the cached value for `key`, or invokes `compute`, stores its
    /// result, and returns it.
    ///
    /// Concurrent calls for the same key collapse to one compute: the first
    /// caller holds the key's gate while computing, later callers wait and
    /// then re-check the cache. A failed compute stores nothing, and a
    /// cancelled compute leaves only an unlocked gate behind, so the next
    /// lookup is an ordinary miss.
    pub async fn get_or_compute<F, Fut>(&self, key: &str, compute: F) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        if let Some(value) = self.peek(key).await {
            self.stats.record_hit();
            return Ok(value);
        }

        let gate = {
            let mut in_flight = self.in_flight.lock().await;
            Arc::clone(in_flight.entry(key.to_string()).or_default())
        };
        let _leader = gate.lock().await;

        // Another caller may have finished the compute while we waited.
        if let Some(value) = self.peek(key).await {
            self.stats.record_hit();
            return Ok(value);
        }
        self.stats.record_miss();

        let value = match compute().await {
            Ok(value) => value,
            Err(err) => {
                self.in_flight.lock().await.remove(key);
                return Err(err);
            }
        };

        {
            let mut entries = self.entries.write().await;
            entries.insert(key.to_string(), CacheEntry::new(value.clone()));
        }
        // Only drop the gate once the entry is visible, so a caller arriving
        // between compute and insert still waits and then hits.
        self.in_flight.lock().await.remove(key);
        Ok(value)
    }

    // == Point Invalidation ==
    /// Removes a single entry; no-op when absent. Returns whether an entry
    /// was removed.
    pub async fn invalidate(&self, key: &str) -> bool {
        let removed = self.entries.write().await.remove(key).is_some();
        if removed {
            self.stats.record_invalidated(1);
        }
        removed
    }

    // == Full Invalidation ==
    /// Clears every entry; returns the number removed.
    pub async fn invalidate_all(&self) -> usize {
        let mut entries = self.entries.write().await;
        let count = entries.len();
        entries.clear();
        self.stats.record_invalidated(count as u64);
        count
    }

    // == Length ==
    /// Current number of entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True when the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    // == Stats ==
    /// Snapshot of the cache's counters and entry count.
    pub async fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.len().await)
    }
}
