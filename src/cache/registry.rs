//! Cache Registry Module
//!
//! All named caches belonging to one entity type. The owning service
//! registers a cache per operation; the registry is what write paths and
//! the scheduled sweep enumerate, so a cache that is registered is
//! automatically covered by both.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::cache::named::NamedCache;
use crate::cache::stats::CacheStats;

// == Cache Registry ==
/// Registry of named caches for a single entity type.
///
/// Cache names are prefixed with the entity type, so two entity types
/// never share a cache instance even for the same operation name.
#[derive(Debug)]
pub struct CacheRegistry {
    entity_type: &'static str,
    caches: RwLock<HashMap<String, Arc<NamedCache>>>,
}

impl CacheRegistry {
    // == Constructor ==
    /// Creates an empty registry for the given entity type.
    pub fn new(entity_type: &'static str) -> Self {
        Self {
            entity_type,
            caches: RwLock::new(HashMap::new()),
        }
    }

    /// The entity type this registry belongs to.
    pub fn entity_type(&self) -> &'static str {
        self.entity_type
    }

    // == Register ==
    /// Returns the cache for the named operation, creating it on first use.
    ///
    /// Idempotent: repeated registration of the same operation returns the
    /// same instance.
    pub fn register(&self, operation: &str) -> Arc<NamedCache> {
        let name = format!("{}:{}", self.entity_type, operation);
        if let Ok(caches) = self.caches.read() {
            if let Some(cache) = caches.get(&name) {
                return Arc::clone(cache);
            }
        }
        let mut caches = match self.caches.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(
            caches
                .entry(name.clone())
                .or_insert_with(|| Arc::new(NamedCache::new(name))),
        )
    }

    /// Looks up a registered operation's cache.
    pub fn get(&self, operation: &str) -> Option<Arc<NamedCache>> {
        let name = format!("{}:{}", self.entity_type, operation);
        self.caches
            .read()
            .ok()
            .and_then(|caches| caches.get(&name).map(Arc::clone))
    }

    // == Enumeration ==
    /// Every registered cache, for write-path invalidation and the sweep.
    pub fn caches(&self) -> Vec<Arc<NamedCache>> {
        match self.caches.read() {
            Ok(caches) => caches.values().map(Arc::clone).collect(),
            Err(poisoned) => poisoned.into_inner().values().map(Arc::clone).collect(),
        }
    }

    /// The fully qualified names of every registered cache, sorted.
    pub fn cache_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .caches()
            .iter()
            .map(|cache| cache.name().to_string())
            .collect();
        names.sort();
        names
    }

    // == Full Invalidation ==
    /// Clears every registered cache; returns total entries removed.
    pub async fn invalidate_entity(&self) -> usize {
        let mut removed = 0;
        for cache in self.caches() {
            let count = cache.invalidate_all().await;
            if count > 0 {
                debug!(cache = cache.name(), removed = count, "cache invalidated");
            }
            removed += count;
        }
        removed
    }

    // == Stats ==
    /// Snapshot of every registered cache's metrics, keyed by cache name.
    pub async fn stats(&self) -> Vec<(String, CacheStats)> {
        let mut all = Vec::new();
        for cache in self.caches() {
            all.push((cache.name().to_string(), cache.stats().await));
        }
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }
}
