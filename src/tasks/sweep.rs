//! Cache Sweep Task
//!
//! Background task that periodically performs a full invalidation of every
//! named cache registered for one entity type. The sweep is the
//! correctness backstop: even when a write path misses a cache it
//! populated, staleness is bounded by one sweep period.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheRegistry;

/// Spawns a background task that periodically clears every cache in the
/// registry.
///
/// The task runs in an infinite loop, sleeping for the configured interval
/// between sweeps. Each registered cache is cleared independently, so one
/// cache's sweep never prevents the others from running.
///
/// # Arguments
/// * `registry` - The entity type's cache registry
/// * `interval` - Time between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let config = Config::from_env();
/// let service: Service<Product> = Service::with_config(store, &config);
/// let sweep_handle = spawn_sweep_task(Arc::clone(service.registry()), config.sweep_period());
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(registry: Arc<CacheRegistry>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            entity = registry.entity_type(),
            interval_secs = interval.as_secs(),
            "starting cache sweep task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let mut removed = 0;
            for cache in registry.caches() {
                removed += cache.invalidate_all().await;
            }

            if removed > 0 {
                info!(
                    entity = registry.entity_type(),
                    removed, "cache sweep removed entries"
                );
            } else {
                debug!(entity = registry.entity_type(), "cache sweep found nothing to remove");
            }
        }
    })
}
