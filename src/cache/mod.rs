//! Cache Module
//!
//! Named, keyed result caches with deterministic key derivation, point
//! and full invalidation, and a per-entity registry the scheduled sweep
//! iterates.

mod entry;
mod key;
mod named;
mod registry;
mod stats;


// Re-export public types
pub use entry::CacheEntry;
pub use key::KeyBuilder;
pub use named::NamedCache;
pub use registry::CacheRegistry;
pub use stats::CacheStats;
