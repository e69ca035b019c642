//! Store Module
//!
//! Collaborator boundaries for persistence: the async store contract the
//! repository executes against, an in-memory reference backend, and the
//! migration-runner interface.

mod memory;
mod migrate;
mod traits;

// Re-export public types
pub use memory::MemoryStore;
pub use migrate::{MigrationRunner, MigrationStatus, RollbackTarget};
pub use traits::{DataStore, StoreResult};
