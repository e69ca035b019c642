//! datalayer - A generic cached data-access layer
//!
//! Gives every domain entity identical CRUD, search, pagination, and
//! aggregation operations through a parametrized repository/service pair,
//! transparently backed by per-operation result caches with scheduled
//! full invalidation as a staleness backstop.

pub mod cache;
pub mod config;
pub mod entity;
pub mod error;
pub mod query;
pub mod repository;
pub mod service;
pub mod store;
pub mod tasks;

pub use cache::{CacheRegistry, CacheStats, KeyBuilder, NamedCache};
pub use config::Config;
pub use entity::{Entity, FieldValue, SetClause};
pub use error::{DataError, Result, StoreError};
pub use query::{PredicateBuilder, QueryDescriptor, SortDirection, MAX_PAGE_SIZE};
pub use repository::Repository;
pub use service::Service;
pub use store::{DataStore, MemoryStore, MigrationRunner, MigrationStatus, RollbackTarget};
pub use tasks::spawn_sweep_task;
