//! Persistence Store Contract
//!
//! The interface the generic layer needs from "a store". Everything behind
//! it (connection pooling, SQL generation, transactions) is a backend
//! concern; the layer only hands over validated descriptors and bound
//! values.

use async_trait::async_trait;

use crate::entity::{Entity, SetClause};
use crate::error::StoreError;
use crate::query::QueryDescriptor;

/// Result alias for store-level calls.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// == Data Store Trait ==
/// Asynchronous persistence primitives for one entity type.
///
/// Implementations interpret [`QueryDescriptor`]s with bound values only;
/// they must never receive or build concatenated query text from caller
/// input. All methods are free of retry logic.
#[async_trait]
pub trait DataStore<T: Entity>: Send + Sync {
    /// Fetches a single row by identifier.
    async fn fetch_by_id(&self, id: &T::Key) -> StoreResult<Option<T>>;

    /// Fetches every row matching the descriptor, honoring its sort order
    /// and page window when present.
    async fn fetch(&self, query: &QueryDescriptor) -> StoreResult<Vec<T>>;

    /// Counts rows matching the descriptor, ignoring any page window.
    async fn count(&self, query: &QueryDescriptor) -> StoreResult<u64>;

    /// Inserts a new row, assigning a generated identifier when the entity
    /// carries none, and returns the stored record.
    async fn insert(&self, entity: T) -> StoreResult<T>;

    /// Replaces an existing row with the given record (full merge).
    ///
    /// Fails with [`StoreError::MissingRow`] when no row carries the
    /// entity's identifier.
    async fn merge(&self, entity: T) -> StoreResult<T>;

    /// Applies field assignments to the row with the given identifier.
    ///
    /// Returns the number of rows affected (0 when the id is unknown).
    async fn apply_sets(&self, id: &T::Key, clauses: &[SetClause]) -> StoreResult<u64>;

    /// Removes the row with the given identifier; returns whether a row
    /// was removed.
    async fn remove_by_id(&self, id: &T::Key) -> StoreResult<bool>;

    /// Removes every row matching the descriptor (page window ignored);
    /// returns the count removed.
    async fn remove(&self, query: &QueryDescriptor) -> StoreResult<u64>;
}
