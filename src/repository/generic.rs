//! Generic Repository Module
//!
//! Executes predicate descriptors against the underlying store, uniformly
//! for every entity type. The repository is stateless and owns no cache;
//! it wraps store failures with operation context and performs no retries.

use std::sync::Arc;

use crate::entity::{Entity, FieldValue, SetClause};
use crate::error::{DataError, Result, StoreError};
use crate::query::QueryDescriptor;
use crate::store::DataStore;

/// Maps a store failure to the caller-facing taxonomy: a missing row is the
/// caller's `NotFound`, anything else is a wrapped repository failure.
fn surface<T: Entity>(operation: &'static str, source: StoreError) -> DataError {
    match source {
        StoreError::MissingRow(id) => {
            DataError::NotFound(format!("{} {}", T::entity_type(), id))
        }
        other => DataError::repository(T::entity_type(), operation, other),
    }
}

/// Number of pages needed to hold `count` rows at `page_size` rows per page.
pub(crate) fn pages_for(count: u64, page_size: u32) -> u64 {
    let size = page_size as u64;
    count.div_ceil(size)
}

// == Generic Repository ==
/// Store-facing operations for one entity type.
pub struct Repository<T: Entity> {
    store: Arc<dyn DataStore<T>>,
}

impl<T: Entity> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<T: Entity> Repository<T> {
    // == Constructor ==
    /// Creates a repository over the given store.
    pub fn new(store: Arc<dyn DataStore<T>>) -> Self {
        Self { store }
    }

    // == Reads ==
    /// Fetches the entity with the given identifier, or `NotFound`.
    pub async fn find_by_id(&self, id: &T::Key) -> Result<T> {
        let row = self
            .store
            .fetch_by_id(id)
            .await
            .map_err(|e| surface::<T>("find_by_id", e))?;
        row.ok_or_else(|| DataError::NotFound(format!("{} {}", T::entity_type(), id)))
    }

    /// Fetches every entity matching the descriptor, honoring pagination
    /// when present.
    pub async fn find_by_predicate(&self, query: &QueryDescriptor) -> Result<Vec<T>> {
        self.store
            .fetch(query)
            .await
            .map_err(|e| surface::<T>("find_by_predicate", e))
    }

    /// Counts entities matching the descriptor, ignoring pagination.
    pub async fn count(&self, query: &QueryDescriptor) -> Result<u64> {
        self.store
            .count(&query.without_page())
            .await
            .map_err(|e| surface::<T>("count", e))
    }

    /// Whether at least one entity matches the descriptor.
    pub async fn exists(&self, query: &QueryDescriptor) -> Result<bool> {
        Ok(self.count(query).await? > 0)
    }

    /// Number of pages the matching rows occupy at the given page size.
    pub async fn page_count(&self, query: &QueryDescriptor, page_size: u32) -> Result<u64> {
        if page_size == 0 {
            return Err(DataError::InvalidPredicate(
                "page size must be positive".to_string(),
            ));
        }
        Ok(pages_for(self.count(query).await?, page_size))
    }

    // == Writes ==
    /// Persists a new entity, assigning a generated identifier when absent,
    /// and returns the stored record.
    pub async fn save(&self, entity: T) -> Result<T> {
        self.store
            .insert(entity)
            .await
            .map_err(|e| surface::<T>("save", e))
    }

    /// Full-record merge of an existing entity.
    ///
    /// The entity must carry an identifier referencing an existing row, or
    /// the call fails with `NotFound`.
    pub async fn update(&self, entity: T) -> Result<T> {
        if entity.id().is_none() {
            return Err(DataError::NotFound(format!(
                "{} without identifier cannot be updated",
                T::entity_type()
            )));
        }
        self.store
            .merge(entity)
            .await
            .map_err(|e| surface::<T>("update", e))
    }

    /// Assigns one field on the identified row; returns rows affected (0 or 1).
    pub async fn update_field(
        &self,
        id: &T::Key,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> Result<u64> {
        self.update_fields(id, &[SetClause::new(field, value)]).await
    }

    /// Applies a set of field assignments to the identified row; returns
    /// rows affected. Field names are validated against the entity's
    /// declared set before the store is touched.
    pub async fn update_fields(&self, id: &T::Key, clauses: &[SetClause]) -> Result<u64> {
        for clause in clauses {
            if !T::fields().contains(&clause.field.as_str()) {
                return Err(DataError::InvalidPredicate(format!(
                    "unknown field '{}' for {}",
                    clause.field,
                    T::entity_type()
                )));
            }
        }
        self.store
            .apply_sets(id, clauses)
            .await
            .map_err(|e| surface::<T>("update_fields", e))
    }

    /// Removes the identified row; returns whether a row was removed.
    pub async fn delete_by_id(&self, id: &T::Key) -> Result<bool> {
        self.store
            .remove_by_id(id)
            .await
            .map_err(|e| surface::<T>("delete_by_id", e))
    }

    /// Removes every row matching the descriptor; returns the count removed.
    pub async fn delete_by_predicate(&self, query: &QueryDescriptor) -> Result<u64> {
        self.store
            .remove(&query.without_page())
            .await
            .map_err(|e| surface::<T>("delete_by_predicate", e))
    }
}
