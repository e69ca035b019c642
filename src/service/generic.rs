//! Generic Service Module
//!
//! The orchestration layer every entity service shares: cache lookup
//! before each repository call, cache population after, and invalidation
//! of the entity's caches after any mutating call.
//!
//! Caching is a performance layer only. Any cache-side failure is logged
//! and the call degrades to direct store access; the store remains the
//! single source of truth.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{CacheRegistry, KeyBuilder};
use crate::config::Config;
use crate::entity::{Entity, FieldValue, SetClause};
use crate::error::{DataError, Result};
use crate::query::{PredicateBuilder, QueryDescriptor, SortDirection};
use crate::repository::Repository;
use crate::store::DataStore;

// == Operation Names ==
const FIND_BY_ID: &str = "find-by-id";
const FIND_BY_NAME: &str = "find-by-name";
const FIND_ALL_SORTED: &str = "find-all-sorted";
const FIND_PAGINATED: &str = "find-paginated";
const FIND_PAGINATED_SORTED: &str = "find-paginated-sorted";
const FIND_BY_NAME_CONTAINING: &str = "find-by-name-containing";
const COUNT_ALL: &str = "count-all";
const EXISTS_BY_NAME: &str = "exists-by-name";
const EXISTS_BY_ID: &str = "exists-by-id";
const FIND_TOP_N: &str = "find-top-n";

const BUILT_IN_OPERATIONS: &[&str] = &[
    FIND_BY_ID,
    FIND_BY_NAME,
    FIND_ALL_SORTED,
    FIND_PAGINATED,
    FIND_PAGINATED_SORTED,
    FIND_BY_NAME_CONTAINING,
    COUNT_ALL,
    EXISTS_BY_NAME,
    EXISTS_BY_ID,
    FIND_TOP_N,
];

// == Generic Service ==
/// Cached data-access operations for one entity type.
///
/// The service owns its entity's [`CacheRegistry`] and is the sole writer
/// of those caches. Entity-specific services extend it through the
/// `*_where` methods, which register their operation's cache so the
/// scheduled sweep and post-write invalidation cover it automatically.
pub struct Service<T: Entity> {
    repo: Repository<T>,
    registry: Arc<CacheRegistry>,
    default_page_size: u32,
}

impl<T: Entity> Clone for Service<T> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            registry: Arc::clone(&self.registry),
            default_page_size: self.default_page_size,
        }
    }
}

impl<T: Entity> Service<T> {
    // == Constructor ==
    /// Creates a service over the given store with default configuration,
    /// registering one named cache per built-in operation.
    pub fn new(store: Arc<dyn DataStore<T>>) -> Self {
        Self::with_config(store, &Config::default())
    }

    /// Creates a service over the given store, taking the default page size
    /// from the configuration.
    pub fn with_config(store: Arc<dyn DataStore<T>>, config: &Config) -> Self {
        let registry = Arc::new(CacheRegistry::new(T::entity_type()));
        for operation in BUILT_IN_OPERATIONS {
            registry.register(operation);
        }
        Self {
            repo: Repository::new(store),
            registry,
            default_page_size: config.default_page_size,
        }
    }

    /// The cache registry owned by this service; hand this to the sweep.
    pub fn registry(&self) -> &Arc<CacheRegistry> {
        &self.registry
    }

    /// The underlying repository.
    ///
    /// Mutations issued directly against it bypass cache invalidation and
    /// stay stale until the next sweep.
    pub fn repository(&self) -> &Repository<T> {
        &self.repo
    }

    // == Cache-Aside Helper ==
    /// LOOKUP, then on miss COMPUTE and STORE. Any cache-side failure
    /// degrades to a direct compute.
    async fn cached<R, F, Fut>(&self, operation: &str, key: Result<String>, compute: F) -> Result<R>
    where
        R: Serialize + DeserializeOwned,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<R>>,
    {
        let Some(cache) = self.registry.get(operation) else {
            return compute().await;
        };
        let key = match key {
            Ok(key) => key,
            Err(err) => {
                warn!(
                    entity = T::entity_type(),
                    operation,
                    error = %err,
                    "cache key derivation failed; serving from store"
                );
                return compute().await;
            }
        };

        let outcome = cache
            .get_or_compute(&key, || async {
                let result = compute().await?;
                serde_json::to_value(&result)
                    .map_err(|e| DataError::CacheUnavailable(e.to_string()))
            })
            .await;

        match outcome {
            Ok(value) => match serde_json::from_value::<R>(value) {
                Ok(result) => Ok(result),
                Err(err) => {
                    warn!(
                        entity = T::entity_type(),
                        operation,
                        error = %err,
                        "cached value could not be decoded; recomputing"
                    );
                    cache.invalidate(&key).await;
                    compute().await
                }
            },
            Err(DataError::CacheUnavailable(reason)) => {
                warn!(
                    entity = T::entity_type(),
                    operation,
                    reason = %reason,
                    "cache unavailable; serving from store"
                );
                compute().await
            }
            Err(other) => Err(other),
        }
    }

    /// Full invalidation of every cache registered for this entity type.
    ///
    /// Runs after the store write committed and before the result is
    /// returned, so a subsequent read by the same caller can never hit
    /// pre-write data.
    async fn invalidate_related(&self) {
        let removed = self.registry.invalidate_entity().await;
        debug!(
            entity = T::entity_type(),
            removed, "entity caches invalidated after write"
        );
    }

    // == Cached Reads ==
    /// Fetches the entity with the given identifier, or `NotFound`.
    pub async fn find_by_id(&self, id: &T::Key) -> Result<T> {
        let key = KeyBuilder::new(FIND_BY_ID).arg(id).build();
        let repo = self.repo.clone();
        let id = id.clone();
        self.cached(FIND_BY_ID, key, move || {
            let repo = repo.clone();
            let id = id.clone();
            async move { repo.find_by_id(&id).await }
        })
        .await
    }

    /// Fetches the entity whose natural key equals `name`, if any.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<T>> {
        let query = PredicateBuilder::<T>::equals(T::natural_key(), name).build()?;
        let key = KeyBuilder::new(FIND_BY_NAME).arg(name).build();
        let repo = self.repo.clone();
        self.cached(FIND_BY_NAME, key, move || {
            let repo = repo.clone();
            let query = query.clone();
            async move { Ok(repo.find_by_predicate(&query).await?.into_iter().next()) }
        })
        .await
    }

    /// Every entity, sorted by the given field.
    pub async fn find_all_sorted(&self, sort_field: &str, direction: SortDirection) -> Result<Vec<T>> {
        let query = PredicateBuilder::<T>::all()
            .sorted_by(sort_field, direction)
            .build()?;
        let key = KeyBuilder::new(FIND_ALL_SORTED)
            .arg(sort_field)
            .arg(&direction)
            .build();
        let repo = self.repo.clone();
        self.cached(FIND_ALL_SORTED, key, move || {
            let repo = repo.clone();
            let query = query.clone();
            async move { repo.find_by_predicate(&query).await }
        })
        .await
    }

    /// One page of entities in natural-key order.
    pub async fn find_paginated(&self, page_index: u32, page_size: u32) -> Result<Vec<T>> {
        let query = PredicateBuilder::<T>::all()
            .page(page_index, page_size)
            .build()?;
        let key = KeyBuilder::new(FIND_PAGINATED)
            .arg(&page_index)
            .arg(&page_size)
            .build();
        let repo = self.repo.clone();
        self.cached(FIND_PAGINATED, key, move || {
            let repo = repo.clone();
            let query = query.clone();
            async move { repo.find_by_predicate(&query).await }
        })
        .await
    }

    /// One page of entities in natural-key order, using the configured
    /// default page size.
    pub async fn find_page(&self, page_index: u32) -> Result<Vec<T>> {
        self.find_paginated(page_index, self.default_page_size).await
    }

    /// One page of entities in the given order.
    pub async fn find_paginated_sorted(
        &self,
        page_index: u32,
        page_size: u32,
        sort_field: &str,
        direction: SortDirection,
    ) -> Result<Vec<T>> {
        let query = PredicateBuilder::<T>::all()
            .sorted_by(sort_field, direction)
            .page(page_index, page_size)
            .build()?;
        let key = KeyBuilder::new(FIND_PAGINATED_SORTED)
            .arg(&page_index)
            .arg(&page_size)
            .arg(sort_field)
            .arg(&direction)
            .build();
        let repo = self.repo.clone();
        self.cached(FIND_PAGINATED_SORTED, key, move || {
            let repo = repo.clone();
            let query = query.clone();
            async move { repo.find_by_predicate(&query).await }
        })
        .await
    }

    /// Entities whose natural key contains the fragment.
    pub async fn find_by_name_containing(
        &self,
        fragment: &str,
        case_insensitive: bool,
    ) -> Result<Vec<T>> {
        let query = if case_insensitive {
            PredicateBuilder::<T>::contains_ignore_case(T::natural_key(), fragment)
        } else {
            PredicateBuilder::<T>::contains(T::natural_key(), fragment)
        }
        .build()?;
        let key = KeyBuilder::new(FIND_BY_NAME_CONTAINING)
            .arg(fragment)
            .arg(&case_insensitive)
            .build();
        let repo = self.repo.clone();
        self.cached(FIND_BY_NAME_CONTAINING, key, move || {
            let repo = repo.clone();
            let query = query.clone();
            async move { repo.find_by_predicate(&query).await }
        })
        .await
    }

    /// Total number of entities.
    pub async fn count_all(&self) -> Result<u64> {
        let query = PredicateBuilder::<T>::all().build()?;
        let key = KeyBuilder::new(COUNT_ALL).build();
        let repo = self.repo.clone();
        self.cached(COUNT_ALL, key, move || {
            let repo = repo.clone();
            let query = query.clone();
            async move { repo.count(&query).await }
        })
        .await
    }

    /// Whether any entity carries the given natural key.
    pub async fn exists_by_name(&self, name: &str) -> Result<bool> {
        let query = PredicateBuilder::<T>::equals(T::natural_key(), name).build()?;
        let key = KeyBuilder::new(EXISTS_BY_NAME).arg(name).build();
        let repo = self.repo.clone();
        self.cached(EXISTS_BY_NAME, key, move || {
            let repo = repo.clone();
            let query = query.clone();
            async move { repo.exists(&query).await }
        })
        .await
    }

    /// Whether the identifier resolves to a row.
    pub async fn exists_by_id(&self, id: &T::Key) -> Result<bool> {
        let key = KeyBuilder::new(EXISTS_BY_ID).arg(id).build();
        let repo = self.repo.clone();
        let id = id.clone();
        self.cached(EXISTS_BY_ID, key, move || {
            let repo = repo.clone();
            let id = id.clone();
            async move {
                match repo.find_by_id(&id).await {
                    Ok(_) => Ok(true),
                    Err(DataError::NotFound(_)) => Ok(false),
                    Err(err) => Err(err),
                }
            }
        })
        .await
    }

    /// The first `n` entities by the given order, or natural-key order when
    /// no sort field is supplied.
    pub async fn find_top_n(
        &self,
        n: u32,
        sort_field: Option<&str>,
        direction: SortDirection,
    ) -> Result<Vec<T>> {
        let field = sort_field.unwrap_or(T::natural_key());
        let query = PredicateBuilder::<T>::all()
            .sorted_by(field, direction)
            .page(0, n)
            .build()?;
        let key = KeyBuilder::new(FIND_TOP_N)
            .arg(&n)
            .arg(field)
            .arg(&direction)
            .build();
        let repo = self.repo.clone();
        self.cached(FIND_TOP_N, key, move || {
            let repo = repo.clone();
            let query = query.clone();
            async move { repo.find_by_predicate(&query).await }
        })
        .await
    }

    /// Number of pages of entities at the given page size.
    pub async fn page_count(&self, page_size: u32) -> Result<u64> {
        let query = PredicateBuilder::<T>::all().build()?;
        self.repo.page_count(&query, page_size).await
    }

    // == Extension Reads ==
    /// Cached fetch for an entity-specific predicate.
    ///
    /// `operation` names the cache the results populate; registering it
    /// here puts it under sweep and post-write invalidation coverage.
    pub async fn find_where(&self, operation: &str, query: &QueryDescriptor) -> Result<Vec<T>> {
        self.registry.register(operation);
        let key = KeyBuilder::new(operation).arg(query).build();
        let repo = self.repo.clone();
        let query = query.clone();
        self.cached(operation, key, move || {
            let repo = repo.clone();
            let query = query.clone();
            async move { repo.find_by_predicate(&query).await }
        })
        .await
    }

    /// Cached count for an entity-specific predicate.
    pub async fn count_where(&self, operation: &str, query: &QueryDescriptor) -> Result<u64> {
        self.registry.register(operation);
        let key = KeyBuilder::new(operation).arg(query).build();
        let repo = self.repo.clone();
        let query = query.clone();
        self.cached(operation, key, move || {
            let repo = repo.clone();
            let query = query.clone();
            async move { repo.count(&query).await }
        })
        .await
    }

    /// Cached existence check for an entity-specific predicate.
    pub async fn exists_where(&self, operation: &str, query: &QueryDescriptor) -> Result<bool> {
        self.registry.register(operation);
        let key = KeyBuilder::new(operation).arg(query).build();
        let repo = self.repo.clone();
        let query = query.clone();
        self.cached(operation, key, move || {
            let repo = repo.clone();
            let query = query.clone();
            async move { repo.exists(&query).await }
        })
        .await
    }

    // == Writes ==
    /// Persists a new entity and invalidates this entity type's caches.
    pub async fn save(&self, entity: T) -> Result<T> {
        let saved = self.repo.save(entity).await?;
        self.invalidate_related().await;
        Ok(saved)
    }

    /// Full-record merge of an existing entity.
    pub async fn update(&self, entity: T) -> Result<T> {
        let updated = self.repo.update(entity).await?;
        self.invalidate_related().await;
        Ok(updated)
    }

    /// Assigns one field on the identified row; returns rows affected.
    pub async fn update_field(
        &self,
        id: &T::Key,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> Result<u64> {
        let affected = self.repo.update_field(id, field, value).await?;
        self.invalidate_related().await;
        Ok(affected)
    }

    /// Applies several field assignments to the identified row.
    pub async fn update_fields(&self, id: &T::Key, clauses: &[SetClause]) -> Result<u64> {
        let affected = self.repo.update_fields(id, clauses).await?;
        self.invalidate_related().await;
        Ok(affected)
    }

    /// Renames the identified entity (assigns its natural key).
    pub async fn update_name(&self, id: &T::Key, new_name: &str) -> Result<u64> {
        self.update_field(id, T::natural_key(), new_name).await
    }

    /// Removes the identified entity; returns whether a row was removed.
    pub async fn delete_by_id(&self, id: &T::Key) -> Result<bool> {
        let removed = self.repo.delete_by_id(id).await?;
        self.invalidate_related().await;
        Ok(removed)
    }

    /// Removes every entity whose natural key equals `name`; returns the
    /// count removed.
    pub async fn delete_by_name(&self, name: &str) -> Result<u64> {
        let query = PredicateBuilder::<T>::equals(T::natural_key(), name).build()?;
        let removed = self.repo.delete_by_predicate(&query).await?;
        self.invalidate_related().await;
        Ok(removed)
    }

    /// Removes every entity matching an entity-specific predicate.
    pub async fn delete_where(&self, query: &QueryDescriptor) -> Result<u64> {
        let removed = self.repo.delete_by_predicate(query).await?;
        self.invalidate_related().await;
        Ok(removed)
    }
}
