//! In-Memory Store Module
//!
//! A complete [`DataStore`] implementation over a HashMap, used as the
//! reference backend for tests and examples. It interprets descriptors
//! exactly the way a SQL backend is expected to: filter, then sort, then
//! page; counts and bulk deletes ignore the page window.

use std::collections::HashMap;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::entity::{Entity, SetClause};
use crate::error::StoreError;
use crate::query::{Operator, QueryDescriptor, SortDirection};
use crate::store::traits::{DataStore, StoreResult};

// == Memory Store ==
/// HashMap-backed store with monotonically generated identifiers.
#[derive(Debug)]
pub struct MemoryStore<T: Entity> {
    /// Row storage, keyed by identifier
    rows: RwLock<HashMap<T::Key, T>>,
    /// Identifier sequence for inserts without an id
    sequence: AtomicU64,
}

impl<T: Entity> MemoryStore<T> {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            sequence: AtomicU64::new(0),
        }
    }

    /// Returns the current number of rows.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Returns true when the store holds no rows.
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

// == Predicate Evaluation ==
/// Whether an entity matches the descriptor's filter (sort and page are
/// applied separately).
fn matches<T: Entity>(query: &QueryDescriptor, entity: &T) -> bool {
    if *query.operator() == Operator::All {
        return true;
    }
    let Some(field) = query.field() else {
        return false;
    };
    let Some(actual) = entity.field(field) else {
        return false;
    };
    let Some(bound) = query.bound_values().first() else {
        return false;
    };

    match query.operator() {
        Operator::Equals => actual == *bound,
        Operator::Contains { case_insensitive } => actual.contains(bound, *case_insensitive),
        Operator::StartsWith => actual.starts_with(bound),
        Operator::GreaterThan => actual.compare(bound) == Some(Ordering::Greater),
        Operator::LessThan => actual.compare(bound) == Some(Ordering::Less),
        Operator::Between => {
            let Some(hi) = query.bound_values().get(1) else {
                return false;
            };
            actual.compare(bound) != Some(Ordering::Less)
                && actual.compare(hi) != Some(Ordering::Greater)
        }
        Operator::All => true,
    }
}

/// Total order over entities for a sort field: field value first, identifier
/// as a deterministic tiebreak, rows without the field last.
fn compare_rows<T: Entity>(a: &T, b: &T, field: &str, direction: SortDirection) -> Ordering {
    let ordering = match (a.field(field), b.field(field)) {
        (Some(x), Some(y)) => x.compare(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    let ordering = ordering.then_with(|| {
        let a_id = a.id().map(ToString::to_string).unwrap_or_default();
        let b_id = b.id().map(ToString::to_string).unwrap_or_default();
        a_id.cmp(&b_id)
    });
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

#[async_trait]
impl<T> DataStore<T> for MemoryStore<T>
where
    T: Entity,
    T::Key: From<u64>,
{
    async fn fetch_by_id(&self, id: &T::Key) -> StoreResult<Option<T>> {
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn fetch(&self, query: &QueryDescriptor) -> StoreResult<Vec<T>> {
        let rows = self.rows.read().await;
        let mut selected: Vec<T> = rows
            .values()
            .filter(|row| matches(query, *row))
            .cloned()
            .collect();
        drop(rows);

        selected.sort_by(|a, b| compare_rows(a, b, query.sort_field(), query.sort_direction()));

        if let Some(page) = query.page() {
            selected = selected
                .into_iter()
                .skip(page.offset() as usize)
                .take(page.size as usize)
                .collect();
        }
        Ok(selected)
    }

    async fn count(&self, query: &QueryDescriptor) -> StoreResult<u64> {
        let rows = self.rows.read().await;
        Ok(rows.values().filter(|row| matches(query, *row)).count() as u64)
    }

    async fn insert(&self, mut entity: T) -> StoreResult<T> {
        if entity.id().is_none() {
            let next = self.sequence.fetch_add(1, AtomicOrdering::SeqCst) + 1;
            entity.assign_id(T::Key::from(next));
        }
        let Some(id) = entity.id().cloned() else {
            return Err(StoreError::Backend(
                "identifier assignment failed".to_string(),
            ));
        };
        self.rows.write().await.insert(id, entity.clone());
        Ok(entity)
    }

    async fn merge(&self, entity: T) -> StoreResult<T> {
        let Some(id) = entity.id().cloned() else {
            return Err(StoreError::MissingRow("<unassigned>".to_string()));
        };
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&id) {
            return Err(StoreError::MissingRow(id.to_string()));
        }
        rows.insert(id, entity.clone());
        Ok(entity)
    }

    async fn apply_sets(&self, id: &T::Key, clauses: &[SetClause]) -> StoreResult<u64> {
        let mut rows = self.rows.write().await;
        let Some(row) = rows.get_mut(id) else {
            return Ok(0);
        };
        // Apply to a copy so a failing clause leaves the row untouched.
        let mut updated = row.clone();
        for clause in clauses {
            updated
                .apply_set(clause)
                .map_err(|err| StoreError::Backend(err.to_string()))?;
        }
        *row = updated;
        Ok(1)
    }

    async fn remove_by_id(&self, id: &T::Key) -> StoreResult<bool> {
        Ok(self.rows.write().await.remove(id).is_some())
    }

    async fn remove(&self, query: &QueryDescriptor) -> StoreResult<u64> {
        let mut rows = self.rows.write().await;
        let doomed: Vec<T::Key> = rows
            .iter()
            .filter(|(_, row)| matches(query, *row))
            .map(|(id, _)| id.clone())
            .collect();
        for id in &doomed {
            rows.remove(id);
        }
        Ok(doomed.len() as u64)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::fixtures::Product;
    use crate::query::PredicateBuilder;

    async fn seeded_store() -> MemoryStore<Product> {
        let store = MemoryStore::new();
        for (name, price) in [("apple", 1.0), ("banana", 2.0), ("cherry", 3.0)] {
            store.insert(Product::new(name, price)).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = MemoryStore::new();
        let first = store.insert(Product::new("a", 1.0)).await.unwrap();
        let second = store.insert(Product::new("b", 2.0)).await.unwrap();

        assert_eq!(first.id, Some(1));
        assert_eq!(second.id, Some(2));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_insert_keeps_existing_id() {
        let store = MemoryStore::new();
        let mut product = Product::new("fixed", 1.0);
        product.id = Some(99);

        let stored = store.insert(product).await.unwrap();
        assert_eq!(stored.id, Some(99));
        assert!(store.fetch_by_id(&99).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_fetch_by_id_missing_is_none() {
        let store: MemoryStore<Product> = MemoryStore::new();
        assert!(store.fetch_by_id(&7).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_filters_and_sorts() {
        let store = seeded_store().await;
        let query = PredicateBuilder::<Product>::greater_than("price", 1.0)
            .sorted_by("price", SortDirection::Descending)
            .build()
            .unwrap();

        let rows = store.fetch(&query).await.unwrap();
        let names: Vec<&str> = rows.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["cherry", "banana"]);
    }

    #[tokio::test]
    async fn test_fetch_honors_page_window() {
        let store = seeded_store().await;
        let query = PredicateBuilder::<Product>::all()
            .page(1, 2)
            .build()
            .unwrap();

        let rows = store.fetch(&query).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "cherry");
    }

    #[tokio::test]
    async fn test_count_ignores_page_window() {
        let store = seeded_store().await;
        let query = PredicateBuilder::<Product>::all()
            .page(0, 1)
            .build()
            .unwrap();

        assert_eq!(store.count(&query).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_merge_missing_row_fails() {
        let store: MemoryStore<Product> = MemoryStore::new();
        let mut product = Product::new("ghost", 1.0);
        product.id = Some(5);

        let result = store.merge(product).await;
        assert!(matches!(result, Err(StoreError::MissingRow(_))));
    }

    #[tokio::test]
    async fn test_merge_without_id_fails() {
        let store: MemoryStore<Product> = MemoryStore::new();
        let result = store.merge(Product::new("ghost", 1.0)).await;
        assert!(matches!(result, Err(StoreError::MissingRow(_))));
    }

    #[tokio::test]
    async fn test_apply_sets_updates_single_row() {
        let store = seeded_store().await;
        let affected = store
            .apply_sets(&1, &[SetClause::new("price", 9.0)])
            .await
            .unwrap();

        assert_eq!(affected, 1);
        let row = store.fetch_by_id(&1).await.unwrap().unwrap();
        assert_eq!(row.price, 9.0);
    }

    #[tokio::test]
    async fn test_apply_sets_unknown_id_affects_zero() {
        let store = seeded_store().await;
        let affected = store
            .apply_sets(&999, &[SetClause::new("price", 9.0)])
            .await
            .unwrap();
        assert_eq!(affected, 0);
    }

    #[tokio::test]
    async fn test_apply_sets_failing_clause_leaves_row_untouched() {
        let store = seeded_store().await;
        let clauses = [
            SetClause::new("price", 9.0),
            SetClause::new("bogus", "value"),
        ];

        let result = store.apply_sets(&1, &clauses).await;
        assert!(matches!(result, Err(StoreError::Backend(_))));

        let row = store.fetch_by_id(&1).await.unwrap().unwrap();
        assert_eq!(row.price, 1.0);
    }

    #[tokio::test]
    async fn test_remove_by_predicate() {
        let store = seeded_store().await;
        let query = PredicateBuilder::<Product>::less_than("price", 3.0)
            .build()
            .unwrap();

        let removed = store.remove(&query).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_by_id() {
        let store = seeded_store().await;
        assert!(store.remove_by_id(&1).await.unwrap());
        assert!(!store.remove_by_id(&1).await.unwrap());
    }
}
