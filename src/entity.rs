//! Entity Model Module
//!
//! Defines the trait every domain entity implements to participate in the
//! generic repository/service layer, plus the typed attribute values that
//! predicates and partial updates are expressed in.
//!
//! Field access is explicit: each entity names its queryable fields and
//! maps them to [`FieldValue`]s, so queries stay type-checked instead of
//! relying on reflection-style property lookup.

use std::cmp::Ordering;
use std::fmt::{Debug, Display};
use std::hash::Hash;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};

// == Field Value ==
/// A typed attribute value carried as a bound query parameter.
///
/// Values are never interpolated into query text; they travel inside a
/// `QueryDescriptor` and are interpreted by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// UTF-8 string attribute
    Text(String),
    /// Whole-number attribute
    Integer(i64),
    /// Decimal attribute
    Number(f64),
    /// Boolean attribute
    Bool(bool),
    /// Timestamp attribute
    Date(DateTime<Utc>),
    /// Foreign reference to another entity, by its key rendered as text
    Reference(String),
    /// Absent value
    Null,
}

impl FieldValue {
    // == Compare ==
    /// Ordered comparison between two values of the same variant.
    ///
    /// Returns `None` when the variants differ or the variant has no
    /// meaningful order (`Bool`, `Null`).
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => Some(a.cmp(b)),
            (FieldValue::Number(a), FieldValue::Number(b)) => a.partial_cmp(b),
            (FieldValue::Date(a), FieldValue::Date(b)) => Some(a.cmp(b)),
            (FieldValue::Reference(a), FieldValue::Reference(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    // == Contains ==
    /// Substring match; only meaningful for `Text` values.
    pub fn contains(&self, needle: &FieldValue, case_insensitive: bool) -> bool {
        match (self, needle) {
            (FieldValue::Text(haystack), FieldValue::Text(fragment)) => {
                if case_insensitive {
                    haystack.to_lowercase().contains(&fragment.to_lowercase())
                } else {
                    haystack.contains(fragment.as_str())
                }
            }
            _ => false,
        }
    }

    // == Starts With ==
    /// Prefix match; only meaningful for `Text` values.
    pub fn starts_with(&self, prefix: &FieldValue) -> bool {
        match (self, prefix) {
            (FieldValue::Text(haystack), FieldValue::Text(fragment)) => {
                haystack.starts_with(fragment.as_str())
            }
            _ => false,
        }
    }

    /// Borrows the inner string for `Text` values.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Short variant name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Integer(_) => "integer",
            FieldValue::Number(_) => "number",
            FieldValue::Bool(_) => "bool",
            FieldValue::Date(_) => "date",
            FieldValue::Reference(_) => "reference",
            FieldValue::Null => "null",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Date(value)
    }
}

// == Set Clause ==
/// A single field assignment in a partial update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetClause {
    /// The field to assign
    pub field: String,
    /// The value to assign, carried as a bound parameter
    pub value: FieldValue,
}

impl SetClause {
    /// Creates a new set clause.
    pub fn new(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

// == Entity Trait ==
/// Trait for domain records managed by the generic layer.
///
/// The layer is parametric over the entity type and its identifier type.
/// It never inspects attributes beyond the identifier and the natural key,
/// except through the explicit [`Entity::field`] accessor.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Identifier type for this entity
    type Key: Clone
        + Eq
        + Hash
        + Debug
        + Display
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    /// Entity type name, used to namespace caches and error messages
    fn entity_type() -> &'static str;

    /// The field used for default sorting and name-based convenience lookups
    fn natural_key() -> &'static str {
        "name"
    }

    /// The set of field names predicates may reference.
    ///
    /// Field names outside this set are rejected at predicate build time.
    fn fields() -> &'static [&'static str];

    /// The identifier, or `None` for a record not yet persisted
    fn id(&self) -> Option<&Self::Key>;

    /// Assigns a store-generated identifier
    fn assign_id(&mut self, id: Self::Key);

    /// The natural-key value (typically the `name` attribute)
    fn name(&self) -> &str;

    /// Reads a queryable field by name; `None` for unknown fields
    fn field(&self, name: &str) -> Option<FieldValue>;

    /// Applies a single field assignment.
    ///
    /// Fails with `InvalidPredicate` on an unknown field or a value of the
    /// wrong type for that field.
    fn apply_set(&mut self, clause: &SetClause) -> Result<()>;
}

/// Helper for `apply_set` implementations: the error for a type mismatch.
pub fn type_mismatch(entity: &str, field: &str, value: &FieldValue) -> DataError {
    DataError::InvalidPredicate(format!(
        "field '{}' of {} cannot be assigned a {} value",
        field,
        entity,
        value.kind()
    ))
}

// == Test Fixtures ==
#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Minimal entity used across unit tests.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub(crate) struct Product {
        pub id: Option<u64>,
        pub name: String,
        pub price: f64,
        pub in_stock: bool,
    }

    impl Product {
        pub(crate) fn new(name: &str, price: f64) -> Self {
            Self {
                id: None,
                name: name.to_string(),
                price,
                in_stock: true,
            }
        }
    }

    impl Entity for Product {
        type Key = u64;

        fn entity_type() -> &'static str {
            "product"
        }

        fn fields() -> &'static [&'static str] {
            &["name", "price", "in_stock"]
        }

        fn id(&self) -> Option<&u64> {
            self.id.as_ref()
        }

        fn assign_id(&mut self, id: u64) {
            self.id = Some(id);
        }

        fn name(&self) -> &str {
            &self.name
        }

        fn field(&self, name: &str) -> Option<FieldValue> {
            match name {
                "name" => Some(FieldValue::Text(self.name.clone())),
                "price" => Some(FieldValue::Number(self.price)),
                "in_stock" => Some(FieldValue::Bool(self.in_stock)),
                _ => None,
            }
        }

        fn apply_set(&mut self, clause: &SetClause) -> Result<()> {
            match (clause.field.as_str(), &clause.value) {
                ("name", FieldValue::Text(v)) => self.name = v.clone(),
                ("price", FieldValue::Number(v)) => self.price = *v,
                ("in_stock", FieldValue::Bool(v)) => self.in_stock = *v,
                ("name" | "price" | "in_stock", other) => {
                    return Err(type_mismatch("product", &clause.field, other))
                }
                _ => {
                    return Err(DataError::InvalidPredicate(format!(
                        "unknown field '{}' for product",
                        clause.field
                    )))
                }
            }
            Ok(())
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::fixtures::Product;
    use super::*;

    #[test]
    fn test_compare_same_variant() {
        let a = FieldValue::Text("apple".to_string());
        let b = FieldValue::Text("banana".to_string());
        assert_eq!(a.compare(&b), Some(Ordering::Less));

        let x = FieldValue::Integer(10);
        let y = FieldValue::Integer(3);
        assert_eq!(x.compare(&y), Some(Ordering::Greater));
    }

    #[test]
    fn test_compare_mixed_variants_is_none() {
        let a = FieldValue::Text("5".to_string());
        let b = FieldValue::Integer(5);
        assert_eq!(a.compare(&b), None);
    }

    #[test]
    fn test_contains_case_sensitivity() {
        let value = FieldValue::Text("Electronics".to_string());
        let fragment = FieldValue::Text("electro".to_string());

        assert!(!value.contains(&fragment, false));
        assert!(value.contains(&fragment, true));
    }

    #[test]
    fn test_starts_with() {
        let value = FieldValue::Text("Gadgets".to_string());
        assert!(value.starts_with(&FieldValue::Text("Gad".to_string())));
        assert!(!value.starts_with(&FieldValue::Text("gad".to_string())));
    }

    #[test]
    fn test_apply_set_updates_field() {
        let mut product = Product::new("Widget", 9.99);
        product
            .apply_set(&SetClause::new("price", 12.50))
            .unwrap();
        assert_eq!(product.price, 12.50);
    }

    #[test]
    fn test_apply_set_rejects_unknown_field() {
        let mut product = Product::new("Widget", 9.99);
        let result = product.apply_set(&SetClause::new("color", "red"));
        assert!(matches!(result, Err(DataError::InvalidPredicate(_))));
    }

    #[test]
    fn test_apply_set_rejects_type_mismatch() {
        let mut product = Product::new("Widget", 9.99);
        let result = product.apply_set(&SetClause::new("price", "expensive"));
        assert!(matches!(result, Err(DataError::InvalidPredicate(_))));
    }

    #[test]
    fn test_field_accessor() {
        let product = Product::new("Widget", 9.99);
        assert_eq!(product.field("name"), Some(FieldValue::Text("Widget".to_string())));
        assert_eq!(product.field("unknown"), None);
    }
}
