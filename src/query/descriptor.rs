//! Query Descriptor Module
//!
//! The immutable, parameter-bound description of a filter/sort/page query.
//! Descriptors are only constructed through the builder, which enforces
//! every invariant; once built, a descriptor is plain data for a store
//! to interpret.

use serde::{Deserialize, Serialize};

use crate::entity::FieldValue;

// == Operator ==
/// The comparison a predicate applies to its field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operator {
    /// Exact equality
    Equals,
    /// Substring match on text fields
    Contains {
        /// When true, matching ignores ASCII/Unicode case
        case_insensitive: bool,
    },
    /// Prefix match on text fields
    StartsWith,
    /// Strictly greater than the bound value
    GreaterThan,
    /// Strictly less than the bound value
    LessThan,
    /// Inclusive range between two bound values
    Between,
    /// No filter; matches every row
    All,
}

// == Sort Direction ==
/// Sort order for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Smallest value first (the default)
    #[default]
    Ascending,
    /// Largest value first
    Descending,
}

// == Page ==
/// Zero-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Zero-based page index
    pub index: u32,
    /// Rows per page; always within [1, MAX_PAGE_SIZE]
    pub size: u32,
}

impl Page {
    /// Row offset of the first row on this page.
    pub fn offset(&self) -> u64 {
        self.index as u64 * self.size as u64
    }
}

// == Query Descriptor ==
/// A validated filter/sort/page query.
///
/// Invariants (enforced at build time):
/// - a non-`All` operator always carries a known, non-empty field name
/// - `Between` carries exactly two comparable values with lo <= hi
/// - page size is within [1, MAX_PAGE_SIZE]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    operator: Operator,
    field: Option<String>,
    values: Vec<FieldValue>,
    sort_field: String,
    sort_direction: SortDirection,
    page: Option<Page>,
}

impl QueryDescriptor {
    /// Assembles a descriptor from already-validated parts.
    pub(crate) fn from_parts(
        operator: Operator,
        field: Option<String>,
        values: Vec<FieldValue>,
        sort_field: String,
        sort_direction: SortDirection,
        page: Option<Page>,
    ) -> Self {
        Self {
            operator,
            field,
            values,
            sort_field,
            sort_direction,
            page,
        }
    }

    /// The comparison operator.
    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    /// The filtered field; `None` only for the `All` operator.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Positionally bound values: one for unary operators, `[lo, hi]` for `Between`.
    pub fn bound_values(&self) -> &[FieldValue] {
        &self.values
    }

    /// The sort field; defaults to the entity's natural key.
    pub fn sort_field(&self) -> &str {
        &self.sort_field
    }

    /// The sort direction; defaults to ascending.
    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    /// The page window, when the query is paginated.
    pub fn page(&self) -> Option<Page> {
        self.page
    }

    /// A copy of this descriptor with pagination stripped.
    ///
    /// Counting must see every matching row regardless of the page window.
    pub fn without_page(&self) -> QueryDescriptor {
        let mut stripped = self.clone();
        stripped.page = None;
        stripped
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QueryDescriptor {
        QueryDescriptor::from_parts(
            Operator::Equals,
            Some("name".to_string()),
            vec![FieldValue::Text("Widget".to_string())],
            "name".to_string(),
            SortDirection::Ascending,
            Some(Page { index: 2, size: 20 }),
        )
    }

    #[test]
    fn test_page_offset() {
        let page = Page { index: 3, size: 25 };
        assert_eq!(page.offset(), 75);
    }

    #[test]
    fn test_without_page_strips_only_pagination() {
        let query = sample();
        let stripped = query.without_page();

        assert_eq!(stripped.page(), None);
        assert_eq!(stripped.operator(), query.operator());
        assert_eq!(stripped.field(), query.field());
        assert_eq!(stripped.bound_values(), query.bound_values());
    }

    #[test]
    fn test_descriptor_serializes_deterministically() {
        let a = serde_json::to_string(&sample()).unwrap();
        let b = serde_json::to_string(&sample()).unwrap();
        assert_eq!(a, b);
    }
}
