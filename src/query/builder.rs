//! Predicate Builder Module
//!
//! Translates a field name, operator, and bound values plus optional
//! sort/pagination into a validated [`QueryDescriptor`]. All values are
//! carried as bound parameters; nothing caller-supplied is ever
//! interpolated into query text.

use std::cmp::Ordering;
use std::marker::PhantomData;

use crate::entity::{Entity, FieldValue};
use crate::error::{DataError, Result};
use crate::query::descriptor::{Operator, Page, QueryDescriptor, SortDirection};
use crate::query::MAX_PAGE_SIZE;

// == Predicate Builder ==
/// Builder for [`QueryDescriptor`]s, parametric over the entity type so
/// field names are checked against the entity's declared field set.
#[derive(Debug, Clone)]
pub struct PredicateBuilder<T: Entity> {
    operator: Operator,
    field: Option<String>,
    values: Vec<FieldValue>,
    sort_field: Option<String>,
    sort_direction: SortDirection,
    page: Option<(u32, u32)>,
    _entity: PhantomData<T>,
}

impl<T: Entity> PredicateBuilder<T> {
    fn with_operator(operator: Operator, field: Option<&str>, values: Vec<FieldValue>) -> Self {
        Self {
            operator,
            field: field.map(str::to_string),
            values,
            sort_field: None,
            sort_direction: SortDirection::Ascending,
            page: None,
            _entity: PhantomData,
        }
    }

    // == Constructors ==
    /// A predicate matching every row.
    pub fn all() -> Self {
        Self::with_operator(Operator::All, None, Vec::new())
    }

    /// `field == value`
    pub fn equals(field: &str, value: impl Into<FieldValue>) -> Self {
        Self::with_operator(Operator::Equals, Some(field), vec![value.into()])
    }

    /// Case-sensitive substring match.
    pub fn contains(field: &str, value: impl Into<FieldValue>) -> Self {
        Self::with_operator(
            Operator::Contains {
                case_insensitive: false,
            },
            Some(field),
            vec![value.into()],
        )
    }

    /// Case-insensitive substring match.
    pub fn contains_ignore_case(field: &str, value: impl Into<FieldValue>) -> Self {
        Self::with_operator(
            Operator::Contains {
                case_insensitive: true,
            },
            Some(field),
            vec![value.into()],
        )
    }

    /// Prefix match.
    pub fn starts_with(field: &str, value: impl Into<FieldValue>) -> Self {
        Self::with_operator(Operator::StartsWith, Some(field), vec![value.into()])
    }

    /// `field > value`
    pub fn greater_than(field: &str, value: impl Into<FieldValue>) -> Self {
        Self::with_operator(Operator::GreaterThan, Some(field), vec![value.into()])
    }

    /// `field < value`
    pub fn less_than(field: &str, value: impl Into<FieldValue>) -> Self {
        Self::with_operator(Operator::LessThan, Some(field), vec![value.into()])
    }

    /// `lo <= field <= hi` (inclusive on both ends).
    pub fn between(
        field: &str,
        lo: impl Into<FieldValue>,
        hi: impl Into<FieldValue>,
    ) -> Self {
        Self::with_operator(Operator::Between, Some(field), vec![lo.into(), hi.into()])
    }

    // == Modifiers ==
    /// Sorts results by the given field and direction.
    pub fn sorted_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.sort_field = Some(field.to_string());
        self.sort_direction = direction;
        self
    }

    /// Restricts results to one page window (zero-based index).
    pub fn page(mut self, index: u32, size: u32) -> Self {
        self.page = Some((index, size));
        self
    }

    // == Build ==
    /// Validates every invariant and produces the descriptor.
    ///
    /// Fails with `InvalidPredicate` when the field is empty or unknown,
    /// the sort field is unknown, a range has hi < lo or incomparable
    /// bounds, or the page size falls outside [1, MAX_PAGE_SIZE].
    pub fn build(self) -> Result<QueryDescriptor> {
        if let Some(field) = self.field.as_deref() {
            validate_field::<T>(field)?;
        }

        let sort_field = match self.sort_field {
            Some(field) => {
                validate_field::<T>(&field)?;
                field
            }
            None => T::natural_key().to_string(),
        };

        if self.operator == Operator::Between {
            let (lo, hi) = match (self.values.first(), self.values.get(1)) {
                (Some(lo), Some(hi)) => (lo, hi),
                _ => {
                    return Err(DataError::InvalidPredicate(
                        "range predicate requires two bound values".to_string(),
                    ))
                }
            };
            match lo.compare(hi) {
                Some(Ordering::Greater) => {
                    return Err(DataError::InvalidPredicate(
                        "range upper bound is less than lower bound".to_string(),
                    ))
                }
                None => {
                    return Err(DataError::InvalidPredicate(format!(
                        "range bounds must be comparable, got {} and {}",
                        lo.kind(),
                        hi.kind()
                    )))
                }
                _ => {}
            }
        }

        let page = match self.page {
            Some((index, size)) => {
                if size == 0 {
                    return Err(DataError::InvalidPredicate(
                        "page size must be positive".to_string(),
                    ));
                }
                if size > MAX_PAGE_SIZE {
                    return Err(DataError::InvalidPredicate(format!(
                        "page size {} exceeds maximum of {}",
                        size, MAX_PAGE_SIZE
                    )));
                }
                Some(Page { index, size })
            }
            None => None,
        };

        Ok(QueryDescriptor::from_parts(
            self.operator,
            self.field,
            self.values,
            sort_field,
            self.sort_direction,
            page,
        ))
    }
}

fn validate_field<T: Entity>(field: &str) -> Result<()> {
    if field.is_empty() {
        return Err(DataError::InvalidPredicate(
            "field name must not be empty".to_string(),
        ));
    }
    if !T::fields().contains(&field) {
        return Err(DataError::InvalidPredicate(format!(
            "unknown field '{}' for {}",
            field,
            T::entity_type()
        )));
    }
    Ok(())
}
