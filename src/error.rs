//! Error types for the data-access layer
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Store Error Enum ==
/// Failures reported by a persistence backend.
///
/// The generic repository never returns these directly; it maps
/// `MissingRow` to [`DataError::NotFound`] and wraps everything else
/// in [`DataError::Repository`] together with the operation context.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No row exists for the given identifier
    #[error("no row matches identifier {0}")]
    MissingRow(String),

    /// A write conflicted with concurrent store activity
    #[error("conflicting write: {0}")]
    Conflict(String),

    /// Any other backend-level failure (connection, constraint, ...)
    #[error("backend failure: {0}")]
    Backend(String),
}

// == Data Error Enum ==
/// Unified error type for the data-access layer.
#[derive(Error, Debug)]
pub enum DataError {
    /// Malformed or out-of-range query parameters; a caller error, never retried
    #[error("invalid predicate: {0}")]
    InvalidPredicate(String),

    /// An identifier or natural key did not resolve to a row
    #[error("not found: {0}")]
    NotFound(String),

    /// A store-level failure surfaced with operation context.
    ///
    /// May be transient; retry policy belongs to the caller, the layer
    /// itself never retries.
    #[error("repository failure during {entity}.{operation}: {source}")]
    Repository {
        /// Entity type the operation ran against
        entity: &'static str,
        /// Repository operation name
        operation: &'static str,
        /// The underlying store failure
        #[source]
        source: StoreError,
    },

    /// Cache backend failure; callers degrade to direct store access
    #[error("cache unavailable: {0}")]
    CacheUnavailable(String),

    /// Migration runner failure, surfaced as a single descriptive message
    #[error("migration failed: {0}")]
    MigrationFailed(String),
}

impl DataError {
    // == Repository Constructor ==
    /// Wraps a store failure with the entity and operation it occurred in.
    pub fn repository(entity: &'static str, operation: &'static str, source: StoreError) -> Self {
        DataError::Repository {
            entity,
            operation,
            source,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the data-access layer.
pub type Result<T> = std::result::Result<T, DataError>;
