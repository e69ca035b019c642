//! Repository Module
//!
//! Stateless, generic store-execution layer shared by every entity type.

mod generic;

// Re-export public types
pub use generic::Repository;
