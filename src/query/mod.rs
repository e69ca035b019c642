//! Query Module
//!
//! Structured, parameter-bound query descriptors and the builder that
//! validates them.

mod builder;
mod descriptor;


// Re-export public types
pub use builder::PredicateBuilder;
pub use descriptor::{Operator, Page, QueryDescriptor, SortDirection};

// == Public Constants ==
/// Largest page size a predicate may request
pub const MAX_PAGE_SIZE: u32 = 100;
