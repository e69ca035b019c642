//! Service Module
//!
//! Cache-aside orchestration shared by every entity's service.

mod generic;

// Re-export public types
pub use generic::Service;
