//! Cache Key Module
//!
//! Deterministic key derivation from an operation name and its ordered,
//! key-relevant arguments. Two logically identical calls always produce
//! the same key; JSON escaping keeps distinct argument lists from
//! colliding.

use serde::Serialize;

use crate::error::{DataError, Result};

// == Key Builder ==
/// Builds a cache key of the form `operation(arg1,arg2,...)` where each
/// argument is its canonical JSON serialization.
///
/// Key derivation is explicit: every operation declares exactly the
/// arguments that distinguish its results, in a fixed order.
#[derive(Debug)]
pub struct KeyBuilder {
    operation: String,
    parts: std::result::Result<Vec<String>, String>,
}

impl KeyBuilder {
    // == Constructor ==
    /// Starts a key for the named operation.
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            parts: Ok(Vec::new()),
        }
    }

    // == Argument ==
    /// Appends one key-relevant argument.
    pub fn arg<A: Serialize + ?Sized>(mut self, value: &A) -> Self {
        if let Ok(parts) = self.parts.as_mut() {
            match serde_json::to_string(value) {
                Ok(rendered) => parts.push(rendered),
                Err(err) => self.parts = Err(err.to_string()),
            }
        }
        self
    }

    // == Build ==
    /// Produces the key, or `CacheUnavailable` when an argument could not
    /// be serialized.
    pub fn build(self) -> Result<String> {
        match self.parts {
            Ok(parts) => Ok(format!("{}({})", self.operation, parts.join(","))),
            Err(message) => Err(DataError::CacheUnavailable(format!(
                "cache key for '{}' could not be derived: {}",
                self.operation, message
            ))),
        }
    }
}
