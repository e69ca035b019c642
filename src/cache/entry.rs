//! Cache Entry Module
//!
//! A single stored result with its insertion timestamp. Entries have no
//! TTL of their own; their lifetime is bounded by point invalidation and
//! the scheduled sweep.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

// == Cache Entry ==
/// One cached operation result in canonical JSON form.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cached result
    pub value: Value,
    /// When the entry was inserted
    pub inserted_at: DateTime<Utc>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry inserted now.
    pub fn new(value: Value) -> Self {
        Self {
            value,
            inserted_at: Utc::now(),
        }
    }

    // == Age ==
    /// How long ago the entry was inserted.
    pub fn age(&self) -> Duration {
        Utc::now() - self.inserted_at
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_holds_value() {
        let entry = CacheEntry::new(json!({"id": 1, "name": "Electronics"}));
        assert_eq!(entry.value["name"], "Electronics");
    }

    #[test]
    fn test_entry_age_is_non_negative() {
        let entry = CacheEntry::new(json!(null));
        assert!(entry.age() >= Duration::zero());
    }
}
