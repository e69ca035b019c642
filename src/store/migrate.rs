//! Migration Runner Contract
//!
//! The schema-migration runner is an external collaborator; the layer only
//! consumes this interface against an opaque changelog. Each call returns a
//! human-readable result string or a structured status payload, and any
//! failure surfaces as a single `MigrationFailed` message.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

// == Migration Status ==
/// Structured status payload: which changesets have run and which are pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationStatus {
    /// Changesets already applied, in changelog order
    pub applied: Vec<String>,
    /// Changesets not yet applied, in changelog order
    pub pending: Vec<String>,
}

impl MigrationStatus {
    /// True when no changesets remain to apply.
    pub fn is_up_to_date(&self) -> bool {
        self.pending.is_empty()
    }
}

// == Rollback Target ==
/// How far a rollback should unwind the changelog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target", content = "value", rename_all = "snake_case")]
pub enum RollbackTarget {
    /// Undo the last N changesets
    Count(u32),
    /// Undo every changeset applied after the named tag
    Tag(String),
    /// Undo every changeset applied after the given instant
    Date(DateTime<Utc>),
}

// == Migration Runner Trait ==
/// Interface consumed from the external migration tool.
#[async_trait]
pub trait MigrationRunner: Send + Sync {
    /// Applies every pending changeset matching the contexts and labels.
    async fn apply(&self, contexts: &[String], labels: &[String]) -> Result<String>;

    /// Rolls the changelog back to the given target.
    async fn rollback(
        &self,
        target: RollbackTarget,
        contexts: &[String],
        labels: &[String],
    ) -> Result<String>;

    /// Reports applied and pending changesets.
    async fn status(&self, contexts: &[String], labels: &[String]) -> Result<MigrationStatus>;

    /// Validates the changelog without applying anything.
    async fn validate(&self, contexts: &[String], labels: &[String]) -> Result<String>;

    /// Tags the current changelog position.
    async fn tag(&self, tag_name: &str) -> Result<String>;

    /// Clears stored changeset checksums so they recompute on next apply.
    async fn clear_checksums(&self) -> Result<String>;
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_up_to_date() {
        let status = MigrationStatus {
            applied: vec!["001-init".to_string()],
            pending: Vec::new(),
        };
        assert!(status.is_up_to_date());
    }

    #[test]
    fn test_status_with_pending() {
        let status = MigrationStatus {
            applied: vec!["001-init".to_string()],
            pending: vec!["002-add-index".to_string()],
        };
        assert!(!status.is_up_to_date());
    }

    #[test]
    fn test_rollback_target_serializes() {
        let target = RollbackTarget::Tag("v1.2".to_string());
        let json = serde_json::to_string(&target).unwrap();
        assert!(json.contains("tag"));
        assert!(json.contains("v1.2"));
    }
}
