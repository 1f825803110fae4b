//! Append-only approval audit log.
//!
//! Entries are never mutated or deleted. The store is a trait so a driver
//! can substitute a persistent implementation without touching orchestration
//! logic; the in-memory store is safe under parallel multi-environment runs.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable record of one approval action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalAuditEntry {
    pub timestamp: DateTime<Utc>,
    pub approval_id: String,
    pub environment: String,
    /// Action taken, e.g. `approval_requested`, `approved`, `pending`.
    pub action: String,
    pub actor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApprovalAuditEntry {
    pub fn new(
        approval_id: impl Into<String>,
        environment: impl Into<String>,
        action: impl Into<String>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            approval_id: approval_id.into(),
            environment: environment.into(),
            action: action.into(),
            actor: actor.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Append + query seam over the audit log.
pub trait AuditStore: Send + Sync {
    fn append(&self, entry: ApprovalAuditEntry);

    /// All entries for an environment, in append order. No pagination.
    fn history(&self, environment: &str) -> Vec<ApprovalAuditEntry>;
}

/// Reference in-memory store.
pub struct InMemoryAuditStore {
    entries: RwLock<Vec<ApprovalAuditEntry>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryAuditStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditStore for InMemoryAuditStore {
    fn append(&self, entry: ApprovalAuditEntry) {
        self.entries
            .write()
            .expect("audit lock poisoned")
            .push(entry);
    }

    fn history(&self, environment: &str) -> Vec<ApprovalAuditEntry> {
        self.entries
            .read()
            .expect("audit lock poisoned")
            .iter()
            .filter(|e| e.environment == environment)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_preserves_append_order() {
        let store = InMemoryAuditStore::new();
        store.append(ApprovalAuditEntry::new("ap-1", "staging", "approval_requested", "system"));
        store.append(ApprovalAuditEntry::new("ap-1", "staging", "approved", "alice"));
        store.append(ApprovalAuditEntry::new("ap-2", "production", "approval_requested", "system"));

        let staging = store.history("staging");
        assert_eq!(staging.len(), 2);
        assert_eq!(staging[0].action, "approval_requested");
        assert_eq!(staging[1].action, "approved");

        assert_eq!(store.history("production").len(), 1);
    }

    #[test]
    fn test_history_is_idempotent() {
        let store = InMemoryAuditStore::new();
        store.append(ApprovalAuditEntry::new("ap-1", "staging", "approved", "alice"));

        let first = store.history("staging");
        let second = store.history("staging");
        assert_eq!(first.len(), second.len());
        assert_eq!(first[0].approval_id, second[0].approval_id);
        assert_eq!(first[0].action, second[0].action);
    }
}
