//! Rollback data model.
//!
//! Target versions map logical domains to the version to roll back to.
//! Version `0` is the sentinel meaning "full reset to empty" for a domain
//! and is always considered safe to execute destructively.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel target version meaning "full reset to empty".
pub const FULL_RESET_VERSION: u64 = 0;

/// A set of target versions per domain, consumed once by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackPlan {
    pub target_versions: BTreeMap<String, u64>,
    pub reason: String,
    pub requested_by: String,
}

impl RollbackPlan {
    /// Whether every domain targets the full-reset sentinel.
    pub fn is_full_reset(&self) -> bool {
        is_full_reset(&self.target_versions)
    }
}

/// True when every target version is the full-reset sentinel.
pub fn is_full_reset(targets: &BTreeMap<String, u64>) -> bool {
    !targets.is_empty() && targets.values().all(|&v| v == FULL_RESET_VERSION)
}

/// Outcome of one rollback invocation. Retrying produces a new result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackResult {
    pub success: bool,
    /// Domains actually rolled back, with the version they landed on.
    pub rolled_back: BTreeMap<String, u64>,
    /// Failure reason, or the preserved original error when the rollback
    /// succeeded via schema recreation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Ordered manual follow-up steps, populated by full recreation.
    #[serde(default)]
    pub recovery_steps: Vec<String>,
}

impl RollbackResult {
    pub fn succeeded(rolled_back: BTreeMap<String, u64>) -> Self {
        Self {
            success: true,
            rolled_back,
            error: None,
            recovery_steps: Vec::new(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            rolled_back: BTreeMap::new(),
            error: Some(error.into()),
            recovery_steps: Vec::new(),
        }
    }

    /// Preserve an error alongside a successful result (recreation path).
    pub fn with_preserved_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_recovery_steps(mut self, steps: Vec<String>) -> Self {
        self.recovery_steps = steps;
        self
    }
}

/// One record from the rollback-history collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackHistoryEntry {
    pub domain: String,
    pub version: u64,
    pub executed_at: DateTime<Utc>,
    pub reason: String,
    pub requested_by: String,
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_reset_detection() {
        let mut targets = BTreeMap::new();
        targets.insert("inquiries".to_string(), 0);
        targets.insert("applications".to_string(), 0);
        assert!(is_full_reset(&targets));

        targets.insert("applications".to_string(), 3);
        assert!(!is_full_reset(&targets));

        assert!(!is_full_reset(&BTreeMap::new()));
    }

    #[test]
    fn test_preserved_error_keeps_success() {
        let mut rolled_back = BTreeMap::new();
        rolled_back.insert("inquiries".to_string(), 0);
        let result = RollbackResult::succeeded(rolled_back)
            .with_preserved_error("original rollback failure");
        assert!(result.success);
        assert!(result.error.is_some());
    }
}
