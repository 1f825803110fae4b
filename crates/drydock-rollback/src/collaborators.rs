//! External collaborator seams for the rollback engine.
//!
//! The actual schema/version mutation logic lives behind these traits,
//! outside the orchestration core.

use std::collections::BTreeMap;

use async_trait::async_trait;

use drydock_core::Result;

use crate::types::{RollbackHistoryEntry, RollbackPlan, RollbackResult};

/// Builds and executes rollback plans.
#[async_trait]
pub trait RollbackPlanner: Send + Sync {
    async fn create_rollback_plan(
        &self,
        target_versions: &BTreeMap<String, u64>,
        reason: &str,
        requested_by: &str,
    ) -> Result<RollbackPlan>;

    async fn execute_rollback(&self, plan: &RollbackPlan) -> Result<RollbackResult>;
}

/// Schema administration for emergency destructive recovery.
#[async_trait]
pub trait SchemaAdmin: Send + Sync {
    /// Resolve the schema name for a domain. Used by capability dry runs.
    fn resolve_schema(&self, domain: &str) -> Result<String>;

    /// Drop and recreate a domain's schema from scratch. Destroys all data
    /// in that domain.
    async fn recreate_schema(&self, domain: &str) -> Result<()>;
}

/// Read-only access to past rollback records.
#[async_trait]
pub trait RollbackHistoryStore: Send + Sync {
    async fn history(&self, domain: &str, limit: usize) -> Result<Vec<RollbackHistoryEntry>>;
}
