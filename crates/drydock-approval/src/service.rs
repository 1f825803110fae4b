//! Approval subsystem facade.
//!
//! Selects a handler by environment tier (manual for production, automated
//! otherwise), records every action in the audit store, and exposes polling
//! by approval id.

use std::collections::HashMap;
use std::sync::Arc;

use drydock_core::{DeploymentPlan, DrydockError, Result};

use crate::audit::{ApprovalAuditEntry, AuditStore, InMemoryAuditStore};
use crate::handler::{
    ApprovalHandler, ApprovalRegistry, AutomatedApprovalHandler, ManualApprovalHandler,
};
use crate::policy::PolicyManager;
use crate::types::{
    ApprovalContext, ApprovalResult, BusinessHours, EnvironmentClassifier, EnvironmentTier,
};

pub struct ApprovalService {
    handlers: HashMap<EnvironmentTier, Arc<dyn ApprovalHandler>>,
    classifier: EnvironmentClassifier,
    policies: Arc<PolicyManager>,
    audit: Arc<dyn AuditStore>,
    registry: Arc<ApprovalRegistry>,
}

impl ApprovalService {
    /// Build the reference wiring: manual handler for production, automated
    /// for everything else, backed by an in-memory audit store.
    pub fn new() -> Self {
        Self::with_stores(Arc::new(PolicyManager::new()), Arc::new(InMemoryAuditStore::new()))
    }

    /// Build with injected policy and audit stores.
    pub fn with_stores(policies: Arc<PolicyManager>, audit: Arc<dyn AuditStore>) -> Self {
        let classifier = EnvironmentClassifier::default();
        let registry = Arc::new(ApprovalRegistry::new());

        let mut handlers: HashMap<EnvironmentTier, Arc<dyn ApprovalHandler>> = HashMap::new();
        handlers.insert(
            EnvironmentTier::Production,
            Arc::new(ManualApprovalHandler::new(policies.clone(), registry.clone())),
        );
        handlers.insert(
            EnvironmentTier::NonProduction,
            Arc::new(AutomatedApprovalHandler::new(
                classifier.clone(),
                BusinessHours::default(),
                registry.clone(),
            )),
        );

        Self {
            handlers,
            classifier,
            policies,
            audit,
            registry,
        }
    }

    /// Replace the handler for a tier. Intended for startup wiring.
    pub fn with_handler(mut self, tier: EnvironmentTier, handler: Arc<dyn ApprovalHandler>) -> Self {
        self.handlers.insert(tier, handler);
        self
    }

    /// Override which environment names count as production.
    pub fn with_classifier(mut self, classifier: EnvironmentClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn policies(&self) -> &PolicyManager {
        &self.policies
    }

    pub fn audit(&self) -> &dyn AuditStore {
        self.audit.as_ref()
    }

    /// Decide whether `plan` may proceed, recording the request and its
    /// outcome in the audit log.
    pub async fn request_approval(
        &self,
        plan: &DeploymentPlan,
        ctx: &ApprovalContext,
    ) -> Result<ApprovalResult> {
        let tier = self.classifier.tier(&plan.environment);
        let handler = self
            .handlers
            .get(&tier)
            .ok_or_else(|| {
                DrydockError::Config(format!("no approval handler registered for {tier:?}"))
            })?;

        let result = handler.request_approval(plan, ctx).await?;

        self.audit.append(
            ApprovalAuditEntry::new(
                &result.id,
                &plan.environment,
                "approval_requested",
                "orchestrator",
            )
            .with_details(format!("plan {}", plan.id)),
        );
        self.audit.append(
            ApprovalAuditEntry::new(
                &result.id,
                &plan.environment,
                result.status.to_string(),
                result.approver.as_deref().unwrap_or("system"),
            )
            .with_details(result.comments.join("; ")),
        );

        Ok(result)
    }

    /// Poll a previously requested approval.
    pub async fn check_approval_status(&self, approval_id: &str) -> Result<ApprovalResult> {
        self.registry
            .get(approval_id)
            .ok_or_else(|| DrydockError::ApprovalNotFound(approval_id.to_string()))
    }

    /// All audit entries for an environment, in append order.
    pub fn approval_history(&self, environment: &str) -> Vec<ApprovalAuditEntry> {
        self.audit.history(environment)
    }
}

impl Default for ApprovalService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ApprovalStatus;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use drydock_core::{ProvisioningProgram, RiskLevel};
    use serde_json::{json, Value};

    struct NoopProgram;

    #[async_trait]
    impl ProvisioningProgram for NoopProgram {
        async fn provision(&self, _environment: &str) -> std::result::Result<Value, String> {
            Ok(json!({}))
        }
    }

    fn plan(environment: &str) -> DeploymentPlan {
        DeploymentPlan::new(environment, Arc::new(NoopProgram))
    }

    fn off_hours_ctx() -> ApprovalContext {
        ApprovalContext::at(true, Utc.with_ymd_and_hms(2024, 6, 3, 3, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_production_routes_to_manual_handler() {
        let service = ApprovalService::new();
        let result = service
            .request_approval(&plan("production"), &off_hours_ctx())
            .await
            .unwrap();
        // manual handler resolves with the system actor
        assert_eq!(result.approver.as_deref(), Some("system"));
    }

    #[tokio::test]
    async fn test_non_production_routes_to_automated_handler() {
        let service = ApprovalService::new();
        let result = service
            .request_approval(&plan("staging"), &off_hours_ctx())
            .await
            .unwrap();
        assert_eq!(result.approver.as_deref(), Some("automated-system"));
    }

    #[tokio::test]
    async fn test_audit_records_request_and_outcome() {
        let service = ApprovalService::new();
        service
            .request_approval(&plan("staging"), &off_hours_ctx())
            .await
            .unwrap();

        let history = service.approval_history("staging");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].action, "approval_requested");
        assert_eq!(history[1].action, "approved");
    }

    #[tokio::test]
    async fn test_history_idempotent_without_new_actions() {
        let service = ApprovalService::new();
        service
            .request_approval(&plan("staging"), &off_hours_ctx())
            .await
            .unwrap();

        let first: Vec<String> = service
            .approval_history("staging")
            .into_iter()
            .map(|e| e.action)
            .collect();
        let second: Vec<String> = service
            .approval_history("staging")
            .into_iter()
            .map(|e| e.action)
            .collect();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_check_status_after_request() {
        let service = ApprovalService::new();
        let result = service
            .request_approval(
                &plan("staging").with_risk(RiskLevel::High),
                &off_hours_ctx(),
            )
            .await
            .unwrap();
        assert_eq!(result.status, ApprovalStatus::Pending);

        let polled = service.check_approval_status(&result.id).await.unwrap();
        assert_eq!(polled.status, ApprovalStatus::Pending);
    }
}
