//! Approval handler strategies.
//!
//! Two reference strategies exist: manual (production tier) and automated
//! (everything else). Both record their results in a shared registry so a
//! previously requested approval can be polled by id.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use drydock_core::{DeploymentPlan, DrydockError, Result};

use crate::policy::PolicyManager;
use crate::types::{ApprovalContext, ApprovalResult, BusinessHours, EnvironmentClassifier};

/// Strategy interface: request a decision, or poll a previous one.
#[async_trait]
pub trait ApprovalHandler: Send + Sync {
    async fn request_approval(
        &self,
        plan: &DeploymentPlan,
        ctx: &ApprovalContext,
    ) -> Result<ApprovalResult>;

    async fn check_approval_status(&self, approval_id: &str) -> Result<ApprovalResult>;
}

/// Shared registry of issued approval results, keyed by approval id.
///
/// Lookup/insert only; historical results are never mutated in place.
pub struct ApprovalRegistry {
    results: RwLock<HashMap<String, ApprovalResult>>,
}

impl ApprovalRegistry {
    pub fn new() -> Self {
        Self {
            results: RwLock::new(HashMap::new()),
        }
    }

    pub fn record(&self, result: &ApprovalResult) {
        self.results
            .write()
            .expect("registry lock poisoned")
            .insert(result.id.clone(), result.clone());
    }

    pub fn get(&self, approval_id: &str) -> Option<ApprovalResult> {
        self.results
            .read()
            .expect("registry lock poisoned")
            .get(approval_id)
            .cloned()
    }
}

impl Default for ApprovalRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Manual approval strategy for the production tier.
///
/// Creates a pending approval drawn from the environment's policy, then
/// immediately resolves it with a system actor. This is the seam where a
/// real approval UI or channel would be substituted; the immediate
/// resolution is a stub, not a design requirement.
pub struct ManualApprovalHandler {
    policies: Arc<PolicyManager>,
    registry: Arc<ApprovalRegistry>,
}

impl ManualApprovalHandler {
    pub fn new(policies: Arc<PolicyManager>, registry: Arc<ApprovalRegistry>) -> Self {
        Self { policies, registry }
    }
}

#[async_trait]
impl ApprovalHandler for ManualApprovalHandler {
    async fn request_approval(
        &self,
        plan: &DeploymentPlan,
        _ctx: &ApprovalContext,
    ) -> Result<ApprovalResult> {
        let policy = self.policies.policy_or_default(&plan.environment);
        let approval_id = uuid::Uuid::new_v4().to_string();

        tracing::info!(
            approval_id = %approval_id,
            environment = %plan.environment,
            plan_id = %plan.id,
            required_approvers = policy.required_approvers,
            approver_groups = ?policy.approver_groups,
            "manual approval requested"
        );
        self.registry.record(&ApprovalResult::pending(&approval_id));

        // No external approval channel is wired in; resolve immediately.
        let result = ApprovalResult::approved(&approval_id, "system")
            .with_comment("auto-resolved: no external approval channel configured");
        self.registry.record(&result);
        Ok(result)
    }

    async fn check_approval_status(&self, approval_id: &str) -> Result<ApprovalResult> {
        self.registry
            .get(approval_id)
            .ok_or_else(|| DrydockError::ApprovalNotFound(approval_id.to_string()))
    }
}

/// Automated approval strategy for non-production tiers.
///
/// Auto-approves only when every condition holds: non-production tier,
/// low-risk plan, passing pre-deploy validations, and a clock outside the
/// business-hours window. Evaluation short-circuits on the first failing
/// condition, whose name is logged for diagnosability.
pub struct AutomatedApprovalHandler {
    classifier: EnvironmentClassifier,
    business_hours: BusinessHours,
    registry: Arc<ApprovalRegistry>,
}

impl AutomatedApprovalHandler {
    pub fn new(
        classifier: EnvironmentClassifier,
        business_hours: BusinessHours,
        registry: Arc<ApprovalRegistry>,
    ) -> Self {
        Self {
            classifier,
            business_hours,
            registry,
        }
    }

    fn first_failing_condition(
        &self,
        plan: &DeploymentPlan,
        ctx: &ApprovalContext,
    ) -> Option<&'static str> {
        if self.classifier.is_production(&plan.environment) {
            Some("environment-tier")
        } else if !plan.risk.is_low() {
            Some("risk-class")
        } else if !ctx.prevalidation_passed {
            Some("pre-deploy-validation")
        } else if self.business_hours.contains(ctx.now) {
            Some("business-hours")
        } else {
            None
        }
    }
}

#[async_trait]
impl ApprovalHandler for AutomatedApprovalHandler {
    async fn request_approval(
        &self,
        plan: &DeploymentPlan,
        ctx: &ApprovalContext,
    ) -> Result<ApprovalResult> {
        let approval_id = uuid::Uuid::new_v4().to_string();

        let result = match self.first_failing_condition(plan, ctx) {
            None => {
                tracing::info!(
                    approval_id = %approval_id,
                    environment = %plan.environment,
                    plan_id = %plan.id,
                    "all automated approval conditions hold, auto-approving"
                );
                ApprovalResult::approved(&approval_id, "automated-system")
            }
            Some(condition) => {
                tracing::info!(
                    approval_id = %approval_id,
                    environment = %plan.environment,
                    plan_id = %plan.id,
                    condition,
                    "automated approval declined"
                );
                ApprovalResult::pending(&approval_id).with_comment(format!(
                    "manual approval required: condition '{condition}' did not hold"
                ))
            }
        };

        self.registry.record(&result);
        Ok(result)
    }

    async fn check_approval_status(&self, approval_id: &str) -> Result<ApprovalResult> {
        self.registry
            .get(approval_id)
            .ok_or_else(|| DrydockError::ApprovalNotFound(approval_id.to_string()))
    }
}
