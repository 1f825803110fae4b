//! The top-level deployment coordinator.
//!
//! Per-plan pipeline: started notification → pre-deploy validation →
//! approval gate → provisioning → post-deploy validation → succeeded
//! notification, with failure exits at every stage and optional
//! best-effort rollback after provisioning or post-deploy failures.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tokio::task::JoinSet;

use drydock_approval::{ApprovalContext, ApprovalService};
use drydock_core::{
    DeploymentPlan, DrydockError, Notifier, Provisioner, Result, ValidationType,
};
use drydock_rollback::{RollbackEngine, RollbackResult, FULL_RESET_VERSION};
use drydock_validate::ValidationRunner;

use crate::config::{ExecutionMode, OrchestratorConfig};
use crate::result::{DeploymentPhase, DeploymentResult, MultiEnvironmentOutcome};

pub struct DeploymentOrchestrator {
    provisioner: Arc<dyn Provisioner>,
    notifier: Arc<dyn Notifier>,
    validator: ValidationRunner,
    approvals: Arc<ApprovalService>,
    rollback: Option<Arc<RollbackEngine>>,
    config: OrchestratorConfig,
}

impl DeploymentOrchestrator {
    pub fn new(provisioner: Arc<dyn Provisioner>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            provisioner,
            validator: ValidationRunner::new(notifier.clone()),
            notifier,
            approvals: Arc::new(ApprovalService::new()),
            rollback: None,
            config: OrchestratorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_approvals(mut self, approvals: Arc<ApprovalService>) -> Self {
        self.approvals = approvals;
        self
    }

    /// Enable best-effort rollback after provisioning or post-deploy
    /// failures (still gated on `rollback_on_failure`).
    pub fn with_rollback(mut self, rollback: Arc<RollbackEngine>) -> Self {
        self.rollback = Some(rollback);
        self
    }

    pub fn approvals(&self) -> &ApprovalService {
        &self.approvals
    }

    /// Execute one plan end-to-end.
    ///
    /// Failures of the pipeline itself are captured in the returned
    /// [`DeploymentResult`]; `Err` is reserved for malformed plans.
    pub async fn execute_plan(&self, plan: &DeploymentPlan) -> Result<DeploymentResult> {
        if plan.environment.is_empty() {
            return Err(DrydockError::Config(
                "deployment plan has no environment".to_string(),
            ));
        }

        tracing::info!(
            plan_id = %plan.id,
            environment = %plan.environment,
            risk = %plan.risk,
            "executing deployment plan"
        );
        self.notifier
            .send_deployment_started(&plan.environment, &plan.id)
            .await;

        // Pre-deploy validation. A required failure means provisioning is
        // never attempted.
        let report = match self.validator.run(plan, ValidationType::PreDeploy).await {
            Ok(report) => report,
            Err(err) => {
                return Ok(self.fail(plan, DeploymentPhase::Created, err, None).await);
            }
        };

        // Approval gate. Any non-approved status, including pending, is a
        // hard stop at this layer.
        if plan.approval_required
            || self
                .config
                .approval_required_environments
                .contains(&plan.environment)
        {
            let ctx = ApprovalContext::new(report.all_passed());
            match self.approvals.request_approval(plan, &ctx).await {
                Ok(approval) if approval.is_approved() => {
                    tracing::info!(
                        plan_id = %plan.id,
                        approval_id = %approval.id,
                        approver = approval.approver.as_deref().unwrap_or("unknown"),
                        "deployment approved"
                    );
                }
                Ok(approval) => {
                    let err = DrydockError::ApprovalNotGranted {
                        status: approval.status.to_string(),
                    };
                    return Ok(self
                        .fail(plan, DeploymentPhase::PreValidated, err, None)
                        .await);
                }
                Err(err) => {
                    return Ok(self
                        .fail(plan, DeploymentPhase::PreValidated, err, None)
                        .await);
                }
            }
        }

        // Provisioning. Never retried here; the only failure response is
        // optional rollback.
        let output = match self
            .provisioner
            .deploy(&plan.environment, plan.program.as_ref())
            .await
        {
            Ok(output) => output,
            Err(err) => {
                let rollback = self.try_rollback(plan, &err).await;
                return Ok(self
                    .fail(plan, DeploymentPhase::Approved, err, rollback)
                    .await);
            }
        };

        // Post-deploy validation. A required failure is a deployment
        // failure even though provisioning nominally succeeded.
        if let Err(err) = self.validator.run(plan, ValidationType::PostDeploy).await {
            let rollback = self.try_rollback(plan, &err).await;
            let result = self
                .fail(plan, DeploymentPhase::Provisioned, err, rollback)
                .await
                .with_provisioning(output);
            return Ok(result);
        }

        self.notifier
            .send_deployment_succeeded(&plan.environment, &plan.id, &output)
            .await;
        Ok(DeploymentResult::succeeded(
            &plan.id,
            &plan.environment,
            output,
        ))
    }

    /// Execute plans across environments, per the configured mode.
    pub async fn execute_multi(
        self: &Arc<Self>,
        plans: Vec<DeploymentPlan>,
    ) -> Result<MultiEnvironmentOutcome> {
        let mut seen = HashSet::new();
        for plan in &plans {
            if !seen.insert(plan.environment.clone()) {
                return Err(DrydockError::Config(format!(
                    "duplicate environment '{}' in multi-environment run",
                    plan.environment
                )));
            }
        }

        match self.config.mode {
            ExecutionMode::Sequential => Ok(self.execute_sequential(plans).await),
            ExecutionMode::Parallel => Ok(self.execute_parallel(plans).await),
        }
    }

    /// In-order execution with an early-exit guarantee: no environment
    /// after a failing one is touched; those are reported as skipped.
    async fn execute_sequential(&self, plans: Vec<DeploymentPlan>) -> MultiEnvironmentOutcome {
        let mut outcome = MultiEnvironmentOutcome::new();
        let mut plans = plans.into_iter();

        for plan in plans.by_ref() {
            let environment = plan.environment.clone();
            let result = self.run_to_result(&plan).await;
            let failed = !result.success;
            outcome.results.insert(environment.clone(), result);

            if failed {
                tracing::warn!(environment, "sequential run stopping at first failure");
                outcome.failed_environments.push(environment);
                break;
            }
        }

        outcome.skipped_environments = plans.map(|p| p.environment).collect();
        outcome
    }

    /// Concurrent fan-out with a join on all plans. There is no cross-task
    /// cancellation: a failure in one plan does not stop the others.
    async fn execute_parallel(
        self: &Arc<Self>,
        plans: Vec<DeploymentPlan>,
    ) -> MultiEnvironmentOutcome {
        let mut tasks = JoinSet::new();
        for plan in plans {
            let orchestrator = Arc::clone(self);
            tasks.spawn(async move {
                let environment = plan.environment.clone();
                let result = orchestrator.run_to_result(&plan).await;
                (environment, result)
            });
        }

        let mut outcome = MultiEnvironmentOutcome::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((environment, result)) => {
                    if !result.success {
                        outcome.failed_environments.push(environment.clone());
                    }
                    outcome.results.insert(environment, result);
                }
                Err(err) => {
                    tracing::error!(error = %err, "deployment task panicked");
                }
            }
        }
        // completion order is nondeterministic; report failures stably
        outcome.failed_environments.sort();
        outcome
    }

    /// Like [`execute_plan`](Self::execute_plan) but folds malformed-plan
    /// errors into a failed result, for multi-environment collection.
    async fn run_to_result(&self, plan: &DeploymentPlan) -> DeploymentResult {
        match self.execute_plan(plan).await {
            Ok(result) => result,
            Err(err) => DeploymentResult::failed(
                &plan.id,
                &plan.environment,
                DeploymentPhase::Created,
                err.to_string(),
            ),
        }
    }

    /// Validate a plan's schedule. Scheduled execution itself is a
    /// forward-looking hook and intentionally not implemented.
    pub fn schedule_deployment(&self, plan: &DeploymentPlan) -> Result<()> {
        if plan.environment.is_empty() {
            return Err(DrydockError::Config(
                "deployment plan has no environment".to_string(),
            ));
        }
        let schedule = plan.schedule.as_ref().ok_or_else(|| {
            DrydockError::Config("deployment plan has no schedule".to_string())
        })?;

        tracing::info!(
            plan_id = %plan.id,
            environment = %plan.environment,
            at = %schedule.at,
            recurrence = ?schedule.recurrence,
            "schedule accepted; scheduled execution is not implemented"
        );
        Ok(())
    }

    /// Forward-looking hook; always reports unsupported.
    pub fn cancel_deployment(&self, deployment_id: &str) -> Result<()> {
        Err(DrydockError::Unsupported(format!(
            "cancellation of deployment '{deployment_id}' is not implemented"
        )))
    }

    /// Best-effort rollback. The outcome never overrides the original
    /// error; an engine failure is folded into a failed `RollbackResult`.
    async fn try_rollback(
        &self,
        plan: &DeploymentPlan,
        original: &DrydockError,
    ) -> Option<RollbackResult> {
        if !self.config.rollback_on_failure {
            return None;
        }
        let engine = self.rollback.as_ref()?;

        let reason = original.to_string();
        self.notifier
            .send_rollback_started(&plan.environment, &reason)
            .await;

        let targets: BTreeMap<String, u64> = engine
            .settings()
            .domains
            .iter()
            .map(|d| (d.clone(), FULL_RESET_VERSION))
            .collect();

        match engine
            .perform_rollback(targets, &reason, "orchestrator")
            .await
        {
            Ok(result) => Some(result),
            Err(err) => {
                tracing::error!(
                    environment = %plan.environment,
                    error = %err,
                    "best-effort rollback failed"
                );
                Some(RollbackResult::failed(err.to_string()))
            }
        }
    }

    /// Emit the failure notification and build the failed result. A failed
    /// rollback is appended to the message, never substituted for it.
    async fn fail(
        &self,
        plan: &DeploymentPlan,
        phase: DeploymentPhase,
        err: DrydockError,
        rollback: Option<RollbackResult>,
    ) -> DeploymentResult {
        let mut message = err.to_string();
        if let Some(rb) = &rollback {
            if !rb.success {
                let detail = rb.error.as_deref().unwrap_or("unknown");
                message = format!("{message}; rollback failed: {detail}");
            }
        }

        tracing::error!(
            plan_id = %plan.id,
            environment = %plan.environment,
            phase = %phase,
            error = %message,
            "deployment failed"
        );
        self.notifier
            .send_deployment_failed(&plan.environment, &plan.id, &message)
            .await;

        let mut result = DeploymentResult::failed(&plan.id, &plan.environment, phase, message);
        if let Some(rb) = rollback {
            result = result.with_rollback(rb);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use drydock_core::{DeploymentSchedule, NoopNotifier, ProvisioningProgram};
    use serde_json::{json, Value};

    struct NoopProgram;

    #[async_trait]
    impl ProvisioningProgram for NoopProgram {
        async fn provision(&self, _environment: &str) -> std::result::Result<Value, String> {
            Ok(json!({}))
        }
    }

    fn orchestrator() -> DeploymentOrchestrator {
        DeploymentOrchestrator::new(
            Arc::new(drydock_core::DirectProvisioner),
            Arc::new(NoopNotifier),
        )
    }

    #[test]
    fn test_schedule_requires_a_schedule() {
        let plan = DeploymentPlan::new("staging", Arc::new(NoopProgram));
        let err = orchestrator().schedule_deployment(&plan).unwrap_err();
        assert!(matches!(err, DrydockError::Config(_)));

        let plan = plan.with_schedule(DeploymentSchedule {
            at: Utc::now(),
            recurrence: None,
        });
        orchestrator().schedule_deployment(&plan).unwrap();
    }

    #[test]
    fn test_cancel_is_unsupported() {
        let err = orchestrator().cancel_deployment("dep-1").unwrap_err();
        assert!(matches!(err, DrydockError::Unsupported(_)));
    }

    #[tokio::test]
    async fn test_empty_environment_is_a_config_error() {
        let plan = DeploymentPlan::new("", Arc::new(NoopProgram));
        let err = orchestrator().execute_plan(&plan).await.unwrap_err();
        assert!(matches!(err, DrydockError::Config(_)));
    }

    #[tokio::test]
    async fn test_duplicate_environments_rejected() {
        let orchestrator = Arc::new(orchestrator());
        let plans = vec![
            DeploymentPlan::new("staging", Arc::new(NoopProgram)),
            DeploymentPlan::new("staging", Arc::new(NoopProgram)),
        ];
        let err = orchestrator.execute_multi(plans).await.unwrap_err();
        assert!(matches!(err, DrydockError::Config(_)));
    }
}
