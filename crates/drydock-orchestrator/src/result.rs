//! Deployment execution outcomes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use drydock_core::{DrydockError, Result};
use drydock_rollback::RollbackResult;

/// Phase a plan execution reached. Tracked per run, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentPhase {
    Created,
    PreValidated,
    ApprovalPending,
    Approved,
    Provisioned,
    PostValidated,
    Succeeded,
    RolledBack,
}

impl std::fmt::Display for DeploymentPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DeploymentPhase::Created => write!(f, "created"),
            DeploymentPhase::PreValidated => write!(f, "pre-validated"),
            DeploymentPhase::ApprovalPending => write!(f, "approval-pending"),
            DeploymentPhase::Approved => write!(f, "approved"),
            DeploymentPhase::Provisioned => write!(f, "provisioned"),
            DeploymentPhase::PostValidated => write!(f, "post-validated"),
            DeploymentPhase::Succeeded => write!(f, "succeeded"),
            DeploymentPhase::RolledBack => write!(f, "rolled-back"),
        }
    }
}

/// Outcome of one plan execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentResult {
    pub plan_id: String,
    pub environment: String,
    pub success: bool,
    /// Last phase successfully reached before completion or failure.
    pub phase_reached: DeploymentPhase,
    /// Provisioner output, when provisioning ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Best-effort rollback outcome, if one was attempted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollback: Option<RollbackResult>,
}

impl DeploymentResult {
    pub fn succeeded(plan_id: &str, environment: &str, provisioning: Value) -> Self {
        Self {
            plan_id: plan_id.to_string(),
            environment: environment.to_string(),
            success: true,
            phase_reached: DeploymentPhase::Succeeded,
            provisioning: Some(provisioning),
            error: None,
            rollback: None,
        }
    }

    pub fn failed(
        plan_id: &str,
        environment: &str,
        phase_reached: DeploymentPhase,
        error: impl Into<String>,
    ) -> Self {
        Self {
            plan_id: plan_id.to_string(),
            environment: environment.to_string(),
            success: false,
            phase_reached,
            provisioning: None,
            error: Some(error.into()),
            rollback: None,
        }
    }

    pub fn with_rollback(mut self, rollback: RollbackResult) -> Self {
        if rollback.success {
            self.phase_reached = DeploymentPhase::RolledBack;
        }
        self.rollback = Some(rollback);
        self
    }

    pub fn with_provisioning(mut self, output: Value) -> Self {
        self.provisioning = Some(output);
        self
    }
}

/// Outcome of a multi-environment run, keyed by environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiEnvironmentOutcome {
    pub results: BTreeMap<String, DeploymentResult>,
    /// Environments whose plan failed, in discovery order.
    pub failed_environments: Vec<String>,
    /// Environments never attempted (sequential mode, after a failure).
    pub skipped_environments: Vec<String>,
}

impl MultiEnvironmentOutcome {
    pub fn new() -> Self {
        Self {
            results: BTreeMap::new(),
            failed_environments: Vec::new(),
            skipped_environments: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed_environments.is_empty()
    }

    /// Convert into a `Result`, failing with an aggregate error that
    /// enumerates every failing environment.
    pub fn into_result(self) -> Result<BTreeMap<String, DeploymentResult>> {
        if self.failed_environments.is_empty() {
            Ok(self.results)
        } else {
            Err(DrydockError::MultiEnvironment {
                failed: self.failed_environments,
            })
        }
    }
}

impl Default for MultiEnvironmentOutcome {
    fn default() -> Self {
        Self::new()
    }
}
