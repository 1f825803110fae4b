//! Deployment plan data model.
//!
//! A plan is the unit of deployment work for one environment. It is created
//! by the caller, immutable during execution, and never persisted by the
//! engine itself.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::provision::ProvisioningProgram;
use crate::risk::RiskLevel;

/// Phase or category a validation step belongs to.
///
/// `PreDeploy` and `PostDeploy` are run automatically around provisioning;
/// `Security`, `Compliance` and `Contract` only run when explicitly included
/// in a phase run by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationType {
    PreDeploy,
    PostDeploy,
    Security,
    Compliance,
    Contract,
}

impl fmt::Display for ValidationType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValidationType::PreDeploy => write!(f, "pre-deploy"),
            ValidationType::PostDeploy => write!(f, "post-deploy"),
            ValidationType::Security => write!(f, "security"),
            ValidationType::Compliance => write!(f, "compliance"),
            ValidationType::Contract => write!(f, "contract"),
        }
    }
}

/// A single named check executed against an environment.
#[async_trait]
pub trait ValidationCheck: Send + Sync {
    async fn check(&self, environment: &str) -> std::result::Result<(), String>;
}

/// Plain synchronous closures are accepted as checks.
#[async_trait]
impl<F> ValidationCheck for F
where
    F: Fn(&str) -> std::result::Result<(), String> + Send + Sync,
{
    async fn check(&self, environment: &str) -> std::result::Result<(), String> {
        self(environment)
    }
}

/// A named check bound to a phase, with a per-step timeout.
#[derive(Clone)]
pub struct ValidationStep {
    pub name: String,
    pub step_type: ValidationType,
    /// Required steps abort the phase on failure; optional ones only warn.
    pub required: bool,
    pub timeout: Duration,
    pub check: Arc<dyn ValidationCheck>,
}

impl ValidationStep {
    /// Create a required step with the default 60s timeout.
    pub fn new(
        name: impl Into<String>,
        step_type: ValidationType,
        check: Arc<dyn ValidationCheck>,
    ) -> Self {
        Self {
            name: name.into(),
            step_type,
            required: true,
            timeout: Duration::from_secs(60),
            check,
        }
    }

    /// Mark the step as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Override the step timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for ValidationStep {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ValidationStep")
            .field("name", &self.name)
            .field("step_type", &self.step_type)
            .field("required", &self.required)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Optional execution schedule for a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentSchedule {
    /// When the deployment should first run.
    pub at: DateTime<Utc>,
    /// Recurrence expression, if any (interpretation is driver-defined).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<String>,
}

/// A unit of deployment work targeting one environment.
#[derive(Clone)]
pub struct DeploymentPlan {
    /// Unique plan id.
    pub id: String,
    /// Target environment name.
    pub environment: String,
    /// Ids of plans this one depends on.
    pub dependencies: Vec<String>,
    /// Ordered validation steps.
    pub validations: Vec<ValidationStep>,
    /// Force the approval gate regardless of environment configuration.
    pub approval_required: bool,
    /// Risk classification; feeds the automated approval path.
    pub risk: RiskLevel,
    /// Optional schedule; required by `schedule_deployment`.
    pub schedule: Option<DeploymentSchedule>,
    /// The opaque provisioning work.
    pub program: Arc<dyn ProvisioningProgram>,
}

impl DeploymentPlan {
    /// Create a plan with a generated id and low-risk defaults.
    pub fn new(environment: impl Into<String>, program: Arc<dyn ProvisioningProgram>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            environment: environment.into(),
            dependencies: Vec::new(),
            validations: Vec::new(),
            approval_required: false,
            risk: RiskLevel::Low,
            schedule: None,
            program,
        }
    }

    /// Set an explicit plan id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Append a validation step.
    pub fn with_validation(mut self, step: ValidationStep) -> Self {
        self.validations.push(step);
        self
    }

    /// Add a dependency on another plan id.
    pub fn with_dependency(mut self, plan_id: impl Into<String>) -> Self {
        self.dependencies.push(plan_id.into());
        self
    }

    /// Require the approval gate for this plan.
    pub fn require_approval(mut self) -> Self {
        self.approval_required = true;
        self
    }

    /// Set the risk classification.
    pub fn with_risk(mut self, risk: RiskLevel) -> Self {
        self.risk = risk;
        self
    }

    /// Attach a schedule.
    pub fn with_schedule(mut self, schedule: DeploymentSchedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// Steps belonging to the given phase, in plan order.
    pub fn steps_for(&self, phase: ValidationType) -> impl Iterator<Item = &ValidationStep> {
        self.validations.iter().filter(move |s| s.step_type == phase)
    }
}

impl fmt::Debug for DeploymentPlan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DeploymentPlan")
            .field("id", &self.id)
            .field("environment", &self.environment)
            .field("dependencies", &self.dependencies)
            .field("validations", &self.validations)
            .field("approval_required", &self.approval_required)
            .field("risk", &self.risk)
            .field("schedule", &self.schedule)
            .finish_non_exhaustive()
    }
}
