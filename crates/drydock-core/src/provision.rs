//! Provisioning collaborator seam.
//!
//! The engine treats resource materialization as an opaque program: it invokes
//! it once per plan, never retries it itself, and wraps failures with the
//! environment name.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{DrydockError, Result};

/// Opaque provisioning work carried by a [`DeploymentPlan`](crate::DeploymentPlan).
///
/// The actual container/network/volume/secret creation lives behind this
/// trait, outside the orchestration core.
#[async_trait]
pub trait ProvisioningProgram: Send + Sync {
    /// Run the program against an environment, returning the provisioner's
    /// opaque output on success.
    async fn provision(&self, environment: &str) -> std::result::Result<Value, String>;
}

/// The external provisioning collaborator.
///
/// Potentially long-running; idempotency is the collaborator's concern, not
/// the orchestrator's.
#[async_trait]
pub trait Provisioner: Send + Sync {
    async fn deploy(
        &self,
        environment: &str,
        program: &dyn ProvisioningProgram,
    ) -> Result<Value>;
}

/// Provisioner that invokes the plan's program directly in-process.
///
/// Drivers that route provisioning through a remote service substitute their
/// own [`Provisioner`] implementation.
pub struct DirectProvisioner;

#[async_trait]
impl Provisioner for DirectProvisioner {
    async fn deploy(
        &self,
        environment: &str,
        program: &dyn ProvisioningProgram,
    ) -> Result<Value> {
        program
            .provision(environment)
            .await
            .map_err(|reason| DrydockError::Provisioning {
                environment: environment.to_string(),
                reason,
            })
    }
}
