//! Unified error model for the orchestration engine.

use thiserror::Error;

/// Errors produced anywhere in the deployment pipeline.
#[derive(Debug, Error)]
pub enum DrydockError {
    /// A required validation step failed. Non-retryable; the caller must
    /// fix the plan and resubmit.
    #[error("validation step '{step}' failed: {reason}")]
    Validation { step: String, reason: String },

    /// The approval gate resolved to something other than `approved`.
    /// Includes `pending`, which is a hard stop at this layer.
    #[error("approval not granted: status is '{status}'")]
    ApprovalNotGranted { status: String },

    /// No approval record exists for the given id.
    #[error("approval '{0}' not found")]
    ApprovalNotFound(String),

    /// The external provisioner failed for an environment.
    #[error("provisioning failed for environment '{environment}': {reason}")]
    Provisioning { environment: String, reason: String },

    /// Rollback exhausted its attempts (and any emergency fallback).
    #[error("rollback failed: {0}")]
    Rollback(String),

    /// Missing or invalid plan/engine configuration. Caller error,
    /// surfaced immediately.
    #[error("configuration error: {0}")]
    Config(String),

    /// One or more environments failed in a multi-environment run.
    #[error("deployment failed in environments: {}", failed.join(", "))]
    MultiEnvironment { failed: Vec<String> },

    /// A contract hook that is intentionally not implemented.
    #[error("operation not supported: {0}")]
    Unsupported(String),
}

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, DrydockError>;
