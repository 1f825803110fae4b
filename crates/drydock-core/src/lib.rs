//! Drydock Core: plan data model, error model, and collaborator seams.
//!
//! The orchestration engine coordinates four concerns around an opaque
//! provisioning call:
//!
//! ```text
//! DeploymentPlan → pre-deploy validation → approval gate → provisioning
//!                                                              ↓
//!            rollback (on failure) ← post-deploy validation ←──┘
//! ```
//!
//! This crate holds what every layer shares: the [`DeploymentPlan`] model,
//! the [`DrydockError`] taxonomy, the [`Provisioner`] and [`Notifier`]
//! collaborator traits, and the [`RiskLevel`] classification.

pub mod error;
pub mod notify;
pub mod plan;
pub mod provision;
pub mod risk;

pub use error::{DrydockError, Result};
pub use notify::{LogNotifier, NoopNotifier, Notifier};
pub use plan::{
    DeploymentPlan, DeploymentSchedule, ValidationCheck, ValidationStep, ValidationType,
};
pub use provision::{DirectProvisioner, Provisioner, ProvisioningProgram};
pub use risk::RiskLevel;

/// Engine version.
pub const DRYDOCK_VERSION: &str = "1.0.0";
