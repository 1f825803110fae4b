//! Drydock Approval: the gate between validation and provisioning.
//!
//! ```text
//! DeploymentPlan → tier classification → handler strategy → ApprovalResult
//!                        ↓                     ↓                  ↓
//!                  Production/Non-Prod    manual/automated    Audit Trail
//! ```
//!
//! Handler selection is a mapping from environment tier to strategy,
//! constructed once at startup. Every request and outcome is appended to
//! the [`AuditStore`], which is never mutated in place.

pub mod audit;
pub mod handler;
pub mod policy;
pub mod service;
pub mod types;

pub use audit::{ApprovalAuditEntry, AuditStore, InMemoryAuditStore};
pub use handler::{
    ApprovalHandler, ApprovalRegistry, AutomatedApprovalHandler, ManualApprovalHandler,
};
pub use policy::{ApprovalPolicy, EscalationAction, EscalationRule, PolicyManager};
pub use service::ApprovalService;
pub use types::{
    ApprovalContext, ApprovalResult, ApprovalStatus, BusinessHours, EnvironmentClassifier,
    EnvironmentTier,
};
