//! Drydock Orchestrator: the end-to-end deployment pipeline.
//!
//! ```text
//! DeploymentPlan ──→ pre-deploy validation ──→ approval gate
//!                                                   │
//!        DeploymentResult ←── post-deploy ←── provisioning
//!               │             validation
//!          (on failure)            │
//!               └──── best-effort rollback ←───────┘
//! ```
//!
//! Single plans run through [`DeploymentOrchestrator::execute_plan`];
//! multi-environment sets go through `execute_multi` in sequential
//! (fail-fast) or parallel (join-all) mode. Pipeline failures come back
//! inside [`DeploymentResult`]; `Err` is reserved for malformed input.

pub mod config;
pub mod orchestrator;
pub mod result;

pub use config::{ExecutionMode, OrchestratorConfig};
pub use orchestrator::DeploymentOrchestrator;
pub use result::{DeploymentPhase, DeploymentResult, MultiEnvironmentOutcome};
