//! Drydock Validate: phase-scoped validation execution.
//!
//! [`ValidationRunner`] iterates a plan's steps for one phase, bounds each
//! check with its configured timeout, and classifies pass/fail against the
//! step's required flag. No retries happen at this layer.

pub mod report;
pub mod runner;

pub use report::{StepOutcome, ValidationReport};
pub use runner::ValidationRunner;
