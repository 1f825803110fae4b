//! Per-phase validation reports.

use serde::{Deserialize, Serialize};

use drydock_core::ValidationType;

/// Outcome of one executed validation step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    pub name: String,
    pub step_type: ValidationType,
    pub required: bool,
    pub passed: bool,
    /// Failure reason, if the step failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall-clock execution time.
    pub elapsed_ms: u64,
}

/// Result of running one phase of a plan's validations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub phase: ValidationType,
    pub outcomes: Vec<StepOutcome>,
}

impl ValidationReport {
    pub fn new(phase: ValidationType) -> Self {
        Self {
            phase,
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: StepOutcome) {
        self.outcomes.push(outcome);
    }

    /// Whether every executed step (required or optional) passed.
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    /// Steps that failed, in execution order.
    pub fn failures(&self) -> Vec<&StepOutcome> {
        self.outcomes.iter().filter(|o| !o.passed).collect()
    }
}
