//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

/// How multi-environment deployments are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Execute plans in order, stopping at the first failure. Later plans
    /// are never attempted.
    #[default]
    Sequential,
    /// Launch all plans concurrently and join on all of them. A failure in
    /// one plan does not stop the others.
    Parallel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Environments that always go through the approval gate, in addition
    /// to plans that set `approval_required`.
    #[serde(default)]
    pub approval_required_environments: Vec<String>,
    /// Invoke the rollback engine best-effort after provisioning or
    /// post-deploy validation failures.
    #[serde(default)]
    pub rollback_on_failure: bool,
    #[serde(default)]
    pub mode: ExecutionMode,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            approval_required_environments: vec!["production".to_string()],
            rollback_on_failure: false,
            mode: ExecutionMode::Sequential,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.mode, ExecutionMode::Sequential);
        assert!(!config.rollback_on_failure);
        assert_eq!(config.approval_required_environments, vec!["production"]);
    }

    #[test]
    fn test_deserializes_with_defaults() {
        let config: OrchestratorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.mode, ExecutionMode::Sequential);
        assert!(config.approval_required_environments.is_empty());

        let config: OrchestratorConfig =
            serde_json::from_str(r#"{ "mode": "parallel", "rollback_on_failure": true }"#).unwrap();
        assert_eq!(config.mode, ExecutionMode::Parallel);
        assert!(config.rollback_on_failure);
    }
}
