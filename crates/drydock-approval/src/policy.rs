//! Per-environment approval policies.
//!
//! Policies are registered centrally and looked up by environment name.
//! Updates replace the whole policy; there are no merge semantics.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What happens when an escalation rule triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationAction {
    Notify,
    AutoApprove,
    Deny,
}

/// A single escalation rule, triggered after a pending duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationRule {
    pub trigger_after: Duration,
    pub escalate_to: Vec<String>,
    pub action: EscalationAction,
}

/// Approval rule set for one environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalPolicy {
    pub environment: String,
    pub required_approvers: u32,
    pub approver_groups: Vec<String>,
    pub timeout: Duration,
    pub escalation_rules: Vec<EscalationRule>,
}

impl ApprovalPolicy {
    /// Reference default for the production tier: 2 approvers, 24h timeout,
    /// escalate to leadership after 4h.
    pub fn production() -> Self {
        Self {
            environment: "production".to_string(),
            required_approvers: 2,
            approver_groups: vec!["platform-leads".to_string(), "sre".to_string()],
            timeout: Duration::from_secs(24 * 3600),
            escalation_rules: vec![EscalationRule {
                trigger_after: Duration::from_secs(4 * 3600),
                escalate_to: vec!["engineering-leadership".to_string()],
                action: EscalationAction::Notify,
            }],
        }
    }

    /// Reference default for staging: 1 approver, 2h timeout, auto-approve
    /// after 1h pending.
    pub fn staging() -> Self {
        Self {
            environment: "staging".to_string(),
            required_approvers: 1,
            approver_groups: vec!["developers".to_string()],
            timeout: Duration::from_secs(2 * 3600),
            escalation_rules: vec![EscalationRule {
                trigger_after: Duration::from_secs(3600),
                escalate_to: Vec::new(),
                action: EscalationAction::AutoApprove,
            }],
        }
    }

    /// Fallback policy for environments with no registered entry.
    pub fn default_for(environment: &str) -> Self {
        Self {
            environment: environment.to_string(),
            required_approvers: 1,
            approver_groups: vec!["developers".to_string()],
            timeout: Duration::from_secs(2 * 3600),
            escalation_rules: Vec::new(),
        }
    }
}

/// Central registry of approval policies, keyed by environment name.
pub struct PolicyManager {
    policies: RwLock<HashMap<String, ApprovalPolicy>>,
}

impl PolicyManager {
    /// Create a manager pre-seeded with the production and staging defaults.
    pub fn new() -> Self {
        let mut policies = HashMap::new();
        policies.insert("production".to_string(), ApprovalPolicy::production());
        policies.insert("staging".to_string(), ApprovalPolicy::staging());
        Self {
            policies: RwLock::new(policies),
        }
    }

    pub fn get_policy(&self, environment: &str) -> Option<ApprovalPolicy> {
        self.policies
            .read()
            .expect("policy lock poisoned")
            .get(environment)
            .cloned()
    }

    /// Registered policy, or the generic fallback for the environment.
    pub fn policy_or_default(&self, environment: &str) -> ApprovalPolicy {
        self.get_policy(environment)
            .unwrap_or_else(|| ApprovalPolicy::default_for(environment))
    }

    /// Replace the policy for the policy's environment wholesale.
    pub fn update_policy(&self, policy: ApprovalPolicy) {
        self.policies
            .write()
            .expect("policy lock poisoned")
            .insert(policy.environment.clone(), policy);
    }
}

impl Default for PolicyManager {
    fn default() -> Self {
        Self::new()
    }
}
