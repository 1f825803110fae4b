//! Approval outcomes and request context.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Status of an approval request.
///
/// `Pending` is the only non-terminal state; a result transitions from it to
/// exactly one terminal state, never more than one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Denied,
    Expired,
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "pending"),
            ApprovalStatus::Approved => write!(f, "approved"),
            ApprovalStatus::Denied => write!(f, "denied"),
            ApprovalStatus::Expired => write!(f, "expired"),
        }
    }
}

/// Outcome of one approval request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalResult {
    pub id: String,
    pub status: ApprovalStatus,
    /// Who resolved the request, if resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comments: Vec<String>,
    /// Conditions the approver attached to the decision.
    #[serde(default)]
    pub conditions: Vec<String>,
}

impl ApprovalResult {
    pub fn pending(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: ApprovalStatus::Pending,
            approver: None,
            approved_at: None,
            comments: Vec::new(),
            conditions: Vec::new(),
        }
    }

    pub fn approved(id: impl Into<String>, approver: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: ApprovalStatus::Approved,
            approver: Some(approver.into()),
            approved_at: Some(Utc::now()),
            comments: Vec::new(),
            conditions: Vec::new(),
        }
    }

    pub fn denied(id: impl Into<String>, approver: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: ApprovalStatus::Denied,
            approver: Some(approver.into()),
            approved_at: None,
            comments: Vec::new(),
            conditions: Vec::new(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comments.push(comment.into());
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn is_approved(&self) -> bool {
        self.status == ApprovalStatus::Approved
    }
}

/// Facts the orchestrator supplies alongside an approval request.
///
/// The clock is injected so the business-hours condition is testable.
#[derive(Debug, Clone)]
pub struct ApprovalContext {
    /// Whether all pre-deploy validations passed for this run.
    pub prevalidation_passed: bool,
    pub now: DateTime<Utc>,
}

impl ApprovalContext {
    pub fn new(prevalidation_passed: bool) -> Self {
        Self {
            prevalidation_passed,
            now: Utc::now(),
        }
    }

    /// Context with an explicit clock, for tests.
    pub fn at(prevalidation_passed: bool, now: DateTime<Utc>) -> Self {
        Self {
            prevalidation_passed,
            now,
        }
    }
}

/// Environment tier, used to select the approval strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentTier {
    Production,
    NonProduction,
}

/// Maps environment names to tiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentClassifier {
    /// Names treated as the production tier.
    pub production_environments: Vec<String>,
}

impl Default for EnvironmentClassifier {
    fn default() -> Self {
        Self {
            production_environments: vec!["production".to_string(), "prod".to_string()],
        }
    }
}

impl EnvironmentClassifier {
    pub fn tier(&self, environment: &str) -> EnvironmentTier {
        if self.is_production(environment) {
            EnvironmentTier::Production
        } else {
            EnvironmentTier::NonProduction
        }
    }

    pub fn is_production(&self, environment: &str) -> bool {
        self.production_environments
            .iter()
            .any(|e| e == environment)
    }
}

/// Daily window during which automated approval is suppressed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BusinessHours {
    /// Inclusive start hour, UTC.
    pub start_hour: u32,
    /// Exclusive end hour, UTC.
    pub end_hour: u32,
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 17,
        }
    }
}

impl BusinessHours {
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        let hour = t.hour();
        hour >= self.start_hour && hour < self.end_hour
    }
}
