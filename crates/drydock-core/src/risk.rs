//! Risk classification for deployment plans.
//!
//! The automated approval path only auto-approves low-risk plans; anything
//! above `Low` is routed to manual review.

use serde::{Deserialize, Serialize};

/// Risk level of a deployment plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// 0-30: routine change to a non-critical surface
    #[default]
    Low = 0,
    /// 31-60: schema or network topology changes
    Medium = 1,
    /// 61-80: destructive or cross-environment changes
    High = 2,
    /// 81-100: production data migrations, mass operations
    Critical = 3,
}

impl RiskLevel {
    /// Get a risk level from a score (0-100).
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=30 => RiskLevel::Low,
            31..=60 => RiskLevel::Medium,
            61..=80 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }

    /// Whether this level qualifies for the automated approval path.
    pub fn is_low(&self) -> bool {
        matches!(self, RiskLevel::Low)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
            RiskLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}
