//! Rollback engine settings.
//!
//! The defaults are intentionally permissive and match the reference
//! behavior for non-production tiers. Production deployments should
//! disable destructive options and swap in a stricter safety policy.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackSettings {
    /// Maximum ordinary rollback attempts before escalation.
    pub max_attempts: u32,
    /// Timeout applied to each attempt independently.
    pub attempt_timeout: Duration,
    /// Pause between consecutive attempts.
    pub retry_pause: Duration,
    /// Whether non-sentinel rollbacks may run destructively at all.
    pub allow_destructive: bool,
    /// Recreate the failed target domains after retry exhaustion
    /// (separate from emergency mode).
    pub auto_recreate_on_failure: bool,
    /// Escalate to full drop-and-recreate after retry exhaustion.
    pub enable_emergency_mode: bool,
    /// The fixed domain set for full recreation.
    pub domains: Vec<String>,
}

impl Default for RollbackSettings {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            attempt_timeout: Duration::from_secs(30),
            retry_pause: Duration::from_secs(2),
            allow_destructive: true,
            auto_recreate_on_failure: true,
            enable_emergency_mode: true,
            domains: vec!["inquiries".to_string(), "applications".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_defaults() {
        let settings = RollbackSettings::default();
        assert_eq!(settings.max_attempts, 2);
        assert_eq!(settings.attempt_timeout, Duration::from_secs(30));
        assert_eq!(settings.retry_pause, Duration::from_secs(2));
        assert!(settings.allow_destructive);
        assert!(settings.auto_recreate_on_failure);
        assert!(settings.enable_emergency_mode);
        assert!(!settings.domains.is_empty());
    }
}
