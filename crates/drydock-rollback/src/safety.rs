//! Destructive-rollback safety policy.
//!
//! The "is this rollback safe to execute destructively" decision is a
//! pluggable policy point. A full-reset plan (every target at the sentinel
//! version 0) is always safe and never reaches the policy.

use std::collections::BTreeMap;

/// Decides whether a non-sentinel rollback may be executed destructively.
pub trait SafetyPolicy: Send + Sync {
    fn allows_destructive(&self, target_versions: &BTreeMap<String, u64>) -> bool;
}

/// Reference policy: always allows. Intentionally permissive for
/// non-production tiers; do not reuse verbatim for production.
pub struct PermissiveSafetyPolicy;

impl SafetyPolicy for PermissiveSafetyPolicy {
    fn allows_destructive(&self, _target_versions: &BTreeMap<String, u64>) -> bool {
        true
    }
}

/// Strict policy for production tiers: only the full-reset sentinel is safe,
/// so every non-sentinel plan is refused.
pub struct SentinelOnlySafetyPolicy;

impl SafetyPolicy for SentinelOnlySafetyPolicy {
    fn allows_destructive(&self, target_versions: &BTreeMap<String, u64>) -> bool {
        crate::types::is_full_reset(target_versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(versions: &[(&str, u64)]) -> BTreeMap<String, u64> {
        versions
            .iter()
            .map(|(d, v)| (d.to_string(), *v))
            .collect()
    }

    #[test]
    fn test_permissive_allows_everything() {
        let policy = PermissiveSafetyPolicy;
        assert!(policy.allows_destructive(&targets(&[("inquiries", 7)])));
    }

    #[test]
    fn test_sentinel_only_refuses_versioned_targets() {
        let policy = SentinelOnlySafetyPolicy;
        assert!(policy.allows_destructive(&targets(&[("inquiries", 0)])));
        assert!(!policy.allows_destructive(&targets(&[("inquiries", 7)])));
    }
}
