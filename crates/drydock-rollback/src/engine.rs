//! Rollback engine: bounded retry with destructive fallback.
//!
//! Escalation order after the retry loop exhausts:
//! emergency mode (drop and recreate every target domain, success if at
//! least one domain recovers) takes precedence over auto-recreate (recreate
//! exactly the failed target set, all domains must recover). Both paths
//! preserve the original rollback error in the result for visibility.

use std::collections::BTreeMap;
use std::sync::Arc;

use drydock_core::{DrydockError, Result};

use crate::collaborators::{RollbackHistoryStore, RollbackPlanner, SchemaAdmin};
use crate::safety::{PermissiveSafetyPolicy, SafetyPolicy};
use crate::settings::RollbackSettings;
use crate::types::{RollbackHistoryEntry, RollbackPlan, RollbackResult, FULL_RESET_VERSION};

pub struct RollbackEngine {
    planner: Arc<dyn RollbackPlanner>,
    schemas: Arc<dyn SchemaAdmin>,
    history: Arc<dyn RollbackHistoryStore>,
    safety: Arc<dyn SafetyPolicy>,
    settings: RollbackSettings,
}

impl RollbackEngine {
    pub fn new(
        planner: Arc<dyn RollbackPlanner>,
        schemas: Arc<dyn SchemaAdmin>,
        history: Arc<dyn RollbackHistoryStore>,
    ) -> Self {
        Self {
            planner,
            schemas,
            history,
            safety: Arc::new(PermissiveSafetyPolicy),
            settings: RollbackSettings::default(),
        }
    }

    /// Swap in a stricter safety policy.
    pub fn with_safety_policy(mut self, safety: Arc<dyn SafetyPolicy>) -> Self {
        self.safety = safety;
        self
    }

    pub fn with_settings(mut self, settings: RollbackSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &RollbackSettings {
        &self.settings
    }

    /// Revert the given domains to their target versions.
    pub async fn perform_rollback(
        &self,
        target_versions: BTreeMap<String, u64>,
        reason: &str,
        requested_by: &str,
    ) -> Result<RollbackResult> {
        if target_versions.is_empty() {
            return Err(DrydockError::Config(
                "rollback requested with no target versions".to_string(),
            ));
        }

        let plan = self
            .planner
            .create_rollback_plan(&target_versions, reason, requested_by)
            .await?;

        // A full reset is always safe; anything else is the safety policy's call.
        let safe = plan.is_full_reset() || self.safety.allows_destructive(&target_versions);
        if !safe && !self.settings.allow_destructive {
            return Err(DrydockError::Rollback(format!(
                "rollback refused: targets are not destructive-safe and destructive \
                 rollback is disabled (reason: {reason})"
            )));
        }

        match self.execute_with_retry(&plan).await {
            Ok(result) => Ok(result),
            Err(err) if self.settings.enable_emergency_mode => {
                self.emergency_rollback(&target_versions, &err).await
            }
            Err(err) if self.settings.auto_recreate_on_failure => {
                self.recreate_failed_targets(&target_versions, &err).await
            }
            Err(err) => Err(err),
        }
    }

    /// Attempt the plan up to `max_attempts` times, each attempt under its
    /// own timeout, pausing between attempts. Returns on first success.
    async fn execute_with_retry(&self, plan: &RollbackPlan) -> Result<RollbackResult> {
        let mut last_error: Option<DrydockError> = None;

        for attempt in 1..=self.settings.max_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.settings.retry_pause).await;
            }

            let outcome = tokio::time::timeout(
                self.settings.attempt_timeout,
                self.planner.execute_rollback(plan),
            )
            .await;

            match outcome {
                Ok(Ok(result)) if result.success => {
                    tracing::info!(attempt, "rollback succeeded");
                    return Ok(result);
                }
                Ok(Ok(result)) => {
                    let reason = result
                        .error
                        .unwrap_or_else(|| "rollback reported failure".to_string());
                    tracing::warn!(attempt, reason, "rollback attempt failed");
                    last_error = Some(DrydockError::Rollback(reason));
                }
                Ok(Err(err)) => {
                    tracing::warn!(attempt, error = %err, "rollback attempt errored");
                    last_error = Some(err);
                }
                Err(_) => {
                    let reason = format!(
                        "attempt {attempt} timed out after {:?}",
                        self.settings.attempt_timeout
                    );
                    tracing::warn!(attempt, reason, "rollback attempt timed out");
                    last_error = Some(DrydockError::Rollback(reason));
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| DrydockError::Rollback("no rollback attempts were made".into())))
    }

    /// Drop and recreate every target domain's schema. All data in those
    /// domains is lost. Succeeds if at least one domain recovers.
    async fn emergency_rollback(
        &self,
        target_versions: &BTreeMap<String, u64>,
        original: &DrydockError,
    ) -> Result<RollbackResult> {
        tracing::warn!(
            domains = ?target_versions.keys().collect::<Vec<_>>(),
            "entering emergency rollback: schemas will be dropped and recreated"
        );

        let mut rolled_back = BTreeMap::new();
        let mut failures = Vec::new();

        for domain in target_versions.keys() {
            match self.schemas.recreate_schema(domain).await {
                Ok(()) => {
                    tracing::info!(domain, "emergency recreation succeeded");
                    rolled_back.insert(domain.clone(), FULL_RESET_VERSION);
                }
                Err(err) => {
                    tracing::error!(domain, error = %err, "emergency recreation failed");
                    failures.push(format!("{domain}: {err}"));
                }
            }
        }

        if rolled_back.is_empty() {
            return Err(DrydockError::Rollback(format!(
                "emergency rollback failed for all domains ({}); manual operator \
                 intervention required; original error: {original}",
                failures.join("; ")
            )));
        }

        Ok(RollbackResult::succeeded(rolled_back).with_preserved_error(original.to_string()))
    }

    /// Recreate exactly the domains named in the failed target set. Every
    /// domain must recover; the original error stays in the result.
    async fn recreate_failed_targets(
        &self,
        target_versions: &BTreeMap<String, u64>,
        original: &DrydockError,
    ) -> Result<RollbackResult> {
        tracing::warn!("rollback retries exhausted, recreating target domains");

        let mut rolled_back = BTreeMap::new();
        for domain in target_versions.keys() {
            self.schemas.recreate_schema(domain).await.map_err(|err| {
                DrydockError::Rollback(format!(
                    "recreation of domain '{domain}' failed after rollback exhaustion: \
                     {err}; original error: {original}"
                ))
            })?;
            rolled_back.insert(domain.clone(), FULL_RESET_VERSION);
        }

        Ok(RollbackResult::succeeded(rolled_back).with_preserved_error(original.to_string()))
    }

    /// Unconditionally drop and recreate the fixed domain set, bypassing
    /// version checks. Strictly for non-production recovery. The returned
    /// recovery steps must be performed by the operator; the engine does
    /// not run them.
    pub async fn recreate_from_scratch(&self) -> Result<RollbackResult> {
        tracing::warn!(
            domains = ?self.settings.domains,
            "recreating all schemas from scratch"
        );

        let mut rolled_back = BTreeMap::new();
        let mut failures = Vec::new();
        for domain in &self.settings.domains {
            match self.schemas.recreate_schema(domain).await {
                Ok(()) => {
                    rolled_back.insert(domain.clone(), FULL_RESET_VERSION);
                }
                Err(err) => failures.push(format!("{domain}: {err}")),
            }
        }

        if !failures.is_empty() {
            return Err(DrydockError::Rollback(format!(
                "full recreation failed ({}); manual operator intervention required",
                failures.join("; ")
            )));
        }

        Ok(RollbackResult::succeeded(rolled_back).with_recovery_steps(vec![
            "re-run schema migrations for all recreated domains".to_string(),
            "reseed reference data".to_string(),
            "verify application connectivity against the recreated schemas".to_string(),
        ]))
    }

    /// Dry-run check that the rollback path is reachable for every
    /// configured domain. Mutates nothing.
    pub fn validate_rollback_capability(&self) -> Result<()> {
        for domain in &self.settings.domains {
            let schema = self.schemas.resolve_schema(domain)?;
            tracing::debug!(domain, schema, "rollback capability verified");
        }
        Ok(())
    }

    /// Past rollback records for a domain, newest first per the store.
    pub async fn rollback_history(
        &self,
        domain: &str,
        limit: usize,
    ) -> Result<Vec<RollbackHistoryEntry>> {
        self.history.history(domain, limit).await
    }
}
