//! Notification collaborator seam.
//!
//! Notifications are fire-and-forget: the trait methods return `()` so a
//! failing channel can never abort orchestration. Implementations are
//! expected to swallow and log their own delivery errors.

use async_trait::async_trait;
use serde_json::Value;

/// Phase-transition notifications emitted by the engine.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_deployment_started(&self, environment: &str, plan_id: &str);
    async fn send_deployment_succeeded(&self, environment: &str, plan_id: &str, output: &Value);
    async fn send_deployment_failed(&self, environment: &str, plan_id: &str, error: &str);
    async fn send_validation_failed(&self, environment: &str, step: &str, error: &str);
    async fn send_rollback_started(&self, environment: &str, reason: &str);
}

/// Notifier that emits structured log events and nothing else.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_deployment_started(&self, environment: &str, plan_id: &str) {
        tracing::info!(environment, plan_id, "deployment started");
    }

    async fn send_deployment_succeeded(&self, environment: &str, plan_id: &str, _output: &Value) {
        tracing::info!(environment, plan_id, "deployment succeeded");
    }

    async fn send_deployment_failed(&self, environment: &str, plan_id: &str, error: &str) {
        tracing::error!(environment, plan_id, error, "deployment failed");
    }

    async fn send_validation_failed(&self, environment: &str, step: &str, error: &str) {
        tracing::warn!(environment, step, error, "validation failed");
    }

    async fn send_rollback_started(&self, environment: &str, reason: &str) {
        tracing::warn!(environment, reason, "rollback started");
    }
}

/// Notifier that drops everything. Useful for tests and embedded use.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send_deployment_started(&self, _environment: &str, _plan_id: &str) {}
    async fn send_deployment_succeeded(&self, _environment: &str, _plan_id: &str, _output: &Value) {}
    async fn send_deployment_failed(&self, _environment: &str, _plan_id: &str, _error: &str) {}
    async fn send_validation_failed(&self, _environment: &str, _step: &str, _error: &str) {}
    async fn send_rollback_started(&self, _environment: &str, _reason: &str) {}
}
