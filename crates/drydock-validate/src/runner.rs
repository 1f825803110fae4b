//! Validation runner: executes a plan's checks for one phase.
//!
//! Each step runs under its own timeout. A required step that fails aborts
//! the phase immediately; optional failures are reported and skipped over.
//! Retry policy, if any, belongs to the caller.

use std::sync::Arc;
use std::time::Instant;

use drydock_core::{DeploymentPlan, DrydockError, Notifier, Result, ValidationType};

use crate::report::{StepOutcome, ValidationReport};

pub struct ValidationRunner {
    notifier: Arc<dyn Notifier>,
}

impl ValidationRunner {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Run every step of `plan` whose type matches `phase`, in plan order.
    ///
    /// Returns the per-step report on success. Fails with
    /// [`DrydockError::Validation`] as soon as a required step errors or
    /// times out; a timeout is an ordinary failure, not a distinct kind.
    pub async fn run(
        &self,
        plan: &DeploymentPlan,
        phase: ValidationType,
    ) -> Result<ValidationReport> {
        let mut report = ValidationReport::new(phase);

        for step in plan.steps_for(phase) {
            let start = Instant::now();
            let outcome =
                match tokio::time::timeout(step.timeout, step.check.check(&plan.environment))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(format!("timed out after {:?}", step.timeout)),
                };
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match outcome {
                Ok(()) => {
                    tracing::info!(
                        environment = %plan.environment,
                        step = %step.name,
                        phase = %phase,
                        elapsed_ms,
                        "validation passed"
                    );
                    report.record(StepOutcome {
                        name: step.name.clone(),
                        step_type: step.step_type,
                        required: step.required,
                        passed: true,
                        error: None,
                        elapsed_ms,
                    });
                }
                Err(reason) => {
                    self.notifier
                        .send_validation_failed(&plan.environment, &step.name, &reason)
                        .await;
                    report.record(StepOutcome {
                        name: step.name.clone(),
                        step_type: step.step_type,
                        required: step.required,
                        passed: false,
                        error: Some(reason.clone()),
                        elapsed_ms,
                    });

                    if step.required {
                        return Err(DrydockError::Validation {
                            step: step.name.clone(),
                            reason,
                        });
                    }
                    tracing::warn!(
                        environment = %plan.environment,
                        step = %step.name,
                        phase = %phase,
                        reason,
                        "optional validation failed, continuing"
                    );
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use drydock_core::{NoopNotifier, ProvisioningProgram, ValidationCheck, ValidationStep};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct NoopProgram;

    #[async_trait]
    impl ProvisioningProgram for NoopProgram {
        async fn provision(&self, _environment: &str) -> std::result::Result<Value, String> {
            Ok(json!({}))
        }
    }

    struct SlowCheck;

    #[async_trait]
    impl ValidationCheck for SlowCheck {
        async fn check(&self, _environment: &str) -> std::result::Result<(), String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    struct CountingCheck {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl ValidationCheck for CountingCheck {
        async fn check(&self, _environment: &str) -> std::result::Result<(), String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err("check failed".to_string())
            } else {
                Ok(())
            }
        }
    }

    fn runner() -> ValidationRunner {
        ValidationRunner::new(Arc::new(NoopNotifier))
    }

    fn plan() -> DeploymentPlan {
        DeploymentPlan::new("staging", Arc::new(NoopProgram))
    }

    #[tokio::test]
    async fn test_required_failure_aborts_phase() {
        let later_calls = Arc::new(AtomicUsize::new(0));
        let plan = plan()
            .with_validation(ValidationStep::new(
                "first",
                ValidationType::PreDeploy,
                Arc::new(CountingCheck {
                    calls: Arc::new(AtomicUsize::new(0)),
                    fail: true,
                }),
            ))
            .with_validation(ValidationStep::new(
                "second",
                ValidationType::PreDeploy,
                Arc::new(CountingCheck {
                    calls: later_calls.clone(),
                    fail: false,
                }),
            ));

        let err = runner()
            .run(&plan, ValidationType::PreDeploy)
            .await
            .unwrap_err();
        assert!(matches!(err, DrydockError::Validation { ref step, .. } if step == "first"));
        // abort means later steps never run
        assert_eq!(later_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_optional_failure_continues() {
        let later_calls = Arc::new(AtomicUsize::new(0));
        let plan = plan()
            .with_validation(
                ValidationStep::new(
                    "flaky",
                    ValidationType::PreDeploy,
                    Arc::new(CountingCheck {
                        calls: Arc::new(AtomicUsize::new(0)),
                        fail: true,
                    }),
                )
                .optional(),
            )
            .with_validation(ValidationStep::new(
                "solid",
                ValidationType::PreDeploy,
                Arc::new(CountingCheck {
                    calls: later_calls.clone(),
                    fail: false,
                }),
            ));

        let report = runner().run(&plan, ValidationType::PreDeploy).await.unwrap();
        assert_eq!(later_calls.load(Ordering::SeqCst), 1);
        assert!(!report.all_passed());
        assert_eq!(report.failures().len(), 1);
        assert_eq!(report.outcomes.len(), 2);
    }

    #[tokio::test]
    async fn test_timeout_is_an_ordinary_failure() {
        let plan = plan().with_validation(
            ValidationStep::new("slow", ValidationType::PreDeploy, Arc::new(SlowCheck))
                .with_timeout(Duration::from_millis(10)),
        );

        let err = runner()
            .run(&plan, ValidationType::PreDeploy)
            .await
            .unwrap_err();
        assert!(matches!(err, DrydockError::Validation { .. }));
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_only_matching_phase_runs() {
        let pre_calls = Arc::new(AtomicUsize::new(0));
        let post_calls = Arc::new(AtomicUsize::new(0));
        let plan = plan()
            .with_validation(ValidationStep::new(
                "pre",
                ValidationType::PreDeploy,
                Arc::new(CountingCheck {
                    calls: pre_calls.clone(),
                    fail: false,
                }),
            ))
            .with_validation(ValidationStep::new(
                "post",
                ValidationType::PostDeploy,
                Arc::new(CountingCheck {
                    calls: post_calls.clone(),
                    fail: false,
                }),
            ));

        runner().run(&plan, ValidationType::PostDeploy).await.unwrap();
        assert_eq!(pre_calls.load(Ordering::SeqCst), 0);
        assert_eq!(post_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_phase_is_a_pass() {
        let report = runner().run(&plan(), ValidationType::PreDeploy).await.unwrap();
        assert!(report.all_passed());
        assert!(report.outcomes.is_empty());
    }
}
