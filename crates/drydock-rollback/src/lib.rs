//! Drydock Rollback: bounded-retry reversion with destructive fallback.
//!
//! ```text
//! targets → plan → retry loop ──success──→ RollbackResult
//!                      │
//!                  exhausted
//!                      │
//!          emergency mode? ──yes──→ drop+recreate each domain (≥1 must recover)
//!                      │
//!          auto-recreate? ──yes──→ recreate failed target set (all must recover)
//!                      │
//!                    fail
//! ```
//!
//! Version `0` is the full-reset sentinel and always passes the safety
//! check; everything else goes through the pluggable [`SafetyPolicy`].

pub mod collaborators;
pub mod engine;
pub mod safety;
pub mod settings;
pub mod types;

pub use collaborators::{RollbackHistoryStore, RollbackPlanner, SchemaAdmin};
pub use engine::RollbackEngine;
pub use safety::{PermissiveSafetyPolicy, SafetyPolicy, SentinelOnlySafetyPolicy};
pub use settings::RollbackSettings;
pub use types::{
    is_full_reset, RollbackHistoryEntry, RollbackPlan, RollbackResult, FULL_RESET_VERSION,
};
