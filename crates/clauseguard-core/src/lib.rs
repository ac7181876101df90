//! Domain layer for Clauseguard.
//!
//! Holds the contract session model, the pure term reconciliation rules,
//! the per-entity operation tracker, and the traits the engine uses to talk
//! to the analysis service and to persistent storage.

pub mod analysis;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod session;
pub mod state;
pub mod tracker;

// Re-export common error type
pub use error::ClauseError;
pub use reconcile::{ComplianceStats, compute_stats, effective_compliance};
pub use tracker::{OperationGuard, OperationTracker, SessionOperation, TermOperation, TrackerFlags};
