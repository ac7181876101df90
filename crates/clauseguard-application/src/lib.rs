//! Application layer for Clauseguard.
//!
//! This crate provides the `SessionStore`, which coordinates the analysis
//! service, the operation tracker, term reconciliation and persistence to
//! implement the contract review workflow.

pub mod session;

pub use session::{ExpertFeedback, SessionStore, StoreSnapshot, StoreWatcher};
