//! Session application services.
//!
//! This module contains the `SessionStore` orchestrator together with the
//! helpers it uses to map service records, name generated documents, and
//! publish snapshots.

mod artifacts;
mod mapper;
mod snapshot;
mod store;

pub use snapshot::{StoreSnapshot, StoreWatcher};
pub use store::{ExpertFeedback, SessionStore};
