//! Subscriber snapshots.
//!
//! The store publishes a `StoreSnapshot` on a `tokio::sync::watch` channel
//! after every mutation and every guard change. Snapshots are captured under
//! the store's state lock, so terms and stats always agree.

use chrono::{DateTime, Utc};
use clauseguard_core::reconcile::{ComplianceStats, compute_stats};
use clauseguard_core::session::{Session, Term};
use clauseguard_core::state::UserRole;
use clauseguard_core::tracker::TrackerFlags;
use serde::Serialize;
use tokio::sync::watch;

/// Receiver side handed to the UI.
pub type StoreWatcher = watch::Receiver<StoreSnapshot>;

/// Consistent view of the store at one point in time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    /// Incremented on each publication
    pub version: u64,
    pub session: Option<Session>,
    pub terms: Vec<Term>,
    pub stats: ComplianceStats,
    pub flags: TrackerFlags,
    pub user_role: UserRole,
    pub last_error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl StoreSnapshot {
    pub(crate) fn capture(
        version: u64,
        session: Option<&Session>,
        terms: &[Term],
        flags: TrackerFlags,
        user_role: UserRole,
        last_error: Option<&str>,
    ) -> Self {
        Self {
            version,
            session: session.cloned(),
            terms: terms.to_vec(),
            stats: compute_stats(terms),
            flags,
            user_role,
            last_error: last_error.map(str::to_string),
            updated_at: Utc::now(),
        }
    }
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        Self {
            version: 0,
            session: None,
            terms: Vec::new(),
            stats: ComplianceStats::default(),
            flags: TrackerFlags::default(),
            user_role: UserRole::default(),
            last_error: None,
            updated_at: Utc::now(),
        }
    }
}
