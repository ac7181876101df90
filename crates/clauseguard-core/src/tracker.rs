//! Operation tracking.
//!
//! `OperationTracker` keeps one exclusive region per term id and one per
//! session-level operation kind. Entering a region hands out an
//! [`OperationGuard`]; the region is released when the guard is dropped, on
//! every exit path.
//!
//! # Regions
//!
//! - Term regions: ask-question, review, confirm and expert feedback share a
//!   single region per term. A second operation on the same term is rejected.
//! - Session regions: upload and rehydrate use last-request-wins (a newer
//!   attempt takes the region over). Both document generations share one
//!   region; a second generation of either kind is rejected while one is in
//!   flight.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{ClauseError, Result};

/// Operations guarded by a per-term region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermOperation {
    AskQuestion,
    ReviewModification,
    ConfirmModification,
    ExpertFeedback,
}

/// Operations guarded by a session-level region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOperation {
    UploadAndAnalyze,
    Rehydrate,
    GenerateModifiedContract,
    GenerateMarkedContract,
}

impl SessionOperation {
    /// Whether a new attempt takes over the region instead of being rejected.
    pub fn supersedes_previous(self) -> bool {
        matches!(self, Self::UploadAndAnalyze | Self::Rehydrate)
    }
}

impl fmt::Display for TermOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AskQuestion => "ask_question",
            Self::ReviewModification => "review_modification",
            Self::ConfirmModification => "confirm_modification",
            Self::ExpertFeedback => "expert_feedback",
        };
        f.write_str(name)
    }
}

impl fmt::Display for SessionOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UploadAndAnalyze => "upload_and_analyze",
            Self::Rehydrate => "rehydrate",
            Self::GenerateModifiedContract => "generate_modified_contract",
            Self::GenerateMarkedContract => "generate_marked_contract",
        };
        f.write_str(name)
    }
}

/// Snapshot of every in-flight flag, for loading indicators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TrackerFlags {
    pub is_uploading: bool,
    pub is_rehydrating: bool,
    pub is_generating_modified: bool,
    pub is_generating_marked: bool,
    /// Term id -> operation currently running on it
    pub term_operations: BTreeMap<String, TermOperation>,
}

impl TrackerFlags {
    /// Returns true if no flag is raised.
    pub fn is_idle(&self) -> bool {
        !self.is_uploading
            && !self.is_rehydrating
            && !self.is_generating_modified
            && !self.is_generating_marked
            && self.term_operations.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum GuardKey {
    Term(String),
    Session(SessionOperation),
}

#[derive(Debug, Default)]
struct TrackerState {
    next_ticket: u64,
    terms: HashMap<String, (TermOperation, u64)>,
    session: HashMap<SessionOperation, u64>,
}

impl TrackerState {
    fn issue_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    fn holds(&self, key: &GuardKey, ticket: u64) -> bool {
        match key {
            GuardKey::Term(term_id) => self.terms.get(term_id).is_some_and(|(_, t)| *t == ticket),
            GuardKey::Session(op) => self.session.get(op) == Some(&ticket),
        }
    }
}

fn lock(state: &Mutex<TrackerState>) -> MutexGuard<'_, TrackerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Per-entity concurrency guards and in-flight flags.
///
/// Cloning yields a handle to the same tracker.
#[derive(Debug, Clone, Default)]
pub struct OperationTracker {
    state: Arc<Mutex<TrackerState>>,
}

impl OperationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters the exclusive region of `term_id`.
    ///
    /// # Errors
    ///
    /// Returns `ConcurrentOperation` if any operation already holds the term.
    pub fn begin_term(&self, term_id: &str, operation: TermOperation) -> Result<OperationGuard> {
        let mut state = lock(&self.state);
        if let Some((running, _)) = state.terms.get(term_id) {
            tracing::debug!(
                "[OperationTracker] Rejecting {} on term {}: {} in flight",
                operation,
                term_id,
                running
            );
            return Err(ClauseError::concurrent(
                format!("term '{term_id}'"),
                operation.to_string(),
            ));
        }

        let ticket = state.issue_ticket();
        state.terms.insert(term_id.to_string(), (operation, ticket));
        Ok(OperationGuard {
            state: Arc::clone(&self.state),
            key: GuardKey::Term(term_id.to_string()),
            ticket,
        })
    }

    /// Enters a session-level region.
    ///
    /// For upload and rehydrate a running attempt is superseded: its guard
    /// stays alive but no longer owns the flag.
    ///
    /// # Errors
    ///
    /// Returns `ConcurrentOperation` if any document generation is in flight.
    pub fn begin_session(&self, operation: SessionOperation) -> Result<OperationGuard> {
        let mut state = lock(&self.state);
        if operation.supersedes_previous() {
            if state.session.contains_key(&operation) {
                tracing::debug!(
                    "[OperationTracker] {} superseding previous attempt",
                    operation
                );
            }
        } else if let Some(running) = state
            .session
            .keys()
            .find(|op| !op.supersedes_previous())
        {
            tracing::debug!(
                "[OperationTracker] Rejecting {}: {} in flight",
                operation,
                running
            );
            return Err(ClauseError::concurrent("session", operation.to_string()));
        }

        let ticket = state.issue_ticket();
        state.session.insert(operation, ticket);
        Ok(OperationGuard {
            state: Arc::clone(&self.state),
            key: GuardKey::Session(operation),
            ticket,
        })
    }

    /// Returns true if any operation holds `term_id`.
    pub fn is_term_busy(&self, term_id: &str) -> bool {
        lock(&self.state).terms.contains_key(term_id)
    }

    /// Returns the operation holding `term_id`, if any.
    pub fn term_operation(&self, term_id: &str) -> Option<TermOperation> {
        lock(&self.state).terms.get(term_id).map(|(op, _)| *op)
    }

    /// Returns true if `operation` is in flight.
    pub fn is_session_busy(&self, operation: SessionOperation) -> bool {
        lock(&self.state).session.contains_key(&operation)
    }

    pub fn flags(&self) -> TrackerFlags {
        let state = lock(&self.state);
        TrackerFlags {
            is_uploading: state.session.contains_key(&SessionOperation::UploadAndAnalyze),
            is_rehydrating: state.session.contains_key(&SessionOperation::Rehydrate),
            is_generating_modified: state
                .session
                .contains_key(&SessionOperation::GenerateModifiedContract),
            is_generating_marked: state
                .session
                .contains_key(&SessionOperation::GenerateMarkedContract),
            term_operations: state
                .terms
                .iter()
                .map(|(id, (op, _))| (id.clone(), *op))
                .collect(),
        }
    }

    /// Drops every flag. Guards still alive become stale and release nothing.
    pub fn reset(&self) {
        let mut state = lock(&self.state);
        state.terms.clear();
        state.session.clear();
    }
}

/// Proof of holding a tracker region. Releases the region on drop.
#[derive(Debug)]
#[must_use = "the region is released as soon as the guard is dropped"]
pub struct OperationGuard {
    state: Arc<Mutex<TrackerState>>,
    key: GuardKey,
    ticket: u64,
}

impl OperationGuard {
    /// Returns false once the region was superseded or reset.
    pub fn is_current(&self) -> bool {
        lock(&self.state).holds(&self.key, self.ticket)
    }
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        if !state.holds(&self.key, self.ticket) {
            return;
        }
        match &self.key {
            GuardKey::Term(term_id) => {
                state.terms.remove(term_id);
            }
            GuardKey::Session(op) => {
                state.session.remove(op);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_term_is_exclusive() {
        let tracker = OperationTracker::new();
        let _review = tracker
            .begin_term("t1", TermOperation::ReviewModification)
            .unwrap();

        let err = tracker
            .begin_term("t1", TermOperation::ConfirmModification)
            .unwrap_err();
        assert!(err.is_concurrent());
        assert_eq!(
            tracker.term_operation("t1"),
            Some(TermOperation::ReviewModification)
        );
    }

    #[test]
    fn test_different_terms_run_in_parallel() {
        let tracker = OperationTracker::new();
        let _a = tracker.begin_term("t1", TermOperation::AskQuestion).unwrap();
        let _b = tracker
            .begin_term("t2", TermOperation::ConfirmModification)
            .unwrap();
        assert!(tracker.is_term_busy("t1"));
        assert!(tracker.is_term_busy("t2"));
    }

    #[test]
    fn test_drop_releases_term() {
        let tracker = OperationTracker::new();
        {
            let _guard = tracker.begin_term("t1", TermOperation::AskQuestion).unwrap();
            assert!(tracker.is_term_busy("t1"));
        }
        assert!(!tracker.is_term_busy("t1"));
        assert!(tracker.begin_term("t1", TermOperation::AskQuestion).is_ok());
    }

    #[test]
    fn test_upload_last_request_wins() {
        let tracker = OperationTracker::new();
        let first = tracker
            .begin_session(SessionOperation::UploadAndAnalyze)
            .unwrap();
        let second = tracker
            .begin_session(SessionOperation::UploadAndAnalyze)
            .unwrap();

        assert!(!first.is_current());
        assert!(second.is_current());

        // The stale guard must not clear the newer attempt's flag.
        drop(first);
        assert!(tracker.flags().is_uploading);

        drop(second);
        assert!(!tracker.flags().is_uploading);
    }

    #[test]
    fn test_generations_share_one_region() {
        let tracker = OperationTracker::new();
        let guard = tracker
            .begin_session(SessionOperation::GenerateMarkedContract)
            .unwrap();
        assert!(
            tracker
                .begin_session(SessionOperation::GenerateMarkedContract)
                .unwrap_err()
                .is_concurrent()
        );
        assert!(
            tracker
                .begin_session(SessionOperation::GenerateModifiedContract)
                .unwrap_err()
                .is_concurrent()
        );
        let flags = tracker.flags();
        assert!(flags.is_generating_marked);
        assert!(!flags.is_generating_modified);

        drop(guard);
        assert!(
            tracker
                .begin_session(SessionOperation::GenerateModifiedContract)
                .is_ok()
        );
    }

    #[test]
    fn test_generation_does_not_block_upload() {
        let tracker = OperationTracker::new();
        let _generation = tracker
            .begin_session(SessionOperation::GenerateModifiedContract)
            .unwrap();
        assert!(
            tracker
                .begin_session(SessionOperation::UploadAndAnalyze)
                .is_ok()
        );
    }

    #[test]
    fn test_reset_clears_flags_and_invalidates_guards() {
        let tracker = OperationTracker::new();
        let term_guard = tracker.begin_term("t1", TermOperation::AskQuestion).unwrap();
        let upload = tracker
            .begin_session(SessionOperation::UploadAndAnalyze)
            .unwrap();

        tracker.reset();
        assert!(tracker.flags().is_idle());
        assert!(!term_guard.is_current());
        assert!(!upload.is_current());

        let fresh = tracker.begin_term("t1", TermOperation::AskQuestion).unwrap();
        drop(term_guard);
        assert!(tracker.is_term_busy("t1"));
        drop(fresh);
        drop(upload);
        assert!(tracker.flags().is_idle());
    }

    #[test]
    fn test_flags_snapshot() {
        let tracker = OperationTracker::new();
        let _r = tracker.begin_session(SessionOperation::Rehydrate).unwrap();
        let _t = tracker
            .begin_term("t9", TermOperation::ExpertFeedback)
            .unwrap();

        let flags = tracker.flags();
        assert!(flags.is_rehydrating);
        assert!(!flags.is_uploading);
        assert_eq!(
            flags.term_operations.get("t9"),
            Some(&TermOperation::ExpertFeedback)
        );
    }
}
