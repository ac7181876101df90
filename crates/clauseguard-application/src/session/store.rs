use clauseguard_core::analysis::{
    AnalysisClient, ExpertFeedbackRequest, QuestionRequest, ReviewRequest, UploadFile,
};
use clauseguard_core::error::{ClauseError, Result};
use clauseguard_core::reconcile::{ComplianceStats, compute_stats};
use clauseguard_core::session::{ContractArtifacts, Session, Term};
use clauseguard_core::state::{PersistenceAdapter, SESSION_ID_KEY, USER_ROLE_KEY, UserRole};
use clauseguard_core::tracker::{
    OperationGuard, OperationTracker, SessionOperation, TermOperation, TrackerFlags,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, watch};

use super::artifacts;
use super::mapper;
use super::snapshot::{StoreSnapshot, StoreWatcher};

/// An expert's verdict on a term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpertFeedback {
    pub is_compliant: bool,
    pub notes: Option<String>,
}

/// Canonical in-memory state. Only touched under the store's lock, and the
/// lock is never held across an `.await`.
#[derive(Debug, Default)]
struct StoreState {
    session: Option<Session>,
    terms: Vec<Term>,
    /// Bumped whenever in-flight responses must stop applying.
    epoch: u64,
    user_role: UserRole,
    last_error: Option<String>,
}

impl StoreState {
    fn reset(&mut self) {
        self.session = None;
        self.terms.clear();
        self.last_error = None;
        self.epoch += 1;
    }

    fn term_mut(&mut self, term_id: &str) -> Result<&mut Term> {
        self.terms
            .iter_mut()
            .find(|t| t.term_id == term_id)
            .ok_or_else(|| {
                ClauseError::internal(format!("Term '{term_id}' vanished mid-operation"))
            })
    }
}

/// Identity an operation was started against.
#[derive(Debug, Clone)]
struct Ticket {
    epoch: u64,
    session_id: String,
}

/// Owns the active contract session and orchestrates every operation on it.
///
/// `SessionStore` is responsible for:
/// - Uploading a contract and loading the resulting session
/// - Rehydrating a session from its persisted id
/// - Running per-term operations (ask, review, confirm, expert feedback)
///   under the `OperationTracker`'s guards
/// - Attaching generated documents to the session
/// - Publishing consistent snapshots to subscribers
///
/// # Consistency
///
/// Every mutation happens in one critical section that also publishes the
/// snapshot, so subscribers never see terms and stats out of sync. Each
/// remote call records the store epoch before suspending; a response that
/// comes back after the epoch moved on is discarded with
/// `ClauseError::Superseded`.
pub struct SessionStore {
    client: Arc<dyn AnalysisClient>,
    persistence: Arc<dyn PersistenceAdapter>,
    tracker: OperationTracker,
    state: Mutex<StoreState>,
    snapshots: watch::Sender<StoreSnapshot>,
    /// Serializes writes of the persisted session id.
    session_id_writes: AsyncMutex<()>,
}

impl SessionStore {
    /// Creates an empty store.
    ///
    /// Call [`SessionStore::init`] to restore the persisted role and session.
    pub fn new(client: Arc<dyn AnalysisClient>, persistence: Arc<dyn PersistenceAdapter>) -> Self {
        let (snapshots, _) = watch::channel(StoreSnapshot::default());
        Self {
            client,
            persistence,
            tracker: OperationTracker::new(),
            state: Mutex::new(StoreState::default()),
            snapshots,
            session_id_writes: AsyncMutex::new(()),
        }
    }

    // ============================================================================
    // Lifecycle
    // ============================================================================

    /// Restores the role preference and, if a session id was persisted,
    /// rehydrates that session.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(session))`: a persisted session was restored
    /// - `Ok(None)`: nothing was persisted
    /// - `Err(_)`: rehydration failed; the store is empty and the persisted id removed
    pub async fn init(&self) -> Result<Option<Session>> {
        let stored_role = self.persistence.get(USER_ROLE_KEY).await.unwrap_or_else(|e| {
            tracing::warn!("[SessionStore] Failed to read role preference: {}", e);
            None
        });
        let role = UserRole::from_stored(stored_role.as_deref());
        self.with_state(|state| state.user_role = role);

        let session_id = self.persistence.get(SESSION_ID_KEY).await.unwrap_or_else(|e| {
            tracing::warn!("[SessionStore] Failed to read persisted session id: {}", e);
            None
        });

        match session_id {
            Some(session_id) => {
                tracing::info!("[SessionStore] Restoring session {}", session_id);
                self.rehydrate(&session_id).await.map(Some)
            }
            None => Ok(None),
        }
    }

    /// Drops in-memory state and every guard flag. Persisted values are kept
    /// so a later `init` can restore them. Outstanding responses are discarded.
    pub fn dispose(&self) {
        tracing::debug!("[SessionStore] dispose()");
        self.tracker.reset();
        self.with_state(StoreState::reset);
    }

    /// Resets session, terms, stats, guard flags and the persisted session id.
    ///
    /// Idempotent.
    pub async fn clear_session(&self) {
        tracing::info!("[SessionStore] Clearing session");
        self.tracker.reset();
        self.with_state(StoreState::reset);
        self.forget_session_id().await;
    }

    // ============================================================================
    // Session-level operations
    // ============================================================================

    /// Uploads a contract, then loads the session the service created for it.
    ///
    /// Any current session is discarded first. If a newer upload starts while
    /// this one is in flight, this one returns `ClauseError::Superseded`.
    pub async fn upload_and_analyze(&self, file: UploadFile) -> Result<Session> {
        let result = self.upload_and_analyze_inner(file).await;
        self.finish("upload_and_analyze", result)
    }

    async fn upload_and_analyze_inner(&self, file: UploadFile) -> Result<Session> {
        if file.filename.trim().is_empty() {
            return Err(ClauseError::validation("Upload requires a filename"));
        }
        if file.bytes.is_empty() {
            return Err(ClauseError::validation("Uploaded file is empty"));
        }

        self.clear_session().await;
        let guard = self.tracker.begin_session(SessionOperation::UploadAndAnalyze)?;
        let epoch = self.with_state(|state| state.epoch);

        tracing::info!(
            "[SessionStore] Uploading {} ({} bytes)",
            file.filename,
            file.bytes.len()
        );
        let response = self.client.upload(file).await;

        let response = {
            let state = self.lock_state();
            if state.epoch != epoch || !guard.is_current() {
                let session_id = response.map(|r| r.session_id).unwrap_or_default();
                return Err(ClauseError::superseded(session_id));
            }
            response?
        };

        tracing::info!(
            "[SessionStore] Upload accepted: session_id={}, message={}",
            response.session_id,
            response.message
        );
        self.load_session(&response.session_id, epoch, Some(&guard)).await
    }

    /// Loads session metadata and terms for `session_id`, replacing the
    /// current session on success.
    ///
    /// On any failure the store is cleared entirely and the persisted id is
    /// removed; no partially loaded session is kept.
    pub async fn rehydrate(&self, session_id: &str) -> Result<Session> {
        let result = self.rehydrate_inner(session_id).await;
        self.finish("rehydrate", result)
    }

    async fn rehydrate_inner(&self, session_id: &str) -> Result<Session> {
        if session_id.trim().is_empty() {
            return Err(ClauseError::validation("Session id must not be empty"));
        }

        let epoch = self.with_state(|state| {
            state.epoch += 1;
            state.last_error = None;
            state.epoch
        });
        self.load_session(session_id, epoch, None).await
    }

    /// Fetches `session_id` and installs it for the operation that started
    /// at `epoch`. `owner` is the upload guard when an upload is loading its
    /// own session.
    ///
    /// Nothing is applied or persisted once `epoch` is no longer current or
    /// either guard was superseded.
    async fn load_session(
        &self,
        session_id: &str,
        epoch: u64,
        owner: Option<&OperationGuard>,
    ) -> Result<Session> {
        let guard = self.tracker.begin_session(SessionOperation::Rehydrate)?;
        self.notify();

        tracing::debug!("[SessionStore] Rehydrating session {}", session_id);
        let (details, records) = tokio::join!(
            self.client.get_session_details(session_id),
            self.client.get_terms(session_id)
        );

        let loaded = details.and_then(|details| {
            let session = mapper::map_session(session_id, details)?;
            let terms = mapper::map_terms(records?)?;
            Ok((session, terms))
        });

        let outcome = {
            let mut state = self.lock_state();
            let owner_current = owner.is_none_or(OperationGuard::is_current);
            if state.epoch != epoch || !guard.is_current() || !owner_current {
                return Err(ClauseError::superseded(session_id));
            }
            match loaded {
                Ok((session, terms)) => {
                    tracing::info!(
                        "[SessionStore] Session {} loaded with {} terms",
                        session_id,
                        terms.len()
                    );
                    state.session = Some(session.clone());
                    state.terms = terms;
                    self.publish(&state);
                    Ok(session)
                }
                Err(err) => {
                    tracing::error!(
                        "[SessionStore] Rehydration of {} failed: {}",
                        session_id,
                        err
                    );
                    state.reset();
                    state.last_error = Some(err.user_message());
                    Err(err)
                }
            }
        };

        match outcome {
            Ok(session) => {
                if self.remember_session_id(&session.session_id, epoch).await {
                    Ok(session)
                } else {
                    Err(ClauseError::superseded(session.session_id))
                }
            }
            Err(err) => {
                drop(guard);
                self.tracker.reset();
                self.notify();
                self.forget_session_id().await;
                Err(err)
            }
        }
    }

    /// Generates the contract with the confirmed modifications applied and
    /// attaches the resulting documents to the session.
    pub async fn generate_modified_contract(&self) -> Result<ContractArtifacts> {
        let result = self.generate_modified_contract_inner().await;
        self.finish("generate_modified_contract", result)
    }

    async fn generate_modified_contract_inner(&self) -> Result<ContractArtifacts> {
        let (ticket, _guard) =
            self.begin_session_operation(SessionOperation::GenerateModifiedContract)?;

        let response = self
            .client
            .generate_modified_contract(&ticket.session_id)
            .await;

        self.commit(&ticket, |state| {
            let response = response?;
            if !response.success {
                return Err(ClauseError::server("Modified contract generation failed"));
            }
            let session = state
                .session
                .as_mut()
                .ok_or_else(|| ClauseError::internal("Session vanished mid-operation"))?;
            let artifacts = artifacts::modified_contract(session, &response)
                .ok_or_else(|| ClauseError::server("No modified contract was returned"))?;
            session.modified_contract_info = Some(artifacts.clone());
            Ok(artifacts)
        })
    }

    /// Generates the original contract with non-compliant terms marked and
    /// attaches it to the session.
    pub async fn generate_marked_contract(&self) -> Result<ContractArtifacts> {
        let result = self.generate_marked_contract_inner().await;
        self.finish("generate_marked_contract", result)
    }

    async fn generate_marked_contract_inner(&self) -> Result<ContractArtifacts> {
        let (ticket, _guard) =
            self.begin_session_operation(SessionOperation::GenerateMarkedContract)?;

        let response = self
            .client
            .generate_marked_contract(&ticket.session_id)
            .await;

        self.commit(&ticket, |state| {
            let response = response?;
            if !response.success {
                return Err(ClauseError::server("Marked contract generation failed"));
            }
            let session = state
                .session
                .as_mut()
                .ok_or_else(|| ClauseError::internal("Session vanished mid-operation"))?;
            let artifacts = artifacts::marked_contract(session, &response)
                .ok_or_else(|| ClauseError::server("No marked contract was returned"))?;
            session.marked_contract_info = Some(artifacts.clone());
            Ok(artifacts)
        })
    }

    // ============================================================================
    // Term-level operations
    // ============================================================================

    /// Asks a question about one term (`term_id` given) or about the whole
    /// contract.
    ///
    /// A term-scoped answer is also stored on the term's `last_qa_answer`;
    /// a general answer is only returned.
    pub async fn ask_question(&self, term_id: Option<&str>, question: &str) -> Result<String> {
        let result = self.ask_question_inner(term_id, question).await;
        self.finish("ask_question", result)
    }

    async fn ask_question_inner(&self, term_id: Option<&str>, question: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ClauseError::validation("Question must not be empty"));
        }

        let (ticket, term_text, _guard) = match term_id {
            Some(term_id) => {
                let (ticket, term, guard) =
                    self.begin_term_operation(term_id, TermOperation::AskQuestion)?;
                (ticket, Some(term.current_text().to_string()), Some(guard))
            }
            None => (self.current_ticket()?, None, None),
        };

        let answer = self
            .client
            .ask_question(QuestionRequest {
                session_id: ticket.session_id.clone(),
                question: question.to_string(),
                term_id: term_id.map(str::to_string),
                term_text,
            })
            .await;

        self.commit(&ticket, |state| {
            let answer = answer?;
            if let Some(term_id) = term_id {
                state.term_mut(term_id)?.last_qa_answer = Some(answer.clone());
            }
            Ok(answer)
        })
    }

    /// Has the service re-review the user's edit of a term.
    ///
    /// On success the reviewed text becomes the user's text, the review
    /// result is stored, and the term is un-confirmed: reviewed text must be
    /// confirmed again explicitly.
    pub async fn review_modification(&self, term_id: &str, user_text: &str) -> Result<Term> {
        let result = self.review_modification_inner(term_id, user_text).await;
        self.finish("review_modification", result)
    }

    async fn review_modification_inner(&self, term_id: &str, user_text: &str) -> Result<Term> {
        if user_text.trim().is_empty() {
            return Err(ClauseError::validation("Modified text must not be empty"));
        }

        let (ticket, term, _guard) =
            self.begin_term_operation(term_id, TermOperation::ReviewModification)?;

        let response = self
            .client
            .review_modification(ReviewRequest {
                session_id: ticket.session_id.clone(),
                term_id: term_id.to_string(),
                user_text: user_text.to_string(),
                original_text: term.term_text,
            })
            .await;

        self.commit(&ticket, |state| {
            let response = response?;
            let term = state.term_mut(term_id)?;
            term.apply_review(
                response.reviewed_text,
                response.still_compliant,
                response.new_issue,
            );
            tracing::debug!(
                "[SessionStore] Term {} reviewed: still_compliant={}",
                term_id,
                response.still_compliant
            );
            Ok(term.clone())
        })
    }

    /// Locks in `text` as the user's final wording of a term.
    ///
    /// Clears any earlier review result. Confirmation alone does not change
    /// the term's compliance verdict.
    pub async fn confirm_modification(&self, term_id: &str, text: &str) -> Result<Term> {
        let result = self.confirm_modification_inner(term_id, text).await;
        self.finish("confirm_modification", result)
    }

    async fn confirm_modification_inner(&self, term_id: &str, text: &str) -> Result<Term> {
        if text.trim().is_empty() {
            return Err(ClauseError::validation("Confirmed text must not be empty"));
        }

        let (ticket, _term, _guard) =
            self.begin_term_operation(term_id, TermOperation::ConfirmModification)?;

        let response = self
            .client
            .confirm_modification(&ticket.session_id, term_id, text)
            .await;

        self.commit(&ticket, |state| {
            let response = response?;
            if !response.success {
                let message = if response.message.is_empty() {
                    "Confirmation was rejected".to_string()
                } else {
                    response.message
                };
                return Err(ClauseError::server(message));
            }
            let term = state.term_mut(term_id)?;
            term.apply_confirmation(text.to_string());
            Ok(term.clone())
        })
    }

    /// Records an expert's verdict on a term. Requires the expert role.
    ///
    /// The verdict overrides every other compliance source from then on.
    pub async fn submit_expert_feedback(
        &self,
        term_id: &str,
        feedback: ExpertFeedback,
    ) -> Result<Term> {
        let result = self.submit_expert_feedback_inner(term_id, feedback).await;
        self.finish("submit_expert_feedback", result)
    }

    async fn submit_expert_feedback_inner(
        &self,
        term_id: &str,
        feedback: ExpertFeedback,
    ) -> Result<Term> {
        if self.user_role() != UserRole::Expert {
            return Err(ClauseError::validation(
                "Expert feedback requires the expert role",
            ));
        }

        let (ticket, _term, _guard) =
            self.begin_term_operation(term_id, TermOperation::ExpertFeedback)?;

        let response = self
            .client
            .submit_expert_feedback(ExpertFeedbackRequest {
                session_id: ticket.session_id.clone(),
                term_id: term_id.to_string(),
                is_compliant: feedback.is_compliant,
                notes: feedback.notes,
            })
            .await;

        self.commit(&ticket, |state| {
            let response = response?;
            if !response.success {
                return Err(ClauseError::server("Expert feedback was rejected"));
            }
            let feedback_id = response
                .feedback_id
                .ok_or_else(|| ClauseError::server("Expert feedback was not assigned an id"))?;
            let term = state.term_mut(term_id)?;
            term.apply_expert_override(feedback.is_compliant, feedback_id);
            Ok(term.clone())
        })
    }

    // ============================================================================
    // Role preference
    // ============================================================================

    pub fn user_role(&self) -> UserRole {
        self.lock_state().user_role
    }

    /// Changes and persists the role preference.
    ///
    /// # Errors
    ///
    /// Returns the persistence error; the in-memory role is unchanged then.
    pub async fn set_user_role(&self, role: UserRole) -> Result<()> {
        self.persistence.set(USER_ROLE_KEY, role.as_str()).await?;
        self.with_state(|state| state.user_role = role);
        tracing::info!("[SessionStore] User role set to {}", role);
        Ok(())
    }

    // ============================================================================
    // Read accessors
    // ============================================================================

    pub fn session(&self) -> Option<Session> {
        self.lock_state().session.clone()
    }

    pub fn terms(&self) -> Vec<Term> {
        self.lock_state().terms.clone()
    }

    pub fn term(&self, term_id: &str) -> Option<Term> {
        self.lock_state()
            .terms
            .iter()
            .find(|t| t.term_id == term_id)
            .cloned()
    }

    /// Statistics recomputed from the current terms.
    pub fn stats(&self) -> ComplianceStats {
        compute_stats(&self.lock_state().terms)
    }

    /// Message of the most recent remote failure, for display.
    pub fn last_error(&self) -> Option<String> {
        self.lock_state().last_error.clone()
    }

    pub fn flags(&self) -> TrackerFlags {
        self.tracker.flags()
    }

    pub fn is_term_busy(&self, term_id: &str) -> bool {
        self.tracker.is_term_busy(term_id)
    }

    /// Subscribes to store snapshots. The receiver starts at the latest one.
    pub fn subscribe(&self) -> StoreWatcher {
        self.snapshots.subscribe()
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.snapshots.borrow().clone()
    }

    // ============================================================================
    // Internals
    // ============================================================================

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publishes a snapshot of `state`. Call with the state lock held.
    fn publish(&self, state: &StoreState) {
        let flags = self.tracker.flags();
        self.snapshots.send_modify(|snapshot| {
            *snapshot = StoreSnapshot::capture(
                snapshot.version + 1,
                state.session.as_ref(),
                &state.terms,
                flags,
                state.user_role,
                state.last_error.as_deref(),
            );
        });
    }

    /// Publishes the current state unchanged (e.g. after a guard release).
    fn notify(&self) {
        let state = self.lock_state();
        self.publish(&state);
    }

    /// Mutates state and publishes in one critical section.
    fn with_state<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let mut state = self.lock_state();
        let result = f(&mut state);
        self.publish(&state);
        result
    }

    fn current_ticket(&self) -> Result<Ticket> {
        let state = self.lock_state();
        let session = state
            .session
            .as_ref()
            .ok_or_else(|| ClauseError::validation("No active session"))?;
        Ok(Ticket {
            epoch: state.epoch,
            session_id: session.session_id.clone(),
        })
    }

    /// Checks the session, takes the session-level guard and announces it.
    fn begin_session_operation(
        &self,
        operation: SessionOperation,
    ) -> Result<(Ticket, OperationGuard)> {
        let mut state = self.lock_state();
        let session = state
            .session
            .as_ref()
            .ok_or_else(|| ClauseError::validation("No active session"))?;
        let ticket = Ticket {
            epoch: state.epoch,
            session_id: session.session_id.clone(),
        };
        let guard = self.tracker.begin_session(operation)?;
        state.last_error = None;
        self.publish(&state);
        tracing::debug!(
            "[SessionStore] {} started for session {}",
            operation,
            ticket.session_id
        );
        Ok((ticket, guard))
    }

    /// Checks session and term, takes the term's guard and announces it.
    ///
    /// Returns a copy of the term as it was when the operation started.
    fn begin_term_operation(
        &self,
        term_id: &str,
        operation: TermOperation,
    ) -> Result<(Ticket, Term, OperationGuard)> {
        let mut state = self.lock_state();
        let session_id = state
            .session
            .as_ref()
            .map(|s| s.session_id.clone())
            .ok_or_else(|| ClauseError::validation("No active session"))?;
        let term = state
            .terms
            .iter()
            .find(|t| t.term_id == term_id)
            .cloned()
            .ok_or_else(|| ClauseError::validation(format!("Unknown term '{term_id}'")))?;
        let guard = self.tracker.begin_term(term_id, operation)?;
        state.last_error = None;
        self.publish(&state);
        tracing::debug!(
            "[SessionStore] {} started: session_id={}, term_id={}",
            operation,
            session_id,
            term_id
        );
        Ok((
            Ticket {
                epoch: state.epoch,
                session_id,
            },
            term,
            guard,
        ))
    }

    /// Applies the outcome of a remote call if `ticket` is still current.
    ///
    /// The epoch check comes first, so even a failed response for a stale
    /// session reports `Superseded`. `f` must not leave partial changes
    /// behind when it returns an error.
    fn commit<R>(
        &self,
        ticket: &Ticket,
        f: impl FnOnce(&mut StoreState) -> Result<R>,
    ) -> Result<R> {
        let mut state = self.lock_state();
        if state.epoch != ticket.epoch {
            return Err(ClauseError::superseded(ticket.session_id.clone()));
        }
        let result = f(&mut state)?;
        self.publish(&state);
        Ok(result)
    }

    /// Logs the outcome, records remote failures for the UI, and publishes
    /// the final flags once the operation's guard is gone.
    fn finish<T>(&self, operation: &'static str, result: Result<T>) -> Result<T> {
        let mut state = self.lock_state();
        match &result {
            Ok(_) => tracing::debug!("[SessionStore] {} completed", operation),
            Err(err) if err.is_superseded() => {
                tracing::warn!("[SessionStore] {} discarded: {}", operation, err);
            }
            Err(err) if err.is_remote() => {
                tracing::error!("[SessionStore] {} failed: {}", operation, err);
                state.last_error = Some(err.user_message());
            }
            Err(err) => tracing::debug!("[SessionStore] {} rejected: {}", operation, err),
        }
        self.publish(&state);
        result
    }

    /// Persists `session_id` on behalf of the operation that started at
    /// `epoch`.
    ///
    /// Returns false if `epoch` was superseded before or during the write. A
    /// clear that raced the write is queued behind it and removes the key
    /// afterwards.
    async fn remember_session_id(&self, session_id: &str, epoch: u64) -> bool {
        let _write = self.session_id_writes.lock().await;
        if self.lock_state().epoch != epoch {
            return false;
        }
        if let Err(e) = self.persistence.set(SESSION_ID_KEY, session_id).await {
            tracing::warn!("[SessionStore] Failed to persist session id: {}", e);
        }
        self.lock_state().epoch == epoch
    }

    async fn forget_session_id(&self) {
        let _write = self.session_id_writes.lock().await;
        if let Err(e) = self.persistence.remove(SESSION_ID_KEY).await {
            tracing::warn!("[SessionStore] Failed to remove persisted session id: {}", e);
        }
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
