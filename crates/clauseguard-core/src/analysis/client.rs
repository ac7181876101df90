//! Analysis client trait.
//!
//! Defines the interface to the remote analysis service.

use async_trait::async_trait;

use super::records::{
    ConfirmResponse, ExpertFeedbackRequest, ExpertFeedbackResponse, GenerateMarkedResponse,
    GenerateModifiedResponse, QuestionRequest, ReviewRequest, ReviewResponse, SessionRecord,
    TermRecord, UploadFile, UploadResponse,
};
use crate::error::Result;

/// An abstract client for the remote contract analysis service.
///
/// This trait decouples the engine from the transport (HTTP, IPC, a test
/// double). Implementations map failures to:
///
/// - `ClauseError::Transport` when the request could not be completed
/// - `ClauseError::Server` when the service answered with an error
/// - `ClauseError::NotFound` when the session no longer exists server-side
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Uploads a contract and runs the initial analysis.
    async fn upload(&self, file: UploadFile) -> Result<UploadResponse>;

    /// Fetches session metadata.
    async fn get_session_details(&self, session_id: &str) -> Result<SessionRecord>;

    /// Fetches the analyzed terms of a session.
    async fn get_terms(&self, session_id: &str) -> Result<Vec<TermRecord>>;

    /// Asks a question about one term or the whole contract. Returns the answer text.
    async fn ask_question(&self, request: QuestionRequest) -> Result<String>;

    /// Has the service re-review a user's edit of a term.
    async fn review_modification(&self, request: ReviewRequest) -> Result<ReviewResponse>;

    /// Records the user's final wording of a term.
    async fn confirm_modification(
        &self,
        session_id: &str,
        term_id: &str,
        text: &str,
    ) -> Result<ConfirmResponse>;

    /// Generates the contract with all confirmed modifications applied.
    async fn generate_modified_contract(&self, session_id: &str)
    -> Result<GenerateModifiedResponse>;

    /// Generates the original contract with non-compliant terms highlighted.
    async fn generate_marked_contract(&self, session_id: &str) -> Result<GenerateMarkedResponse>;

    /// Submits an expert's verdict on a term.
    async fn submit_expert_feedback(
        &self,
        request: ExpertFeedbackRequest,
    ) -> Result<ExpertFeedbackResponse>;
}
