//! Stateful in-process stand-in for the analysis service.

use async_trait::async_trait;
use clauseguard_core::analysis::{
    AnalysisClient, ConfirmResponse, ExpertFeedbackRequest, ExpertFeedbackResponse,
    GenerateMarkedResponse, GenerateModifiedResponse, QuestionRequest, ReviewRequest,
    ReviewResponse, SessionRecord, TermRecord, UploadFile, UploadResponse,
};
use clauseguard_core::error::{ClauseError, Result};
use clauseguard_core::session::DetectedLanguage;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

struct StoredSession {
    record: SessionRecord,
    terms: Vec<TermRecord>,
}

/// Remembers every session it analyzed, so a fresh store can rehydrate.
#[derive(Default)]
pub struct FakeAnalysisService {
    sessions: Mutex<HashMap<String, StoredSession>>,
    calls: AtomicUsize,
}

impl FakeAnalysisService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Forgets a session, as the service does when it expires one.
    pub fn expire(&self, session_id: &str) {
        self.sessions.lock().unwrap().remove(session_id);
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn with_session<R>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut StoredSession) -> Result<R>,
    ) -> Result<R> {
        let mut sessions = self.sessions.lock().unwrap();
        let stored = sessions
            .get_mut(session_id)
            .ok_or_else(|| ClauseError::not_found("Session", session_id))?;
        f(stored)
    }
}

fn analyzed_terms() -> Vec<TermRecord> {
    let mut penalty = TermRecord::new("t1", "A late fee of 5% accrues monthly.", false);
    penalty.ai_issue = Some("Compounding late fees".to_string());
    penalty.ai_suggested_text = Some("A one-time late fee applies.".to_string());
    vec![
        penalty,
        TermRecord::new("t2", "Goods are delivered within 30 days.", true),
        TermRecord::new("t3", "Either party may terminate with notice.", true),
    ]
}

#[async_trait]
impl AnalysisClient for FakeAnalysisService {
    async fn upload(&self, file: UploadFile) -> Result<UploadResponse> {
        self.hit();
        let session_id = uuid::Uuid::new_v4().to_string();
        let (_, format) = file
            .filename
            .rsplit_once('.')
            .ok_or_else(|| ClauseError::server("Unsupported file type"))?;
        let record = SessionRecord {
            session_id: session_id.clone(),
            original_filename: file.filename.clone(),
            original_format: format.to_string(),
            detected_language: DetectedLanguage::En,
            analysis_timestamp: "2024-05-01T10:00:00Z".to_string(),
            modified_contract_info: None,
            marked_contract_info: None,
            pdf_preview_info: None,
        };
        self.sessions.lock().unwrap().insert(
            session_id.clone(),
            StoredSession {
                record,
                terms: analyzed_terms(),
            },
        );
        Ok(UploadResponse {
            session_id,
            message: "Contract analyzed".to_string(),
        })
    }

    async fn get_session_details(&self, session_id: &str) -> Result<SessionRecord> {
        self.hit();
        self.with_session(session_id, |stored| Ok(stored.record.clone()))
    }

    async fn get_terms(&self, session_id: &str) -> Result<Vec<TermRecord>> {
        self.hit();
        self.with_session(session_id, |stored| Ok(stored.terms.clone()))
    }

    async fn ask_question(&self, request: QuestionRequest) -> Result<String> {
        self.hit();
        self.with_session(&request.session_id, |_| {
            Ok(format!("Regarding '{}': it depends.", request.question))
        })
    }

    async fn review_modification(&self, request: ReviewRequest) -> Result<ReviewResponse> {
        self.hit();
        self.with_session(&request.session_id, |stored| {
            let term = stored
                .terms
                .iter_mut()
                .find(|t| t.term_id == request.term_id)
                .ok_or_else(|| ClauseError::not_found("Term", request.term_id.clone()))?;
            let still_compliant = !request.user_text.contains('%');
            term.reviewed_text = Some(request.user_text.clone());
            term.is_reviewed_compliant = Some(still_compliant);
            Ok(ReviewResponse {
                reviewed_text: request.user_text,
                still_compliant,
                new_issue: (!still_compliant).then(|| "Percentage fees remain".to_string()),
            })
        })
    }

    async fn confirm_modification(
        &self,
        session_id: &str,
        term_id: &str,
        text: &str,
    ) -> Result<ConfirmResponse> {
        self.hit();
        self.with_session(session_id, |stored| {
            let term = stored
                .terms
                .iter_mut()
                .find(|t| t.term_id == term_id)
                .ok_or_else(|| ClauseError::not_found("Term", term_id))?;
            term.user_modified_text = Some(text.to_string());
            term.is_user_confirmed = Some(true);
            term.reviewed_text = None;
            term.is_reviewed_compliant = None;
            Ok(ConfirmResponse {
                success: true,
                message: "Modification confirmed".to_string(),
            })
        })
    }

    async fn generate_modified_contract(
        &self,
        session_id: &str,
    ) -> Result<GenerateModifiedResponse> {
        self.hit();
        self.with_session(session_id, |_| {
            Ok(GenerateModifiedResponse {
                success: true,
                docx_url: Some(format!("https://files.example/{session_id}/modified.docx")),
                txt_url: Some(format!("https://files.example/{session_id}/modified.txt")),
            })
        })
    }

    async fn generate_marked_contract(&self, session_id: &str) -> Result<GenerateMarkedResponse> {
        self.hit();
        self.with_session(session_id, |_| {
            Ok(GenerateMarkedResponse {
                success: true,
                docx_url: Some(format!("https://files.example/{session_id}/marked.docx")),
            })
        })
    }

    async fn submit_expert_feedback(
        &self,
        request: ExpertFeedbackRequest,
    ) -> Result<ExpertFeedbackResponse> {
        self.hit();
        self.with_session(&request.session_id, |stored| {
            let term = stored
                .terms
                .iter_mut()
                .find(|t| t.term_id == request.term_id)
                .ok_or_else(|| ClauseError::not_found("Term", request.term_id.clone()))?;
            let feedback_id = format!("fb-{}", request.term_id);
            term.expert_override_is_compliant = Some(request.is_compliant);
            term.last_expert_feedback_id = Some(feedback_id.clone());
            term.has_expert_feedback = Some(true);
            Ok(ExpertFeedbackResponse {
                success: true,
                feedback_id: Some(feedback_id),
            })
        })
    }
}
