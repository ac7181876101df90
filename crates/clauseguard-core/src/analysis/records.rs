//! Request and response records exchanged with the analysis service.
//!
//! These are the already-deserialized shapes the network layer hands to the
//! engine. They mirror the service's wire fields; mapping into the domain
//! model (with explicit defaults) happens in the application layer.

use serde::{Deserialize, Serialize};

use crate::session::{ContractArtifacts, DetectedLanguage};

/// A contract file picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    /// MIME type reported by the picker
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub session_id: String,
    #[serde(default)]
    pub message: String,
}

/// Session metadata as reported by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: String,
    pub original_filename: String,
    pub original_format: String,
    pub detected_language: DetectedLanguage,
    pub analysis_timestamp: String,
    #[serde(default)]
    pub modified_contract_info: Option<ContractArtifacts>,
    #[serde(default)]
    pub marked_contract_info: Option<ContractArtifacts>,
    #[serde(default)]
    pub pdf_preview_info: Option<ContractArtifacts>,
}

/// A term as reported by the service. Everything past the AI judgment is
/// optional on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermRecord {
    pub term_id: String,
    pub term_text: String,
    pub ai_is_compliant: bool,
    #[serde(default)]
    pub ai_issue: Option<String>,
    #[serde(default)]
    pub ai_reference: Option<String>,
    #[serde(default)]
    pub ai_suggested_text: Option<String>,
    #[serde(default)]
    pub user_modified_text: Option<String>,
    #[serde(default)]
    pub is_user_confirmed: Option<bool>,
    #[serde(default)]
    pub reviewed_text: Option<String>,
    #[serde(default)]
    pub is_reviewed_compliant: Option<bool>,
    #[serde(default)]
    pub reviewed_issue: Option<String>,
    #[serde(default)]
    pub expert_override_is_compliant: Option<bool>,
    #[serde(default)]
    pub last_expert_feedback_id: Option<String>,
    #[serde(default)]
    pub has_expert_feedback: Option<bool>,
}

impl TermRecord {
    /// Creates a record carrying only the initial AI judgment.
    pub fn new(
        term_id: impl Into<String>,
        term_text: impl Into<String>,
        ai_is_compliant: bool,
    ) -> Self {
        Self {
            term_id: term_id.into(),
            term_text: term_text.into(),
            ai_is_compliant,
            ai_issue: None,
            ai_reference: None,
            ai_suggested_text: None,
            user_modified_text: None,
            is_user_confirmed: None,
            reviewed_text: None,
            is_reviewed_compliant: None,
            reviewed_issue: None,
            expert_override_is_compliant: None,
            last_expert_feedback_id: None,
            has_expert_feedback: None,
        }
    }
}

/// Question about a single term or about the whole contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRequest {
    pub session_id: String,
    pub question: String,
    pub term_id: Option<String>,
    /// Current wording of the term, sent as context
    pub term_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRequest {
    pub session_id: String,
    pub term_id: String,
    pub user_text: String,
    /// Immutable original clause text
    pub original_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub reviewed_text: String,
    pub still_compliant: bool,
    #[serde(default)]
    pub new_issue: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateModifiedResponse {
    pub success: bool,
    #[serde(default)]
    pub docx_url: Option<String>,
    #[serde(default)]
    pub txt_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMarkedResponse {
    pub success: bool,
    #[serde(default)]
    pub docx_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpertFeedbackRequest {
    pub session_id: String,
    pub term_id: String,
    pub is_compliant: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpertFeedbackResponse {
    pub success: bool,
    #[serde(default)]
    pub feedback_id: Option<String>,
}
