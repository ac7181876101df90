//! Term domain model.
//!
//! A term is one clause of the analyzed contract. Its fields are grouped by
//! the authority that writes them: the initial AI analysis, the user's edit,
//! the AI re-review of that edit, and a domain expert.

use serde::{Deserialize, Serialize};

/// One clause of the contract under compliance review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    /// Unique within the session
    pub term_id: String,
    /// Original clause text; never modified
    pub term_text: String,

    // ============================================================================
    // Initial AI judgment
    // ============================================================================
    pub ai_is_compliant: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_issue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_suggested_text: Option<String>,

    // ============================================================================
    // User edit
    // ============================================================================
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_modified_text: Option<String>,
    #[serde(default)]
    pub is_user_confirmed: bool,

    // ============================================================================
    // AI re-review of the user's edit
    // ============================================================================
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_reviewed_compliant: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_issue: Option<String>,

    // ============================================================================
    // Expert override
    // ============================================================================
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expert_override_is_compliant: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_expert_feedback_id: Option<String>,
    #[serde(default)]
    pub has_expert_feedback: bool,

    /// Answer to the last question asked about this term. Not persisted.
    #[serde(skip)]
    pub last_qa_answer: Option<String>,
}

impl Term {
    /// Creates a term carrying only the initial AI judgment.
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
            is_user_confirmed: false,
            reviewed_text: None,
            is_reviewed_compliant: None,
            reviewed_issue: None,
            expert_override_is_compliant: None,
            last_expert_feedback_id: None,
            has_expert_feedback: false,
            last_qa_answer: None,
        }
    }

    /// Returns true if an AI re-review result is present.
    pub fn has_review(&self) -> bool {
        self.is_reviewed_compliant.is_some()
    }

    /// Text that currently stands for this clause: the user's edit if any,
    /// otherwise the original.
    pub fn current_text(&self) -> &str {
        self.user_modified_text
            .as_deref()
            .unwrap_or(self.term_text.as_str())
    }

    /// Applies the result of an AI re-review of the user's edit.
    ///
    /// A review always un-confirms the term and drops any stale answer.
    pub fn apply_review(
        &mut self,
        reviewed_text: String,
        still_compliant: bool,
        new_issue: Option<String>,
    ) {
        self.user_modified_text = Some(reviewed_text.clone());
        self.reviewed_text = Some(reviewed_text);
        self.is_reviewed_compliant = Some(still_compliant);
        self.reviewed_issue = new_issue;
        self.is_user_confirmed = false;
        self.last_qa_answer = None;
    }

    /// Locks in `text` as the user's confirmed wording.
    ///
    /// Confirmation supersedes any earlier review result.
    pub fn apply_confirmation(&mut self, text: String) {
        self.is_user_confirmed = true;
        self.user_modified_text = Some(text);
        self.reviewed_text = None;
        self.is_reviewed_compliant = None;
        self.reviewed_issue = None;
    }

    /// Records an expert verdict, which dominates every other source.
    pub fn apply_expert_override(&mut self, is_compliant: bool, feedback_id: String) {
        self.expert_override_is_compliant = Some(is_compliant);
        self.last_expert_feedback_id = Some(feedback_id);
        self.has_expert_feedback = true;
    }
}
