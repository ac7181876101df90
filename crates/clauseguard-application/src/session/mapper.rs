//! Mapping of service records into the domain model.
//!
//! Defaults are explicit here: a term without confirmation or expert data
//! comes in unconfirmed and without expert feedback, and every nullable
//! review field stays absent.

use clauseguard_core::analysis::{SessionRecord, TermRecord};
use clauseguard_core::error::{ClauseError, Result};
use clauseguard_core::session::{Session, Term};
use std::collections::HashSet;

/// Maps session metadata, checking it belongs to the requested session.
pub fn map_session(requested_id: &str, record: SessionRecord) -> Result<Session> {
    if record.session_id != requested_id {
        return Err(ClauseError::validation(format!(
            "Session record '{}' does not match requested session '{}'",
            record.session_id, requested_id
        )));
    }

    Ok(Session {
        session_id: record.session_id,
        original_filename: record.original_filename,
        original_format: record.original_format,
        detected_language: record.detected_language,
        analysis_timestamp: record.analysis_timestamp,
        modified_contract_info: record.modified_contract_info.filter(|a| !a.is_empty()),
        marked_contract_info: record.marked_contract_info.filter(|a| !a.is_empty()),
        pdf_preview_info: record.pdf_preview_info.filter(|a| !a.is_empty()),
    })
}

/// Maps term records, rejecting empty or duplicate term ids.
pub fn map_terms(records: Vec<TermRecord>) -> Result<Vec<Term>> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .map(|record| {
            if record.term_id.trim().is_empty() {
                return Err(ClauseError::validation("Term record without a term id"));
            }
            if !seen.insert(record.term_id.clone()) {
                return Err(ClauseError::validation(format!(
                    "Duplicate term id '{}'",
                    record.term_id
                )));
            }
            Ok(map_term(record))
        })
        .collect()
}

fn map_term(record: TermRecord) -> Term {
    Term {
        term_id: record.term_id,
        term_text: record.term_text,
        ai_is_compliant: record.ai_is_compliant,
        ai_issue: record.ai_issue,
        ai_reference: record.ai_reference,
        ai_suggested_text: record.ai_suggested_text,
        user_modified_text: record.user_modified_text,
        is_user_confirmed: record.is_user_confirmed.unwrap_or(false),
        reviewed_text: record.reviewed_text,
        is_reviewed_compliant: record.is_reviewed_compliant,
        reviewed_issue: record.reviewed_issue,
        has_expert_feedback: record
            .has_expert_feedback
            .unwrap_or(record.expert_override_is_compliant.is_some()),
        expert_override_is_compliant: record.expert_override_is_compliant,
        last_expert_feedback_id: record.last_expert_feedback_id,
        last_qa_answer: None,
    }
}
