//! Term reconciliation.
//!
//! Pure functions that resolve a term's effective compliance verdict and fold
//! a term collection into aggregate statistics. Every view of compliance in
//! the engine goes through [`effective_compliance`].

use serde::{Deserialize, Serialize};

use crate::session::Term;

/// Aggregate compliance statistics derived from a term collection.
///
/// Never stored on its own; recompute with [`compute_stats`] whenever the
/// terms change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceStats {
    pub total_terms: usize,
    pub compliant_count: usize,
    pub non_compliant_count: usize,
    /// Percentage of compliant terms, rounded to two decimals. 0 for no terms.
    pub overall_compliance_percentage: f64,
}

/// Resolves the single compliance verdict for a term.
///
/// Precedence, highest first:
/// 1. expert override
/// 2. AI re-review result, whether or not the user confirmed it
/// 3. initial AI judgment
///
/// `is_user_confirmed` never changes the verdict.
pub fn effective_compliance(term: &Term) -> bool {
    term.expert_override_is_compliant
        .or(term.is_reviewed_compliant)
        .unwrap_or(term.ai_is_compliant)
}

/// Folds [`effective_compliance`] over `terms`.
pub fn compute_stats<'a, I>(terms: I) -> ComplianceStats
where
    I: IntoIterator<Item = &'a Term>,
{
    let (total, compliant) = terms
        .into_iter()
        .fold((0usize, 0usize), |(total, compliant), term| {
            (total + 1, compliant + usize::from(effective_compliance(term)))
        });

    if total == 0 {
        return ComplianceStats::default();
    }

    let ratio = compliant as f64 / total as f64;
    ComplianceStats {
        total_terms: total,
        compliant_count: compliant,
        non_compliant_count: total - compliant,
        overall_compliance_percentage: (ratio * 10_000.0).round() / 100.0,
    }
}
