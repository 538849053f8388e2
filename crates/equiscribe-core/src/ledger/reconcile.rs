//! Merging analyzer suggestions into a ledger.
//!
//! Human edits always win: a locked entry is never touched. Changes made
//! here never lock an entry, so a later analysis may keep refining it until
//! someone edits it by hand.

use tracing::{debug, warn};

use super::RegionLedger;
use crate::models::{AnalysisScope, Grade, RegionSuggestion, DEFAULT_COMMENT, NOTHING_TO_REPORT};

/// What happened to each suggestion of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Labels whose entry was written
    pub applied: Vec<String>,
    /// Labels skipped because a human edited them
    pub skipped_locked: Vec<String>,
    /// Labels not in the catalog
    pub unknown: Vec<String>,
}

impl ReconcileOutcome {
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }
}

/// Resolve the comment and grade a suggestion should produce.
///
/// A blank comment becomes the default finding; any other comment is kept
/// exactly as suggested. A default finding, a blank comment or the "RAS"
/// marker force grade 0. Whitespace is ignored for these checks only.
///
/// Grades outside 0-4 are not carried through as-is: `Grade` is closed, so
/// they are logged and stored as 0.
pub fn resolve_suggestion(suggestion: &RegionSuggestion) -> (String, Grade) {
    let raw = suggestion.raw_comment();
    let trimmed = raw.trim();
    let comment = if trimmed.is_empty() {
        DEFAULT_COMMENT.to_string()
    } else {
        raw.to_string()
    };

    let nothing_found = trimmed.is_empty()
        || trimmed == DEFAULT_COMMENT
        || trimmed.eq_ignore_ascii_case(NOTHING_TO_REPORT);

    let grade = if nothing_found {
        Grade::G0
    } else {
        let value = suggestion.grade.unwrap_or(0);
        Grade::from_value(value).unwrap_or_else(|| {
            warn!(
                region = suggestion.label.as_str(),
                grade = value,
                "Suggested grade out of range, using 0"
            );
            Grade::G0
        })
    };

    (comment, grade)
}

impl RegionLedger {
    /// Merge analyzer suggestions into unlocked entries.
    ///
    /// A session pass also marks every mentioned region as included.
    pub fn apply_suggestions(
        &mut self,
        suggestions: &[RegionSuggestion],
        scope: AnalysisScope,
    ) -> ReconcileOutcome {
        let mut outcome = ReconcileOutcome::default();
        let mut changed = false;

        for suggestion in suggestions {
            let Some(entry) = self.get_mut(&suggestion.label) else {
                debug!(region = suggestion.label.as_str(), "Ignoring unknown region");
                outcome.unknown.push(suggestion.label.clone());
                continue;
            };

            if entry.is_locked {
                debug!(region = suggestion.label.as_str(), "Region locked, keeping human edit");
                outcome.skipped_locked.push(suggestion.label.clone());
                continue;
            }

            let (comment, grade) = resolve_suggestion(suggestion);
            let include = scope == AnalysisScope::Session || entry.is_included;

            if entry.comment != comment || entry.grade != grade || entry.is_included != include {
                entry.comment = comment;
                entry.grade = grade;
                entry.is_included = include;
                changed = true;
            }
            outcome.applied.push(suggestion.label.clone());
        }

        if changed {
            self.bump_revision();
        }

        debug!(
            applied = outcome.applied.len(),
            skipped_locked = outcome.skipped_locked.len(),
            unknown = outcome.unknown.len(),
            ?scope,
            "Suggestions reconciled"
        );
        outcome
    }
}
