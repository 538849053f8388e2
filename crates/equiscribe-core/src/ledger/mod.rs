//! Region ledger: the ordered per-report list of graded regions.
//!
//! Every canonical label appears exactly once, in catalog order. The ledger
//! keeps a revision counter that moves on every mutation so that a slow
//! analysis can tell whether the ledger changed underneath it.

mod reconcile;
mod scoring;

pub use reconcile::*;
pub use scoring::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::{Grade, RegionEntry, ANATOMICAL_REGIONS};

/// Ledger errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Region not found: {0}")]
    NotFound(String),

    #[error("Regions do not match the canonical catalog: {0}")]
    CatalogMismatch(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// A direct human edit to one region. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionPatch {
    pub comment: Option<String>,
    pub grade: Option<Grade>,
    pub is_included: Option<bool>,
}

impl RegionPatch {
    pub fn comment(comment: impl Into<String>) -> Self {
        Self {
            comment: Some(comment.into()),
            ..Default::default()
        }
    }

    pub fn grade(grade: Grade) -> Self {
        Self {
            grade: Some(grade),
            ..Default::default()
        }
    }

    pub fn included(is_included: bool) -> Self {
        Self {
            is_included: Some(is_included),
            ..Default::default()
        }
    }

    pub fn with_grade(mut self, grade: Grade) -> Self {
        self.grade = Some(grade);
        self
    }

    pub fn with_included(mut self, is_included: bool) -> Self {
        self.is_included = Some(is_included);
        self
    }

    /// Whether this patch edits the finding itself (and so locks the entry).
    pub fn touches_finding(&self) -> bool {
        self.comment.is_some() || self.grade.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.comment.is_none() && self.grade.is_none() && self.is_included.is_none()
    }
}

/// Ordered region entries for one report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<RegionEntry>", into = "Vec<RegionEntry>")]
pub struct RegionLedger {
    entries: Vec<RegionEntry>,
    revision: u64,
}

impl RegionLedger {
    /// Fresh ledger with every canonical region at its default finding.
    pub fn new() -> Self {
        Self {
            entries: ANATOMICAL_REGIONS.iter().map(|label| RegionEntry::new(label)).collect(),
            revision: 0,
        }
    }

    /// Rebuild a ledger from stored entries, checking them against the catalog.
    pub fn from_entries(entries: Vec<RegionEntry>) -> LedgerResult<Self> {
        if entries.len() != ANATOMICAL_REGIONS.len() {
            return Err(LedgerError::CatalogMismatch(format!(
                "expected {} regions, found {}",
                ANATOMICAL_REGIONS.len(),
                entries.len()
            )));
        }
        for (entry, label) in entries.iter().zip(ANATOMICAL_REGIONS.iter()) {
            if entry.label != *label {
                return Err(LedgerError::CatalogMismatch(format!(
                    "expected '{}', found '{}'",
                    label, entry.label
                )));
            }
        }
        Ok(Self { entries, revision: 0 })
    }

    pub fn entries(&self) -> &[RegionEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegionEntry> {
        self.entries.iter()
    }

    /// Included entries, in catalog order.
    pub fn included(&self) -> impl Iterator<Item = &RegionEntry> {
        self.entries.iter().filter(|entry| entry.is_included)
    }

    pub fn get(&self, label: &str) -> Option<&RegionEntry> {
        self.entries.iter().find(|entry| entry.label == label)
    }

    pub(crate) fn get_mut(&mut self, label: &str) -> Option<&mut RegionEntry> {
        self.entries.iter_mut().find(|entry| entry.label == label)
    }

    /// Revision counter; moves on every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn bump_revision(&mut self) {
        self.revision += 1;
    }

    /// Total score over included regions.
    pub fn total_score(&self) -> u32 {
        score(&self.entries)
    }

    /// Number of entries a human has edited.
    pub fn locked_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_locked).count()
    }

    /// Apply a direct human edit.
    ///
    /// Editing the comment or grade locks the entry. Emptying the comment
    /// without also setting a grade resets the grade to 0.
    pub fn update_region(&mut self, label: &str, patch: RegionPatch) -> LedgerResult<&RegionEntry> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.label == label)
            .ok_or_else(|| LedgerError::NotFound(label.to_string()))?;

        if patch.is_empty() {
            return Ok(&self.entries[index]);
        }

        let entry = &mut self.entries[index];
        let locks = patch.touches_finding();

        if let Some(comment) = patch.comment {
            if comment.is_empty() && patch.grade.is_none() {
                entry.grade = Grade::G0;
            }
            entry.comment = comment;
        }
        if let Some(grade) = patch.grade {
            entry.grade = grade;
        }
        if let Some(is_included) = patch.is_included {
            entry.is_included = is_included;
        }
        if locks {
            entry.is_locked = true;
        }

        debug!(
            region = label,
            grade = entry.grade.value(),
            included = entry.is_included,
            locked = entry.is_locked,
            "Region updated"
        );

        self.revision += 1;
        Ok(&self.entries[index])
    }

    /// Toggle inclusion without locking the entry.
    pub fn set_included(&mut self, label: &str, is_included: bool) -> LedgerResult<&RegionEntry> {
        self.update_region(label, RegionPatch::included(is_included))
    }
}

impl Default for RegionLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Ledgers compare by content; the revision is session-local.
impl PartialEq for RegionLedger {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for RegionLedger {}

impl TryFrom<Vec<RegionEntry>> for RegionLedger {
    type Error = LedgerError;

    fn try_from(entries: Vec<RegionEntry>) -> Result<Self, Self::Error> {
        Self::from_entries(entries)
    }
}

impl From<RegionLedger> for Vec<RegionEntry> {
    fn from(ledger: RegionLedger) -> Self {
        ledger.entries
    }
}
