//! Report aggregate and its status lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::ReportDefaults;
use crate::ledger::RegionLedger;

/// Report status.
///
/// Moves forward only: draft → validated → sent, or draft → sent directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Being edited
    #[default]
    Draft,
    /// Approved by the vet
    Validated,
    /// Exported and handed to the client
    Sent,
}

/// Refused status change.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot move report from {from} to {to}")]
pub struct TransitionError {
    pub from: ReportStatus,
    pub to: ReportStatus,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Draft => "draft",
            ReportStatus::Validated => "validated",
            ReportStatus::Sent => "sent",
        }
    }

    /// Whether a save may move a report from `self` to `target`.
    /// Re-saving under the same status is always allowed.
    pub fn can_transition_to(&self, target: ReportStatus) -> bool {
        matches!(
            (self, target),
            (ReportStatus::Draft, _)
                | (ReportStatus::Validated, ReportStatus::Validated)
                | (ReportStatus::Validated, ReportStatus::Sent)
                | (ReportStatus::Sent, ReportStatus::Sent)
        )
    }

    pub fn transition_to(&self, target: ReportStatus) -> Result<ReportStatus, TransitionError> {
        if self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(TransitionError { from: *self, to: target })
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ReportStatus::Draft),
            "validated" => Ok(ReportStatus::Validated),
            "sent" => Ok(ReportStatus::Sent),
            _ => Err(format!("Unknown report status: {}", s)),
        }
    }
}

/// A radiographic reading report for one horse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// UUID, assigned when the report is created
    pub id: String,
    pub horse_name: String,
    pub clinic: String,
    pub veterinary: String,
    /// Examination date as typed, never parsed
    pub exam_date: String,
    /// Optional link to a client record
    pub client_id: Option<String>,
    pub regions: RegionLedger,
    pub status: ReportStatus,
    /// Creation timestamp, kept across saves
    pub created_at: String,
    /// Last save timestamp
    pub updated_at: String,
}

impl Report {
    /// Create a blank draft with a fresh identifier.
    pub fn new(clinic: String, veterinary: String, exam_date: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            horse_name: String::new(),
            clinic,
            veterinary,
            exam_date,
            client_id: None,
            regions: RegionLedger::new(),
            status: ReportStatus::Draft,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Create a blank draft from configured defaults, dated today.
    pub fn with_defaults(defaults: &ReportDefaults) -> Self {
        Self::new(
            defaults.clinic.clone(),
            defaults.veterinary.clone(),
            defaults.today(),
        )
    }

    /// Total score, always derived from the regions.
    pub fn total_score(&self) -> u32 {
        self.regions.total_score()
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }

    /// Case-insensitive match on horse name or veterinary name.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.horse_name.to_lowercase().contains(&query)
            || self.veterinary.to_lowercase().contains(&query)
    }
}
