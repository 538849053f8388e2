//! Anatomical regions and the canonical catalog.

use serde::{Deserialize, Serialize};

use super::grade::Grade;

/// Canonical anatomical regions, in display and export order.
pub const ANATOMICAL_REGIONS: [&str; 12] = [
    "Naviculaire Ant. G",
    "Naviculaire Ant. D",
    "Boulet Ant. G",
    "Boulet Ant. D",
    "Boulet Post. G",
    "Boulet Post. D",
    "Jarret G",
    "Jarret D",
    "Grasset G",
    "Grasset D",
    "Pieds",
    "Dos / Rachis",
];

/// Comment used when a region shows nothing abnormal.
pub const DEFAULT_COMMENT: &str =
    "Absence d'image radiographique indicatrice de pathologie ostéo-articulaire";

/// Dictation shorthand for "nothing to report".
pub const NOTHING_TO_REPORT: &str = "RAS";

/// Derive the stable region id from its label.
pub fn region_slug(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Check whether a label belongs to the canonical catalog.
pub fn is_canonical(label: &str) -> bool {
    ANATOMICAL_REGIONS.contains(&label)
}

/// One anatomical zone under evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegionEntry {
    /// Slug derived from the label
    pub id: String,
    /// Canonical anatomical name
    pub label: String,
    /// Free-text finding
    pub comment: String,
    pub grade: Grade,
    /// Counts toward the score and appears in exports
    pub is_included: bool,
    /// Set by a direct human edit; AI suggestions never touch a locked entry
    pub is_locked: bool,
}

impl RegionEntry {
    /// Fresh entry with the default finding.
    pub fn new(label: &str) -> Self {
        Self {
            id: region_slug(label),
            label: label.to_string(),
            comment: DEFAULT_COMMENT.to_string(),
            grade: Grade::G0,
            is_included: true,
            is_locked: false,
        }
    }

    /// Points this entry contributes to the total score.
    pub fn contribution(&self) -> u32 {
        if self.is_included {
            self.grade.points()
        } else {
            0
        }
    }

    /// True when the comment is still the default finding.
    pub fn has_default_comment(&self) -> bool {
        self.comment == DEFAULT_COMMENT
    }
}
