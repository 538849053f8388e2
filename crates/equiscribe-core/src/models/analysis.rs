//! Text-analysis contract: transcript in, per-region suggestions out.
//!
//! The analyzer is an untrusted collaborator. Every field of its response is
//! optional on the wire and defaults conservatively when missing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Analysis errors. All of them are recoverable: nothing was applied.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Nothing to analyze: transcript is empty")]
    EmptyTranscript,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Analysis service error: {0}")]
    Service(String),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
}

/// Which transcript an analysis covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisScope {
    /// Dictation made while refining one report
    Targeted,
    /// Whole consultation; also extracts the horse name
    Session,
}

/// One suggested region finding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSuggestion {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub grade: Option<i64>,
}

impl RegionSuggestion {
    pub fn new(label: impl Into<String>, comment: impl Into<String>, grade: i64) -> Self {
        Self {
            label: label.into(),
            comment: Some(comment.into()),
            grade: Some(grade),
        }
    }

    /// Raw comment, empty when the analyzer left it out.
    pub fn raw_comment(&self) -> &str {
        self.comment.as_deref().unwrap_or("")
    }
}

/// Structured analyzer response. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default)]
    pub horse_name: Option<String>,
    #[serde(default)]
    pub regions: Vec<RegionSuggestion>,
}

impl AnalysisResult {
    /// Extracted horse name, if the analyzer found a non-blank one.
    pub fn horse_name(&self) -> Option<&str> {
        self.horse_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Seam for the external text-analysis service.
pub trait TextAnalyzer {
    /// Analyze a transcript against the canonical region catalog.
    fn analyze(&self, transcript: &str, scope: AnalysisScope) -> Result<AnalysisResult, AnalysisError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default() {
        let result: AnalysisResult =
            serde_json::from_str(r#"{"regions":[{"label":"Pieds"}]}"#).unwrap();
        assert_eq!(result.horse_name, None);
        assert_eq!(result.regions[0].raw_comment(), "");
        assert_eq!(result.regions[0].grade, None);
    }

    #[test]
    fn test_null_fields_default() {
        let result: AnalysisResult = serde_json::from_str(
            r#"{"horseName":null,"regions":[{"label":"Pieds","comment":null,"grade":null}]}"#,
        )
        .unwrap();
        assert_eq!(result.regions[0].comment, None);
        assert_eq!(result.regions[0].grade, None);
    }

    #[test]
    fn test_blank_horse_name_ignored() {
        let result = AnalysisResult {
            horse_name: Some("   ".into()),
            regions: vec![],
        };
        assert_eq!(result.horse_name(), None);

        let result = AnalysisResult {
            horse_name: Some(" Jappeloup ".into()),
            regions: vec![],
        };
        assert_eq!(result.horse_name(), Some("Jappeloup"));
    }
}
