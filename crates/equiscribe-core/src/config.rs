//! Configuration for the reporting core.
//!
//! Loaded from a TOML file; every key is optional and falls back to the
//! clinic defaults below.

use anyhow::Context;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Date format used when the configured one cannot be rendered.
pub const FALLBACK_DATE_FORMAT: &str = "%d/%m/%Y";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CoreConfig {
    /// SQLite database file
    pub database_path: PathBuf,
    pub report: ReportDefaults,
    pub analyzer: AnalyzerSettings,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("equiscribe.db"),
            report: ReportDefaults::default(),
            analyzer: AnalyzerSettings::default(),
        }
    }
}

impl CoreConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.report.validate().context("Invalid [report] section")?;
        Ok(config)
    }
}

/// Header values pre-filled on new reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportDefaults {
    pub clinic: String,
    pub veterinary: String,
    /// chrono format string for the examination date
    pub date_format: String,
}

impl Default for ReportDefaults {
    fn default() -> Self {
        Self {
            clinic: "BAILLY VÉTÉRINAIRES CLINIQUE ÉQUINE".to_string(),
            veterinary: "Christophe SCHLOTTERER".to_string(),
            date_format: FALLBACK_DATE_FORMAT.to_string(),
        }
    }
}

impl ReportDefaults {
    /// Reject a `date_format` chrono cannot parse.
    pub fn validate(&self) -> anyhow::Result<()> {
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            anyhow::bail!("Invalid date_format '{}'", self.date_format);
        }
        Ok(())
    }

    /// Today's local date in the configured format.
    ///
    /// An unusable format falls back to `FALLBACK_DATE_FORMAT`.
    pub fn today(&self) -> String {
        let now = chrono::Local::now();
        let mut date = String::new();
        if write!(date, "{}", now.format(&self.date_format)).is_err() {
            warn!(date_format = self.date_format.as_str(), "Unusable date_format, using default");
            date.clear();
            // Constant format, always renders
            let _ = write!(date, "{}", now.format(FALLBACK_DATE_FORMAT));
        }
        date
    }
}

/// Text-analysis service settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyzerSettings {
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            api_key_env: "API_KEY".to_string(),
            timeout_secs: 120,
        }
    }
}

impl AnalyzerSettings {
    /// API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}
