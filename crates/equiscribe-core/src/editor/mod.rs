//! Report editing session.
//!
//! Ties the ledger, the dictation buffer, the analyzer and the store
//! together, and enforces the status lifecycle on every save.

mod transcript;

pub use transcript::*;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ReportDefaults;
use crate::db::{Database, DbError, DbResult};
use crate::export::{DocumentRenderer, ExportError, ExportFormat, ReportDocument};
use crate::ledger::{LedgerError, ReconcileOutcome, RegionLedger, RegionPatch};
use crate::models::{
    AnalysisError, AnalysisResult, AnalysisScope, RegionEntry, Report, ReportStatus,
    TextAnalyzer, TransitionError,
};

/// Editor errors.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(#[from] AnalysisError),

    #[error("Analysis discarded: regions changed since revision {requested} (now {current})")]
    StaleAnalysis { requested: u64, current: u64 },

    #[error("Persistence failed: {0}")]
    PersistenceFailed(#[from] DbError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),
}

pub type EditorResult<T> = Result<T, EditorError>;

/// Where saved reports go.
pub trait ReportStore {
    fn save_report(&self, report: &Report) -> DbResult<()>;
}

impl ReportStore for Database {
    fn save_report(&self, report: &Report) -> DbResult<()> {
        Database::save_report(self, report)
    }
}

/// An analysis request, stamped with the ledger revision it was made against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTicket {
    pub revision: u64,
    pub scope: AnalysisScope,
    pub transcript: String,
}

/// A rendered export together with the report state it was made from.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub format: ExportFormat,
    pub file_name: String,
    pub fingerprint: String,
    pub bytes: Vec<u8>,
}

/// One report being edited.
#[derive(Debug, Clone)]
pub struct ReportEditor {
    report: Report,
    transcript: TranscriptBuffer,
    pending: Option<u64>,
}

impl ReportEditor {
    /// Start a blank report.
    pub fn new(defaults: &ReportDefaults) -> Self {
        Self::open(Report::with_defaults(defaults))
    }

    /// Edit an existing report. Identity and creation time are kept.
    pub fn open(report: Report) -> Self {
        Self {
            report,
            transcript: TranscriptBuffer::new(AnalysisScope::Targeted),
            pending: None,
        }
    }

    /// Start a new report pre-filled from a whole-consultation analysis.
    ///
    /// Regions the analysis does not mention keep their defaults.
    pub fn from_session(defaults: &ReportDefaults, result: &AnalysisResult) -> Self {
        let mut report = Report::with_defaults(defaults);
        if let Some(name) = result.horse_name() {
            report.horse_name = name.to_string();
        }
        let outcome = report
            .regions
            .apply_suggestions(&result.regions, AnalysisScope::Session);
        info!(
            report_id = report.id.as_str(),
            applied = outcome.applied_count(),
            total_score = report.total_score(),
            "Report started from session"
        );
        Self::open(report)
    }

    /// Analyze a consultation transcript and start a new report from it.
    pub fn start_session(
        defaults: &ReportDefaults,
        transcript: &TranscriptBuffer,
        analyzer: &dyn TextAnalyzer,
    ) -> EditorResult<Self> {
        let text = transcript.text_for_analysis();
        if text.is_empty() {
            return Err(AnalysisError::EmptyTranscript.into());
        }
        let result = analyzer.analyze(&text, AnalysisScope::Session).map_err(|e| {
            warn!(error = %e, "Session analysis failed");
            e
        })?;
        Ok(Self::from_session(defaults, &result))
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn into_report(self) -> Report {
        self.report
    }

    pub fn id(&self) -> &str {
        &self.report.id
    }

    pub fn status(&self) -> ReportStatus {
        self.report.status
    }

    pub fn regions(&self) -> &RegionLedger {
        &self.report.regions
    }

    pub fn total_score(&self) -> u32 {
        self.report.total_score()
    }

    pub fn transcript(&self) -> &TranscriptBuffer {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut TranscriptBuffer {
        &mut self.transcript
    }

    pub fn set_horse_name(&mut self, name: impl Into<String>) {
        self.report.horse_name = name.into();
    }

    pub fn set_clinic(&mut self, clinic: impl Into<String>) {
        self.report.clinic = clinic.into();
    }

    pub fn set_veterinary(&mut self, veterinary: impl Into<String>) {
        self.report.veterinary = veterinary.into();
    }

    pub fn set_exam_date(&mut self, date: impl Into<String>) {
        self.report.exam_date = date.into();
    }

    /// Link or unlink a client. An empty id unlinks.
    pub fn set_client(&mut self, client_id: Option<String>) {
        self.report.client_id = client_id.filter(|id| !id.is_empty());
    }

    /// Direct human edit of one region.
    pub fn update_region(&mut self, label: &str, patch: RegionPatch) -> EditorResult<&RegionEntry> {
        Ok(self.report.regions.update_region(label, patch)?)
    }

    pub fn set_included(&mut self, label: &str, is_included: bool) -> EditorResult<&RegionEntry> {
        Ok(self.report.regions.set_included(label, is_included)?)
    }

    /// True while an analysis ticket is outstanding.
    pub fn is_analyzing(&self) -> bool {
        self.pending.is_some()
    }

    /// Snapshot the dictation for a targeted analysis.
    pub fn begin_analysis(&mut self) -> EditorResult<AnalysisTicket> {
        let transcript = self.transcript.text_for_analysis();
        if transcript.is_empty() {
            return Err(AnalysisError::EmptyTranscript.into());
        }
        let revision = self.report.regions.revision();
        self.pending = Some(revision);
        debug!(report_id = self.report.id.as_str(), revision, "Analysis requested");
        Ok(AnalysisTicket {
            revision,
            scope: AnalysisScope::Targeted,
            transcript,
        })
    }

    /// Merge an analysis answer, unless the regions changed since the ticket.
    pub fn apply_analysis(
        &mut self,
        ticket: &AnalysisTicket,
        result: &AnalysisResult,
    ) -> EditorResult<ReconcileOutcome> {
        self.pending = None;
        let current = self.report.regions.revision();
        if current != ticket.revision {
            warn!(
                report_id = self.report.id.as_str(),
                requested = ticket.revision,
                current,
                "Discarding stale analysis"
            );
            return Err(EditorError::StaleAnalysis {
                requested: ticket.revision,
                current,
            });
        }
        let outcome = self
            .report
            .regions
            .apply_suggestions(&result.regions, ticket.scope);
        info!(
            report_id = self.report.id.as_str(),
            applied = outcome.applied_count(),
            skipped_locked = outcome.skipped_locked.len(),
            total_score = self.report.total_score(),
            "Analysis applied"
        );
        Ok(outcome)
    }

    /// Forget an outstanding analysis; its answer will be refused.
    pub fn abandon_analysis(&mut self) {
        if self.pending.take().is_some() {
            // Any later answer must not match this revision
            self.report.regions.bump_revision();
        }
    }

    /// Run a targeted analysis of the current dictation and merge it.
    pub fn analyze_with(&mut self, analyzer: &dyn TextAnalyzer) -> EditorResult<ReconcileOutcome> {
        let ticket = self.begin_analysis()?;
        match analyzer.analyze(&ticket.transcript, ticket.scope) {
            Ok(result) => self.apply_analysis(&ticket, &result),
            Err(e) => {
                self.pending = None;
                warn!(report_id = self.report.id.as_str(), error = %e, "Analysis failed");
                Err(e.into())
            }
        }
    }

    /// Save under the current status.
    pub fn save_draft(&mut self, store: &dyn ReportStore) -> EditorResult<&Report> {
        self.save(store, None)
    }

    /// Save as validated.
    pub fn validate(&mut self, store: &dyn ReportStore) -> EditorResult<&Report> {
        self.save(store, Some(ReportStatus::Validated))
    }

    /// Save, optionally moving to a new status.
    ///
    /// Nothing in the editor changes unless the store accepted the report.
    pub fn save(
        &mut self,
        store: &dyn ReportStore,
        status: Option<ReportStatus>,
    ) -> EditorResult<&Report> {
        let target = self
            .report
            .status
            .transition_to(status.unwrap_or(self.report.status))?;

        let mut snapshot = self.report.clone();
        snapshot.status = target;
        snapshot.touch();

        store.save_report(&snapshot).map_err(|e| {
            warn!(report_id = snapshot.id.as_str(), error = %e, "Save failed, edits kept");
            e
        })?;

        info!(
            report_id = snapshot.id.as_str(),
            from = self.report.status.as_str(),
            to = target.as_str(),
            total_score = snapshot.total_score(),
            "Report saved"
        );
        self.report = snapshot;
        Ok(&self.report)
    }

    /// Render the current report, then save it as sent.
    pub fn export_and_send(
        &mut self,
        store: &dyn ReportStore,
        renderer: &dyn DocumentRenderer,
    ) -> EditorResult<ExportedDocument> {
        self.report.status.transition_to(ReportStatus::Sent)?;

        let mut snapshot = self.report.clone();
        snapshot.status = ReportStatus::Sent;
        let document = ReportDocument::render(&snapshot);
        let format = renderer.format();
        let bytes = renderer.render(&document)?;
        let exported = ExportedDocument {
            format,
            file_name: document.file_name(format),
            fingerprint: document.fingerprint().map_err(ExportError::from)?,
            bytes,
        };

        self.save(store, Some(ReportStatus::Sent))?;
        info!(
            report_id = self.report.id.as_str(),
            file_name = exported.file_name.as_str(),
            "Report exported and sent"
        );
        Ok(exported)
    }
}
