//! EquiScribe Core Library
//!
//! Local-first equine radiographic reporting: a veterinarian dictates
//! findings, an analyzer turns them into per-region grades, and the report
//! is reviewed, validated and sent.
//!
//! # Architecture
//!
//! ```text
//! Dictation → TranscriptBuffer → TextAnalyzer (host / equiscribe-llm)
//!                                       │
//!                              [RegionLedger reconcile]
//!                               locked entries skipped
//!                                       │
//!                               Vet edits (locks region)
//!                                       │
//!                        ┌──────────────▼──────────────┐
//!                        │  save: draft → validated    │
//!                        │  export + send → sent       │
//!                        └──────────────┬──────────────┘
//!                                       │
//!                         ┌─────────────┴─────────────┐
//!                         ▼                           ▼
//!                      SQLite                 ReportDocument
//!                  (reports, clients)      (JSON / CSV / host PDF)
//! ```
//!
//! # Core Principle
//!
//! **A human edit is never overwritten by the analyzer.** Once a region's
//! comment or grade is touched by hand, later analyses skip it.
//!
//! # Modules
//!
//! - [`models`]: Domain types (Grade, RegionEntry, Report, Client)
//! - [`ledger`]: Per-report region ledger, scoring and reconciliation
//! - [`editor`]: Editing session, dictation buffer and status lifecycle
//! - [`db`]: SQLite persistence for reports and clients
//! - [`export`]: Printable document model and built-in renderers
//! - [`config`]: TOML configuration
//! - [`logging`]: tracing subscriber setup

pub mod config;
pub mod db;
pub mod editor;
pub mod export;
pub mod ledger;
pub mod logging;
pub mod models;

// Re-export commonly used types
pub use config::{AnalyzerSettings, CoreConfig, ReportDefaults};
pub use db::{Database, ReportStats};
pub use editor::{ReportEditor, ReportStore, TranscriptBuffer};
pub use export::{DocumentRenderer, ExportFormat, ReportDocument};
pub use ledger::{RegionLedger, RegionPatch};
pub use models::{
    AnalysisResult, AnalysisScope, Client, Grade, RegionEntry, RegionSuggestion, Report,
    ReportStatus, TextAnalyzer,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use editor::EditorError;
use export::{CsvRenderer, JsonRenderer};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum EquiScribeError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Analysis error: {0}")]
    AnalysisError(String),

    #[error("Stale analysis: {0}")]
    StaleAnalysis(String),

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Speech capture error: {0}")]
    CaptureError(String),
}

impl From<editor::CaptureError> for EquiScribeError {
    fn from(e: editor::CaptureError) -> Self {
        EquiScribeError::CaptureError(e.to_string())
    }
}

impl From<db::DbError> for EquiScribeError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => EquiScribeError::NotFound(what),
            other => EquiScribeError::DatabaseError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for EquiScribeError {
    fn from(e: serde_json::Error) -> Self {
        EquiScribeError::SerializationError(e.to_string())
    }
}

impl From<ledger::LedgerError> for EquiScribeError {
    fn from(e: ledger::LedgerError) -> Self {
        match e {
            ledger::LedgerError::NotFound(label) => EquiScribeError::NotFound(label),
            other => EquiScribeError::InvalidInput(other.to_string()),
        }
    }
}

impl From<export::ExportError> for EquiScribeError {
    fn from(e: export::ExportError) -> Self {
        EquiScribeError::ExportError(e.to_string())
    }
}

impl From<EditorError> for EquiScribeError {
    fn from(e: EditorError) -> Self {
        match e {
            EditorError::Ledger(inner) => inner.into(),
            EditorError::AnalysisFailed(inner) => EquiScribeError::AnalysisError(inner.to_string()),
            stale @ EditorError::StaleAnalysis { .. } => {
                EquiScribeError::StaleAnalysis(stale.to_string())
            }
            EditorError::PersistenceFailed(inner) => inner.into(),
            EditorError::Export(inner) => inner.into(),
            EditorError::InvalidTransition(inner) => {
                EquiScribeError::InvalidTransition(inner.to_string())
            }
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for EquiScribeError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        EquiScribeError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<EquiScribeCore>, EquiScribeError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(EquiScribeCore::with_database(db, ReportDefaults::default())))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<EquiScribeCore>, EquiScribeError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(EquiScribeCore::with_database(db, ReportDefaults::default())))
}

/// Open the database and report defaults named by a TOML config file.
#[uniffi::export]
pub fn open_with_config(config_path: String) -> Result<Arc<EquiScribeCore>, EquiScribeError> {
    let config = CoreConfig::load(&config_path)
        .map_err(|e| EquiScribeError::InvalidInput(format!("{:#}", e)))?;
    let db = Database::open(&config.database_path)?;
    Ok(Arc::new(EquiScribeCore::with_database(db, config.report)))
}

/// Install the tracing subscriber. Returns false if one was already set.
#[uniffi::export]
pub fn init_logging(filter: String) -> bool {
    logging::init_tracing(&filter)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct EquiScribeCore {
    db: Arc<Mutex<Database>>,
    defaults: ReportDefaults,
}

impl EquiScribeCore {
    fn with_database(db: Database, defaults: ReportDefaults) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            defaults,
        }
    }

    fn editor(&self, editor: ReportEditor) -> Arc<FfiReportEditor> {
        Arc::new(FfiReportEditor {
            editor: Mutex::new(editor),
            db: Arc::clone(&self.db),
        })
    }
}

#[uniffi::export]
impl EquiScribeCore {
    // =========================================================================
    // Report Operations
    // =========================================================================

    /// All reports, newest first.
    pub fn list_reports(&self) -> Result<Vec<FfiReport>, EquiScribeError> {
        let db = self.db.lock()?;
        let reports = db.list_reports()?;
        Ok(reports.into_iter().map(|r| r.into()).collect())
    }

    /// Reports whose horse or veterinarian name contains the query.
    pub fn search_reports(&self, query: String) -> Result<Vec<FfiReport>, EquiScribeError> {
        let db = self.db.lock()?;
        let reports = db.search_reports(&query)?;
        Ok(reports.into_iter().map(|r| r.into()).collect())
    }

    /// Reports with the given status ("draft", "validated", "sent").
    pub fn list_reports_by_status(&self, status: String) -> Result<Vec<FfiReport>, EquiScribeError> {
        let status: ReportStatus = status.parse().map_err(EquiScribeError::InvalidInput)?;
        let db = self.db.lock()?;
        let reports = db.list_reports_by_status(status)?;
        Ok(reports.into_iter().map(|r| r.into()).collect())
    }

    /// Get a report by ID.
    pub fn get_report(&self, id: String) -> Result<Option<FfiReport>, EquiScribeError> {
        let db = self.db.lock()?;
        let report = db.get_report(&id)?;
        Ok(report.map(|r| r.into()))
    }

    pub fn delete_report(&self, id: String) -> Result<bool, EquiScribeError> {
        let db = self.db.lock()?;
        Ok(db.delete_report(&id)?)
    }

    /// Mark one report as sent.
    pub fn mark_report_sent(&self, id: String) -> Result<bool, EquiScribeError> {
        let db = self.db.lock()?;
        Ok(db.mark_report_sent(&id)?)
    }

    /// Mark several reports as sent in one transaction.
    pub fn mark_reports_sent(&self, ids: Vec<String>) -> Result<u32, EquiScribeError> {
        let mut db = self.db.lock()?;
        Ok(db.mark_reports_sent(&ids)? as u32)
    }

    pub fn get_stats(&self) -> Result<FfiStats, EquiScribeError> {
        let db = self.db.lock()?;
        Ok(db.report_stats()?.into())
    }

    // =========================================================================
    // Editor Operations
    // =========================================================================

    /// Start editing a blank report with the configured defaults.
    pub fn new_report(&self) -> Arc<FfiReportEditor> {
        self.editor(ReportEditor::new(&self.defaults))
    }

    /// Start a report from a whole-consultation analysis.
    pub fn new_report_from_session(
        &self,
        horse_name: Option<String>,
        suggestions: Vec<FfiSuggestion>,
    ) -> Arc<FfiReportEditor> {
        let result = AnalysisResult {
            horse_name,
            regions: suggestions.into_iter().map(|s| s.into()).collect(),
        };
        self.editor(ReportEditor::from_session(&self.defaults, &result))
    }

    /// Open a stored report for editing.
    pub fn open_editor(&self, id: String) -> Result<Arc<FfiReportEditor>, EquiScribeError> {
        let report = self
            .db
            .lock()?
            .get_report(&id)?
            .ok_or_else(|| EquiScribeError::NotFound(format!("report {}", id)))?;
        Ok(self.editor(ReportEditor::open(report)))
    }

    // =========================================================================
    // Client Operations
    // =========================================================================

    /// Add or update a client.
    pub fn upsert_client(&self, client: FfiClient) -> Result<FfiClient, EquiScribeError> {
        let db = self.db.lock()?;
        let mut client: Client = client.into();
        if client.id.is_empty() {
            client.id = uuid::Uuid::new_v4().to_string();
        }
        db.save_client(&client)?;
        let stored = db
            .get_client(&client.id)?
            .ok_or_else(|| EquiScribeError::NotFound(format!("client {}", client.id)))?;
        Ok(stored.into())
    }

    pub fn list_clients(&self) -> Result<Vec<FfiClient>, EquiScribeError> {
        let db = self.db.lock()?;
        let clients = db.list_clients()?;
        Ok(clients.into_iter().map(|c| c.into()).collect())
    }

    /// Delete a client; their reports stay, unlinked.
    pub fn delete_client(&self, id: String) -> Result<bool, EquiScribeError> {
        let db = self.db.lock()?;
        Ok(db.delete_client(&id)?)
    }

    /// Horse names from a client's reports.
    pub fn client_horses(&self, client_id: String) -> Result<Vec<String>, EquiScribeError> {
        let db = self.db.lock()?;
        Ok(db.client_horses(&client_id)?)
    }

    pub fn list_reports_for_client(&self, client_id: String) -> Result<Vec<FfiReport>, EquiScribeError> {
        let db = self.db.lock()?;
        let reports = db.list_reports_for_client(&client_id)?;
        Ok(reports.into_iter().map(|r| r.into()).collect())
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// Export every report as JSON.
    pub fn export_reports_json(&self) -> Result<String, EquiScribeError> {
        let db = self.db.lock()?;
        let exporter = export::ReportExporter::new(&db);
        let batch = exporter.export_all()?;
        Ok(batch.to_json()?)
    }

    /// Export every report as CSV.
    pub fn export_reports_csv(&self) -> Result<String, EquiScribeError> {
        let db = self.db.lock()?;
        let exporter = export::ReportExporter::new(&db);
        let batch = exporter.export_all()?;
        Ok(batch.to_csv())
    }
}

// =========================================================================
// Editor Object
// =========================================================================

/// One report being edited, shared with the host UI.
#[derive(uniffi::Object)]
pub struct FfiReportEditor {
    editor: Mutex<ReportEditor>,
    db: Arc<Mutex<Database>>,
}

#[uniffi::export]
impl FfiReportEditor {
    pub fn report(&self) -> Result<FfiReport, EquiScribeError> {
        let editor = self.editor.lock()?;
        Ok(editor.report().clone().into())
    }

    pub fn total_score(&self) -> Result<u32, EquiScribeError> {
        Ok(self.editor.lock()?.total_score())
    }

    pub fn set_header(
        &self,
        horse_name: String,
        clinic: String,
        veterinary: String,
        exam_date: String,
    ) -> Result<(), EquiScribeError> {
        let mut editor = self.editor.lock()?;
        editor.set_horse_name(horse_name);
        editor.set_clinic(clinic);
        editor.set_veterinary(veterinary);
        editor.set_exam_date(exam_date);
        Ok(())
    }

    pub fn set_client(&self, client_id: Option<String>) -> Result<(), EquiScribeError> {
        self.editor.lock()?.set_client(client_id);
        Ok(())
    }

    /// Human edit of one region. Editing comment or grade locks it.
    pub fn update_region(
        &self,
        label: String,
        comment: Option<String>,
        grade: Option<u8>,
        is_included: Option<bool>,
    ) -> Result<FfiRegion, EquiScribeError> {
        let grade = grade
            .map(|g| {
                Grade::from_value(i64::from(g))
                    .ok_or_else(|| EquiScribeError::InvalidInput(format!("grade {} out of range", g)))
            })
            .transpose()?;
        let patch = RegionPatch {
            comment,
            grade,
            is_included,
        };
        let mut editor = self.editor.lock()?;
        let entry = editor.update_region(&label, patch)?;
        Ok(entry.clone().into())
    }

    /// Include or exclude a region without locking it.
    pub fn set_included(&self, label: String, is_included: bool) -> Result<FfiRegion, EquiScribeError> {
        let mut editor = self.editor.lock()?;
        let entry = editor.set_included(&label, is_included)?;
        Ok(entry.clone().into())
    }

    // =========================================================================
    // Dictation
    // =========================================================================

    /// The host started its recognizer. A targeted dictation starts empty.
    pub fn start_recording(&self) -> Result<(), EquiScribeError> {
        let mut editor = self.editor.lock()?;
        editor.transcript_mut().start_recording(&mut HostCapture)?;
        Ok(())
    }

    /// The host stopped its recognizer.
    pub fn stop_recording(&self) -> Result<(), EquiScribeError> {
        self.editor.lock()?.transcript_mut().stop_recording(&mut HostCapture);
        Ok(())
    }

    /// The host's recognizer failed; recording stops, the text is kept.
    pub fn capture_error(&self, message: String, permission_denied: bool) -> Result<(), EquiScribeError> {
        let error = if permission_denied {
            editor::CaptureError::PermissionDenied
        } else {
            editor::CaptureError::Device(message)
        };
        self.editor.lock()?.transcript_mut().on_error(&error);
        Ok(())
    }

    pub fn is_recording(&self) -> Result<bool, EquiScribeError> {
        Ok(self.editor.lock()?.transcript().is_recording())
    }

    /// Feed a recognizer result into the dictation buffer.
    pub fn push_transcript(&self, text: String, is_final: bool) -> Result<String, EquiScribeError> {
        let mut editor = self.editor.lock()?;
        let event = if is_final {
            editor::CaptureEvent::final_text(text)
        } else {
            editor::CaptureEvent::interim(text)
        };
        editor.transcript_mut().push(event);
        Ok(editor.transcript().display_text())
    }

    /// Replace the dictation by hand. Refused while recording.
    pub fn edit_transcript(&self, text: String) -> Result<bool, EquiScribeError> {
        Ok(self.editor.lock()?.transcript_mut().edit(text))
    }

    pub fn clear_transcript(&self) -> Result<(), EquiScribeError> {
        self.editor.lock()?.transcript_mut().clear();
        Ok(())
    }

    // =========================================================================
    // Analysis
    // =========================================================================

    /// Snapshot the dictation for the host's analyzer.
    pub fn begin_analysis(&self) -> Result<FfiAnalysisTicket, EquiScribeError> {
        let ticket = self.editor.lock()?.begin_analysis()?;
        Ok(FfiAnalysisTicket {
            revision: ticket.revision,
            transcript: ticket.transcript,
        })
    }

    /// Merge the analyzer's answer for a ticket. Returns the applied labels.
    pub fn apply_suggestions(
        &self,
        ticket: FfiAnalysisTicket,
        suggestions: Vec<FfiSuggestion>,
    ) -> Result<Vec<String>, EquiScribeError> {
        let ticket = editor::AnalysisTicket {
            revision: ticket.revision,
            scope: AnalysisScope::Targeted,
            transcript: ticket.transcript,
        };
        let result = AnalysisResult {
            horse_name: None,
            regions: suggestions.into_iter().map(|s| s.into()).collect(),
        };
        let outcome = self.editor.lock()?.apply_analysis(&ticket, &result)?;
        Ok(outcome.applied)
    }

    pub fn abandon_analysis(&self) -> Result<(), EquiScribeError> {
        self.editor.lock()?.abandon_analysis();
        Ok(())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    pub fn save_draft(&self) -> Result<FfiReport, EquiScribeError> {
        let db = self.db.lock()?;
        let mut editor = self.editor.lock()?;
        Ok(editor.save_draft(&*db)?.clone().into())
    }

    pub fn validate(&self) -> Result<FfiReport, EquiScribeError> {
        let db = self.db.lock()?;
        let mut editor = self.editor.lock()?;
        Ok(editor.validate(&*db)?.clone().into())
    }

    /// Printable document as JSON, for renderers living on the host.
    pub fn document_json(&self) -> Result<String, EquiScribeError> {
        let editor = self.editor.lock()?;
        let document = ReportDocument::render(editor.report());
        Ok(serde_json::to_string(&document)?)
    }

    /// Mark as sent after the host rendered and shared the document.
    pub fn mark_sent(&self) -> Result<FfiReport, EquiScribeError> {
        let db = self.db.lock()?;
        let mut editor = self.editor.lock()?;
        Ok(editor.save(&*db, Some(ReportStatus::Sent))?.clone().into())
    }

    /// Render with a built-in renderer, then save as sent.
    pub fn export_and_send(&self, format: FfiExportFormat) -> Result<FfiExportedDocument, EquiScribeError> {
        let db = self.db.lock()?;
        let mut editor = self.editor.lock()?;
        let exported = match format {
            FfiExportFormat::Json => editor.export_and_send(&*db, &JsonRenderer)?,
            FfiExportFormat::Csv => editor.export_and_send(&*db, &CsvRenderer)?,
        };
        Ok(FfiExportedDocument {
            file_name: exported.file_name,
            mime_type: exported.format.mime_type().to_string(),
            fingerprint: exported.fingerprint,
            bytes: exported.bytes,
        })
    }
}

/// The microphone lives on the host side; it drives the buffer through
/// the recording calls above.
struct HostCapture;

impl editor::CaptureSource for HostCapture {
    fn start(&mut self) -> Result<(), editor::CaptureError> {
        Ok(())
    }

    fn stop(&mut self) {}
}

// =========================================================================
// FFI Types
// =========================================================================

/// Built-in export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiExportFormat {
    Json,
    Csv,
}

/// FFI-safe region entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRegion {
    pub id: String,
    pub label: String,
    pub comment: String,
    pub grade: u8,
    pub points: u32,
    pub is_included: bool,
    pub is_locked: bool,
}

impl From<RegionEntry> for FfiRegion {
    fn from(entry: RegionEntry) -> Self {
        Self {
            points: entry.grade.points(),
            grade: entry.grade.value(),
            id: entry.id,
            label: entry.label,
            comment: entry.comment,
            is_included: entry.is_included,
            is_locked: entry.is_locked,
        }
    }
}

/// FFI-safe report.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiReport {
    pub id: String,
    pub horse_name: String,
    pub clinic: String,
    pub veterinary: String,
    pub exam_date: String,
    pub client_id: Option<String>,
    pub regions: Vec<FfiRegion>,
    pub total_score: u32,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Report> for FfiReport {
    fn from(report: Report) -> Self {
        Self {
            total_score: report.total_score(),
            status: report.status.as_str().to_string(),
            regions: report.regions.iter().cloned().map(FfiRegion::from).collect(),
            id: report.id,
            horse_name: report.horse_name,
            clinic: report.clinic,
            veterinary: report.veterinary,
            exam_date: report.exam_date,
            client_id: report.client_id,
            created_at: report.created_at,
            updated_at: report.updated_at,
        }
    }
}

/// FFI-safe analyzer suggestion. Grades outside 0-4 are tolerated.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSuggestion {
    pub label: String,
    pub comment: Option<String>,
    pub grade: Option<i64>,
}

impl From<FfiSuggestion> for RegionSuggestion {
    fn from(s: FfiSuggestion) -> Self {
        RegionSuggestion {
            label: s.label,
            comment: s.comment,
            grade: s.grade,
        }
    }
}

/// FFI-safe analysis ticket.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAnalysisTicket {
    pub revision: u64,
    pub transcript: String,
}

/// FFI-safe exported document.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiExportedDocument {
    pub file_name: String,
    pub mime_type: String,
    pub fingerprint: String,
    pub bytes: Vec<u8>,
}

/// FFI-safe client.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiClient {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub created_at: String,
}

impl From<Client> for FfiClient {
    fn from(c: Client) -> Self {
        Self {
            id: c.id,
            name: c.name,
            email: c.email,
            phone: c.phone,
            address: c.address,
            created_at: c.created_at,
        }
    }
}

impl From<FfiClient> for Client {
    fn from(c: FfiClient) -> Self {
        let created_at = if c.created_at.is_empty() {
            chrono::Utc::now().to_rfc3339()
        } else {
            c.created_at
        };
        Client {
            id: c.id,
            name: c.name,
            email: c.email,
            phone: c.phone,
            address: c.address,
            created_at,
        }
    }
}

/// FFI-safe report counts.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiStats {
    pub total: u32,
    pub draft: u32,
    pub validated: u32,
    pub sent: u32,
}

impl From<ReportStats> for FfiStats {
    fn from(s: ReportStats) -> Self {
        Self {
            total: s.total,
            draft: s.draft,
            validated: s.validated,
            sent: s.sent,
        }
    }
}
