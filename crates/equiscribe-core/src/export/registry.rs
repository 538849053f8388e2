//! Batch export over the report store.

use serde::{Deserialize, Serialize};

use super::renderers::{CsvRenderer, CSV_HEADER};
use super::{ExportError, ExportResult, ReportDocument};
use crate::db::Database;
use crate::models::ReportStatus;

/// Export of several reports at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReportExport {
    /// Export timestamp
    pub exported_at: String,
    pub documents: Vec<ReportDocument>,
    /// Total region row count
    pub total_rows: usize,
}

impl BatchReportExport {
    fn from_documents(documents: Vec<ReportDocument>) -> Self {
        let total_rows = documents.iter().map(|doc| doc.rows.len()).sum();
        Self {
            exported_at: chrono::Utc::now().to_rfc3339(),
            documents,
            total_rows,
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from(CSV_HEADER);
        for document in &self.documents {
            CsvRenderer::write_rows(&mut csv, document);
        }
        csv
    }
}

/// Builds documents from stored reports.
pub struct ReportExporter<'a> {
    db: &'a Database,
}

impl<'a> ReportExporter<'a> {
    /// Create a new report exporter.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Document for one stored report.
    pub fn export_by_id(&self, id: &str) -> ExportResult<ReportDocument> {
        let report = self
            .db
            .get_report(id)?
            .ok_or_else(|| ExportError::NotFound(id.to_string()))?;
        Ok(ReportDocument::render(&report))
    }

    /// Documents for every stored report, newest first.
    pub fn export_all(&self) -> ExportResult<BatchReportExport> {
        let documents = self
            .db
            .list_reports()?
            .iter()
            .map(ReportDocument::render)
            .collect();
        Ok(BatchReportExport::from_documents(documents))
    }

    /// Documents for reports with the given status.
    pub fn export_by_status(&self, status: ReportStatus) -> ExportResult<BatchReportExport> {
        let documents = self
            .db
            .list_reports_by_status(status)?
            .iter()
            .map(ReportDocument::render)
            .collect();
        Ok(BatchReportExport::from_documents(documents))
    }
}
