//! Renderer-independent report document.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::models::Report;

/// Practitioner signature appended to every document (PNG, base64).
pub const SIGNATURE_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// Output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Print-style document
    Pdf,
    /// Editable word-processor document
    Docx,
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }
}

/// Document header block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentHeader {
    pub clinic: String,
    /// Upper-cased for display
    pub horse_name: String,
    pub exam_date: String,
    pub veterinary: String,
}

/// One table row: an included region.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentRow {
    pub region: String,
    pub comment: String,
    pub grade: u8,
    pub points: u32,
    pub grade_description: String,
}

/// Signature block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignatureBlock {
    pub veterinary: String,
    pub image_png_base64: String,
}

/// Everything a renderer needs to lay out one report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportDocument {
    pub report_id: String,
    pub header: DocumentHeader,
    pub rows: Vec<DocumentRow>,
    pub total_score: u32,
    pub signature: SignatureBlock,
}

impl ReportDocument {
    /// Build the document for a report: included regions only, catalog order.
    pub fn render(report: &Report) -> Self {
        let rows = report
            .regions
            .included()
            .map(|entry| DocumentRow {
                region: entry.label.clone(),
                comment: entry.comment.clone(),
                grade: entry.grade.value(),
                points: entry.grade.points(),
                grade_description: entry.grade.description().to_string(),
            })
            .collect();

        Self {
            report_id: report.id.clone(),
            header: DocumentHeader {
                clinic: report.clinic.clone(),
                horse_name: report.horse_name.to_uppercase(),
                exam_date: report.exam_date.clone(),
                veterinary: report.veterinary.clone(),
            },
            rows,
            total_score: report.total_score(),
            signature: SignatureBlock {
                veterinary: report.veterinary.clone(),
                image_png_base64: SIGNATURE_PNG_BASE64.to_string(),
            },
        }
    }

    /// Suggested download name, e.g. `Rapport_QUAPRICE_15-01-2025.pdf`.
    pub fn file_name(&self, format: ExportFormat) -> String {
        let sanitize = |s: &str| -> String {
            s.chars()
                .map(|c| match c {
                    '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
                    c if c.is_whitespace() => '_',
                    c => c,
                })
                .collect()
        };
        format!(
            "Rapport_{}_{}.{}",
            sanitize(&self.header.horse_name),
            sanitize(&self.header.exam_date),
            format.extension()
        )
    }

    /// SHA-256 of the document content, hex encoded.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(hex::encode(Sha256::digest(json.as_bytes())))
    }
}
