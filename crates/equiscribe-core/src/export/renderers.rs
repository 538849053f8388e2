//! Built-in renderers.
//!
//! PDF and Word layouts belong to the host application; it plugs them in
//! through [`DocumentRenderer`].

use super::{ExportFormat, ExportResult, ReportDocument};

/// Turns a report document into a downloadable artifact.
pub trait DocumentRenderer {
    fn format(&self) -> ExportFormat;

    fn render(&self, document: &ReportDocument) -> ExportResult<Vec<u8>>;
}

/// Pretty-printed JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl DocumentRenderer for JsonRenderer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Json
    }

    fn render(&self, document: &ReportDocument) -> ExportResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(document)?)
    }
}

/// One CSV line per included region.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRenderer;

pub(crate) const CSV_HEADER: &str =
    "report_id,horse_name,exam_date,veterinary,region,comment,grade,points,total_score\n";

impl CsvRenderer {
    pub(crate) fn write_rows(csv: &mut String, document: &ReportDocument) {
        for row in &document.rows {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{},{}\n",
                escape_csv(&document.report_id),
                escape_csv(&document.header.horse_name),
                escape_csv(&document.header.exam_date),
                escape_csv(&document.header.veterinary),
                escape_csv(&row.region),
                escape_csv(&row.comment),
                row.grade,
                row.points,
                document.total_score,
            ));
        }
    }
}

impl DocumentRenderer for CsvRenderer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
    }

    fn render(&self, document: &ReportDocument) -> ExportResult<Vec<u8>> {
        let mut csv = String::from(CSV_HEADER);
        Self::write_rows(&mut csv, document);
        Ok(csv.into_bytes())
    }
}

/// Escape a string for CSV output.
pub(crate) fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
