//! Report export: document model, renderers and batch export.

mod document;
mod registry;
mod renderers;

pub use document::*;
pub use registry::*;
pub use renderers::*;

use thiserror::Error;

/// Export errors.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Database error: {0}")]
    Database(#[from] crate::db::DbError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Report not found: {0}")]
    NotFound(String),

    #[error("Render error: {0}")]
    Render(String),
}

pub type ExportResult<T> = Result<T, ExportError>;
