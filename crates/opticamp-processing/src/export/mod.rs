//! Exports of the canonical table: CSV and rendered summary documents.

mod html;
mod renderer;

pub use html::{DOCUMENT_COLUMNS, DOCUMENT_TITLE, build_document_html};
pub use renderer::{DocumentRenderer, RenderError, WkhtmltopdfRenderer};

use crate::error::{AnalysisError, Result, ResultExt};
use crate::table::CanonicalTable;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tracing::info;

/// Write the canonical table to a comma-separated file with a header row.
pub fn write_canonical_csv(table: &CanonicalTable, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut file =
        File::create(path).map_err(|e| AnalysisError::Io(e).with_context(path.display().to_string()))?;
    let mut frame = table.frame().clone();

    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(&mut frame)
        .context(path.display().to_string())?;

    info!("Canonical table saved: {}", path.display());
    Ok(())
}

/// Build the summary document of `table` and render it.
pub fn render_document(
    table: &CanonicalTable,
    feedback: &str,
    logo: Option<&Path>,
    renderer: &dyn DocumentRenderer,
) -> std::result::Result<Vec<u8>, DocumentError> {
    let html = build_document_html(table, feedback, logo)?;
    Ok(renderer.render(&html)?)
}

/// Failure to produce a summary document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error(transparent)]
    Build(#[from] AnalysisError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
