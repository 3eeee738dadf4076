//! CV text extraction from PDF documents

use crate::error::DocumentError;
use crate::types::CvText;
use lopdf::Document;
use std::path::Path;
use tracing::{debug, info};

/// Read every page of a PDF and join the page texts with `\n`
///
/// Pages are read in document order. Trailing line breaks of each page are
/// dropped so pages `["A", "B"]` yield `"A\nB"`.
pub fn read_cv_text(path: &Path) -> Result<CvText, DocumentError> {
    ensure_exists(path)?;

    let doc = Document::load(path).map_err(|e| DocumentError::Format {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let pages = doc.get_pages();
    let mut texts = Vec::with_capacity(pages.len());
    for &page_number in pages.keys() {
        let text = doc
            .extract_text(&[page_number])
            .map_err(|e| DocumentError::Format {
                path: path.to_path_buf(),
                message: format!("page {}: {}", page_number, e),
            })?;
        debug!(page = page_number, chars = text.len(), "Extracted page text");
        texts.push(text.trim_end_matches(&['\r', '\n'][..]).to_string());
    }

    info!(path = %path.display(), pages = texts.len(), "Extracted CV text");
    Ok(CvText {
        page_count: texts.len(),
        text: texts.join("\n"),
    })
}

/// Fail with [`DocumentError::NotFound`] unless `path` exists
pub fn ensure_exists(path: &Path) -> Result<(), DocumentError> {
    if path.exists() {
        Ok(())
    } else {
        Err(DocumentError::NotFound(path.to_path_buf()))
    }
}
