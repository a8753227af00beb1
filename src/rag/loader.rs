//! Source document loading.

use crate::types::{AppError, Result};
use std::path::Path;
use tracing::info;

/// Read a document's full text.
///
/// PDFs (by extension, case-insensitive) go through text extraction; any
/// other file is read as UTF-8. A missing file is [`AppError::NotFound`].
pub async fn load_document(path: &Path) -> Result<String> {
    if !tokio::fs::try_exists(path).await? {
        return Err(AppError::NotFound(format!(
            "Source document not found: {}",
            path.display()
        )));
    }

    let bytes = tokio::fs::read(path).await?;
    let text = if is_pdf(path) {
        extract_pdf_text(path, &bytes)?
    } else {
        String::from_utf8(bytes).map_err(|e| {
            AppError::Document(format!("{} is not valid UTF-8: {}", path.display(), e))
        })?
    };

    info!(path = %path.display(), chars = text.chars().count(), "Loaded source document");
    Ok(text)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn extract_pdf_text(path: &Path, bytes: &[u8]) -> Result<String> {
    let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
        AppError::Document(format!(
            "Failed to extract text from PDF {}: {}",
            path.display(),
            e
        ))
    })?;

    if text.trim().is_empty() {
        return Err(AppError::Document(format!(
            "PDF {} contains no extractable text",
            path.display()
        )));
    }

    Ok(text)
}
