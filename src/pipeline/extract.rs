//! Source-text extraction: validate the input path and pull per-page text.
//!
//! ## Why spawn_blocking?
//!
//! PDF parsing is synchronous, CPU-bound work. `tokio::task::spawn_blocking`
//! moves it onto the dedicated blocking thread pool so the async worker
//! threads never stall on a large document while elaboration calls are in
//! flight for the caller's other work.
//!
//! ## Extraction contract
//!
//! One plain-text string per selected source page, in document order. A page
//! with no text yields an empty string and is kept in place — unit numbering
//! must line up with source page numbering. Only when *every* selected page
//! is empty does the run abort with
//! [`Pdf2NotesError::NoExtractableText`]; a scanned PDF elaborated from
//! nothing would produce pure hallucination.

use crate::error::Pdf2NotesError;
use crate::output::SourceMetadata;
use oxidize_pdf::parser::{PdfDocument, PdfReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Resolve and validate a local input path.
///
/// Checks existence, read permission, and the `%PDF` magic bytes so callers
/// get a meaningful error rather than a parser failure deep in the run.
pub fn resolve_input(path_str: &str) -> Result<PathBuf, Pdf2NotesError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(Pdf2NotesError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            use std::io::Read;
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(Pdf2NotesError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2NotesError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Pdf2NotesError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

/// Extract the text of the selected pages, one string per page.
///
/// `page_indices` are 0-indexed and assumed sorted (see
/// [`crate::config::PageSelection::to_indices`]).
pub async fn extract_units(
    pdf_path: &Path,
    page_indices: &[usize],
) -> Result<Vec<String>, Pdf2NotesError> {
    let path = pdf_path.to_path_buf();
    let indices = page_indices.to_vec();

    tokio::task::spawn_blocking(move || extract_units_blocking(&path, &indices))
        .await
        .map_err(|e| Pdf2NotesError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Blocking implementation of page-text extraction.
fn extract_units_blocking(
    pdf_path: &Path,
    page_indices: &[usize],
) -> Result<Vec<String>, Pdf2NotesError> {
    let reader = PdfReader::open(pdf_path).map_err(|e| Pdf2NotesError::CorruptPdf {
        path: pdf_path.to_path_buf(),
        detail: e.to_string(),
    })?;
    let document = PdfDocument::new(reader);

    let extracted = document
        .extract_text()
        .map_err(|e| Pdf2NotesError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: e.to_string(),
        })?;
    let total = extracted.len();
    info!("PDF loaded: {} pages", total);

    let mut units = Vec::with_capacity(page_indices.len());
    for &idx in page_indices {
        match extracted.get(idx) {
            Some(page_text) => {
                let text = page_text.text.trim().to_string();
                debug!("Extracted page {} → {} bytes", idx + 1, text.len());
                units.push(text);
            }
            None => {
                warn!("Skipping page {} (out of range, total={})", idx + 1, total);
            }
        }
    }

    if units.iter().all(|u| u.is_empty()) {
        return Err(Pdf2NotesError::NoExtractableText {
            path: pdf_path.to_path_buf(),
        });
    }

    Ok(units)
}

/// Extract document metadata without reading page content.
///
/// Does not require an LLM provider or API key.
pub async fn extract_metadata(pdf_path: &Path) -> Result<SourceMetadata, Pdf2NotesError> {
    let path = pdf_path.to_path_buf();

    tokio::task::spawn_blocking(move || extract_metadata_blocking(&path))
        .await
        .map_err(|e| Pdf2NotesError::Internal(format!("Metadata task panicked: {}", e)))?
}

/// Blocking implementation of metadata extraction.
fn extract_metadata_blocking(pdf_path: &Path) -> Result<SourceMetadata, Pdf2NotesError> {
    let reader = PdfReader::open(pdf_path).map_err(|e| Pdf2NotesError::CorruptPdf {
        path: pdf_path.to_path_buf(),
        detail: e.to_string(),
    })?;
    let document = PdfDocument::new(reader);

    let page_count = document
        .page_count()
        .map_err(|e| Pdf2NotesError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: e.to_string(),
        })? as usize;
    let pdf_version = document
        .version()
        .map(|v| v.to_string())
        .unwrap_or_default();

    Ok(SourceMetadata {
        page_count,
        pdf_version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let err = resolve_input("/definitely/not/here.pdf").unwrap_err();
        assert!(matches!(err, Pdf2NotesError::FileNotFound { .. }));
    }

    #[test]
    fn non_pdf_content_is_rejected_by_magic_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"hello world").unwrap();

        let err = resolve_input(path.to_str().unwrap()).unwrap_err();
        match err {
            Pdf2NotesError::NotAPdf { magic, .. } => assert_eq!(&magic, b"hell"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[test]
    fn pdf_magic_bytes_pass_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("real.pdf");
        std::fs::write(&path, b"%PDF-1.7\n...").unwrap();

        let resolved = resolve_input(path.to_str().unwrap()).unwrap();
        assert_eq!(resolved, path);
    }
}
