//! Error types for the pdf2notes library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Pdf2NotesError`] — **Fatal**: the conversion cannot proceed at all
//!   (bad input file, provider not configured, the output document cannot be
//!   written). Returned as `Err(Pdf2NotesError)` from the top-level
//!   `convert*` functions.
//!
//! * [`UnitError`] — **Non-fatal**: the elaboration call for a single unit
//!   (one source page) failed or came back empty. The pipeline substitutes
//!   the unit's original raw text and keeps going; the error is stored inside
//!   [`crate::output::UnitResult`] so callers can see which units were
//!   rendered from unelaborated text.
//!
//! The core itself (parser, style resolution, layout) is total and has no
//! error path: an unrecognised markup line gets a default classification and
//! an oversized node is placed with a warning rather than rejected.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2notes library.
///
/// Unit-level elaboration failures use [`UnitError`] and are stored in
/// [`crate::output::UnitResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Pdf2NotesError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF structure is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// No selected page produced any text.
    #[error("No extractable text in '{path}'\nScanned or image-only PDFs are not supported.")]
    NoExtractableText { path: PathBuf },

    /// Selected page numbers exceed the actual page count.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// A draw call on the output document failed.
    #[error("Failed to draw on the output document: {detail}")]
    RenderFailed { detail: String },

    /// The assembled PDF could not be serialised to disk.
    #[error("Failed to write output PDF '{path}': {detail}")]
    PdfWriteFailed { path: PathBuf, detail: String },

    /// A filesystem operation on the output path failed.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single elaboration unit.
///
/// Stored alongside [`crate::output::UnitResult`] when a unit falls back to
/// its original raw text. The overall conversion always continues: a unit
/// rendered from raw text still produces valid output pages.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum UnitError {
    /// The elaboration call failed after all retries.
    #[error("Unit {unit}: elaboration failed after {retries} retries: {detail}")]
    ElaborationFailed {
        unit: usize,
        retries: u8,
        detail: String,
    },

    /// The elaboration call succeeded but returned no content.
    #[error("Unit {unit}: elaboration returned an empty response")]
    EmptyElaboration { unit: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_out_of_range_display() {
        let e = Pdf2NotesError::PageOutOfRange { page: 9, total: 4 };
        let msg = e.to_string();
        assert!(msg.contains("Page 9"), "got: {msg}");
        assert!(msg.contains("4 pages"), "got: {msg}");
    }

    #[test]
    fn provider_not_configured_display() {
        let e = Pdf2NotesError::ProviderNotConfigured {
            provider: "openai".into(),
            hint: "set OPENAI_API_KEY".into(),
        };
        assert!(e.to_string().contains("openai"));
        assert!(e.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn elaboration_failed_display() {
        let e = UnitError::ElaborationFailed {
            unit: 3,
            retries: 3,
            detail: "rate limited".into(),
        };
        assert!(e.to_string().contains("Unit 3"));
        assert!(e.to_string().contains("rate limited"));
    }

    #[test]
    fn empty_elaboration_roundtrips_through_serde() {
        let e = UnitError::EmptyElaboration { unit: 2 };
        let json = serde_json::to_string(&e).unwrap();
        let back: UnitError = serde_json::from_str(&json).unwrap();
        assert!(back.to_string().contains("Unit 2"));
    }
}
