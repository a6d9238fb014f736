//! Pipeline stages for PDF-to-notes conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch the PDF backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ elaborate ──▶ cleanup ──▶ typeset
//! (path)    (page text)  (LLM markup)  (scrub)     (parse+layout+draw)
//! ```
//!
//! 1. [`extract`]   — validate the input path and pull per-page text; runs in
//!    `spawn_blocking` because PDF parsing is synchronous CPU-bound work
//! 2. [`elaborate`] — drive the LLM call with retry/backoff; the only stage
//!    with network I/O; falls back to the raw text on failure
//! 3. [`cleanup`]   — deterministic text scrubbing of model quirks (fences,
//!    CRLF, invisible Unicode) before the parser sees the markup
//! 4. [`typeset`]   — parse the markup, lay the nodes out against real font
//!    metrics, and draw the styled pages into the output document

pub mod cleanup;
pub mod elaborate;
pub mod extract;
pub mod typeset;
