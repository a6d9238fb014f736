//! # pdf2notes
//!
//! Restructure PDF documents into styled, elaborated study notes using LLMs.
//!
//! ## Why this crate?
//!
//! Lecture slides and dense reference PDFs are hard to revise from: the text
//! is all there, but the structure a learner needs — titles, key ideas,
//! worked examples — is not. This crate extracts each page's raw text, asks a
//! text-generation model to elaborate it into a small markup grammar, parses
//! that markup into typed content nodes, and flows the nodes onto landscape
//! pages with real font metrics and automatic page breaks.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Extract   per-page plain text (oxidize-pdf parser, spawn_blocking)
//!  ├─ 2. Elaborate sequential LLM calls → markup outline (## / ### / * / <example>)
//!  ├─ 3. Cleanup   deterministic scrub of model quirks (fences, CRLF, BOM)
//!  ├─ 4. Parse     markup → typed content nodes (total, never fails)
//!  ├─ 5. Layout    measured heights + vertical cursor → placement commands
//!  └─ 6. Typeset   styled landscape pages written to the output PDF
//! ```
//!
//! A unit whose elaboration call fails or returns nothing is rendered from
//! its original raw text — the run never loses a page to a flaky API.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2notes::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / GEMINI_API_KEY
//!     let config = ConversionConfig::default();
//!     let output = convert("slides.pdf", "slides_notes.pdf", &config).await?;
//!     eprintln!(
//!         "{} units elaborated, {} fell back, {} pages written",
//!         output.stats.elaborated_units,
//!         output.stats.fallback_units,
//!         output.stats.physical_pages
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2notes` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdf2notes = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod layout;
pub mod markup;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod style;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, PageSelection};
pub use convert::{convert, convert_from_bytes, convert_sync, inspect};
pub use error::{Pdf2NotesError, UnitError};
pub use layout::{Command, Extent, PageGeometry, TextMeasurer};
pub use markup::{parse, ContentNode, NodeKind};
pub use output::{ConversionOutput, ConversionStats, SourceMetadata, UnitResult};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use style::StyleProfile;
