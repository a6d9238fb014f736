//! Output types: per-unit results, source metadata, and conversion statistics.

use serde::{Deserialize, Serialize};

use crate::error::UnitError;

/// The outcome of one conversion run.
///
/// Returned by [`crate::convert::convert`] after the output PDF has been
/// written. Even a run with failed elaboration units succeeds overall — check
/// [`ConversionStats::fallback_units`] and the per-unit `error` fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Per-unit elaboration results, in source page order.
    pub units: Vec<UnitResult>,
    /// Metadata of the source document.
    pub metadata: SourceMetadata,
    /// Aggregate statistics for the run.
    pub stats: ConversionStats,
}

/// The elaboration result for a single unit (one source page).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitResult {
    /// 1-indexed unit number (position among the selected source pages).
    pub unit_num: usize,
    /// The markup handed to the parser: the model's response, or the unit's
    /// original raw text when `fallback` is set.
    pub markup: String,
    /// True when elaboration failed or came back empty and the original text
    /// was substituted.
    pub fallback: bool,
    /// Prompt tokens consumed by the elaboration call.
    pub input_tokens: u32,
    /// Completion tokens produced by the elaboration call.
    pub output_tokens: u32,
    /// Wall-clock duration of the call, including retries.
    pub duration_ms: u64,
    /// Number of retries performed before this result.
    pub retries: u8,
    /// Why the fallback was taken, when it was.
    pub error: Option<UnitError>,
}

impl UnitResult {
    /// Build the fallback result: the unit renders from its raw text.
    ///
    /// This is the recovery path for a failed or empty elaboration call — the
    /// parser classifies unmarked lines as plain content, so the unit still
    /// produces output pages.
    pub fn fallback(unit_num: usize, raw_text: &str, error: UnitError) -> Self {
        Self {
            unit_num,
            markup: raw_text.to_string(),
            fallback: true,
            input_tokens: 0,
            output_tokens: 0,
            duration_ms: 0,
            retries: 0,
            error: Some(error),
        }
    }
}

/// Metadata of the source PDF, available without any LLM call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Total page count of the source document.
    pub page_count: usize,
    /// PDF version string, e.g. "1.7".
    pub pdf_version: String,
}

/// Aggregate statistics for a conversion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Total pages in the source document.
    pub total_pages: usize,
    /// Units that rendered from model output.
    pub elaborated_units: usize,
    /// Units that rendered from their raw-text fallback.
    pub fallback_units: usize,
    /// Physical pages committed to the output document.
    pub physical_pages: usize,
    /// Sum of prompt tokens across all units.
    pub total_input_tokens: u64,
    /// Sum of completion tokens across all units.
    pub total_output_tokens: u64,
    /// End-to-end wall-clock duration.
    pub total_duration_ms: u64,
    /// Time spent extracting text from the source PDF.
    pub extract_duration_ms: u64,
    /// Time spent in elaboration calls (sequential, includes retries).
    pub llm_duration_ms: u64,
    /// Time spent parsing, laying out, and writing the output PDF.
    pub typeset_duration_ms: u64,
}
