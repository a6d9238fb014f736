//! Configuration types for PDF-to-notes conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across calls, serialise them for logging, and
//! diff two runs to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A dozen-field constructor is unreadable and breaks on every new field.
//! The builder pattern lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::error::Pdf2NotesError;
use crate::layout::PageGeometry;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Configuration for a PDF-to-notes conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2notes::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .margin(54.0)
///     .model("gpt-4.1-nano")
///     .max_retries(2)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Output page width in points. Default: 792 (US letter, landscape).
    ///
    /// Landscape is the house orientation: elaborated notes are wide, bullet-
    /// heavy content and read better with long lines than tall columns.
    pub page_width: f64,

    /// Output page height in points. Default: 612 (US letter, landscape).
    pub page_height: f64,

    /// Page margin in points, applied on all four sides. Default: 45.
    pub margin: f64,

    /// Title stamped into the output document's metadata, if any.
    pub title: Option<String>,

    /// LLM model identifier, e.g. "gpt-4.1-nano", "claude-sonnet-4-20250514".
    /// If None, uses provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `provider`, uses `ProviderFactory::from_env()`.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for the elaboration call. Default: 0.4.
    ///
    /// Elaboration is a restructuring-plus-explaining task, not transcription:
    /// a little creative freedom produces better explanations and examples.
    /// Values near 0 give terse, repetitive notes; values above ~0.8 start
    /// drifting from the source material.
    pub temperature: f32,

    /// Maximum tokens the model may generate per unit. Default: 4096.
    ///
    /// A dense source page can elaborate into 2 000+ output tokens. Setting
    /// this too low truncates the markup mid-line, which the parser tolerates
    /// but the reader will notice.
    pub max_tokens: usize,

    /// Maximum retry attempts on a transient elaboration failure. Default: 3.
    ///
    /// Most 5xx and timeout errors are transient. After the retries are
    /// exhausted the unit falls back to its original raw text rather than
    /// failing the run — see [`crate::error::UnitError`].
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    ///
    /// Doubles after each attempt: 500 ms → 1 s → 2 s.
    pub retry_backoff_ms: u64,

    /// Custom system prompt. If None, uses
    /// [`crate::prompts::DEFAULT_SYSTEM_PROMPT`].
    pub system_prompt: Option<String>,

    /// Source page selection. Default: All pages.
    pub pages: PageSelection,

    /// Progress callback fired per unit. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        let geometry = PageGeometry::landscape_letter();
        Self {
            page_width: geometry.width,
            page_height: geometry.height,
            margin: geometry.margin,
            title: None,
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.4,
            max_tokens: 4096,
            max_retries: 3,
            retry_backoff_ms: 500,
            system_prompt: None,
            pages: PageSelection::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("page_width", &self.page_width)
            .field("page_height", &self.page_height)
            .field("margin", &self.margin)
            .field("title", &self.title)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("pages", &self.pages)
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The output page geometry this config describes.
    pub fn geometry(&self) -> PageGeometry {
        PageGeometry {
            width: self.page_width,
            height: self.page_height,
            margin: self.margin,
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn page_size(mut self, width: f64, height: f64) -> Self {
        self.config.page_width = width.max(72.0);
        self.config.page_height = height.max(72.0);
        self
    }

    pub fn margin(mut self, margin: f64) -> Self {
        self.config.margin = margin.max(0.0);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = Some(title.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2NotesError> {
        let c = &self.config;
        let usable_w = c.page_width - 2.0 * c.margin;
        let usable_h = c.page_height - 2.0 * c.margin;
        if usable_w <= 0.0 || usable_h <= 0.0 {
            return Err(Pdf2NotesError::InvalidConfig(format!(
                "Margin {} leaves no usable area on a {}x{} page",
                c.margin, c.page_width, c.page_height
            )));
        }
        if c.max_tokens == 0 {
            return Err(Pdf2NotesError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Specifies which pages of the source PDF to elaborate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum PageSelection {
    /// Convert all pages (default).
    #[default]
    All,
    /// Convert a single page (1-indexed).
    Single(usize),
    /// Convert a contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Convert specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_geometry_is_landscape_letter() {
        let config = ConversionConfig::default();
        assert_eq!(config.page_width, 792.0);
        assert_eq!(config.page_height, 612.0);
        assert_eq!(config.margin, 45.0);
    }

    #[test]
    fn builder_rejects_margin_swallowing_the_page() {
        let result = ConversionConfig::builder()
            .page_size(200.0, 200.0)
            .margin(150.0)
            .build();
        assert!(matches!(result, Err(Pdf2NotesError::InvalidConfig(_))));
    }

    #[test]
    fn builder_clamps_temperature() {
        let config = ConversionConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(config.temperature, 2.0);
    }

    #[test]
    fn page_selection_to_indices() {
        assert_eq!(PageSelection::All.to_indices(5), vec![0, 1, 2, 3, 4]);
        assert_eq!(PageSelection::Single(3).to_indices(5), vec![2]);
        assert_eq!(PageSelection::Single(6).to_indices(5), Vec::<usize>::new());
        assert_eq!(PageSelection::Range(2, 4).to_indices(5), vec![1, 2, 3]);
        assert_eq!(
            PageSelection::Set(vec![1, 3, 5]).to_indices(5),
            vec![0, 2, 4]
        );
        assert_eq!(
            PageSelection::Set(vec![3, 1, 3]).to_indices(5),
            vec![0, 2] // deduplicated and sorted
        );
    }
}
