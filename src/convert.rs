//! Full-document conversion entry points.
//!
//! ## Shape of a run
//!
//! A conversion is strictly sequential: extract all selected pages, then
//! elaborate the units one at a time, then typeset everything into the
//! output document. One unit is finished before the next begins — there is
//! no concurrent elaboration and no layout state shared between units, so a
//! slow or failed call for one unit cannot disturb any other.

use crate::config::ConversionConfig;
use crate::error::Pdf2NotesError;
use crate::output::{ConversionOutput, ConversionStats, SourceMetadata, UnitResult};
use crate::pipeline::{elaborate, extract, typeset};
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Convert a PDF into a restructured, styled notes PDF.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input` — Local path to the source PDF
/// * `output_path` — Where to write the styled notes PDF (atomic write:
///   temp file + rename)
/// * `config` — Conversion configuration
///
/// # Returns
/// `Ok(ConversionOutput)` on success, even if some units fell back to their
/// raw text (check `output.stats.fallback_units`).
///
/// # Errors
/// Returns `Err(Pdf2NotesError)` only for fatal errors:
/// - File not found / permission denied / not a valid PDF
/// - No extractable text on any selected page
/// - No LLM provider configured
/// - The output document could not be drawn or written
pub async fn convert(
    input: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2NotesError> {
    let total_start = Instant::now();
    let input = input.as_ref();
    info!("Starting conversion: {}", input);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let pdf_path = extract::resolve_input(input)?;

    // ── Step 2: Get/create provider ──────────────────────────────────────
    let provider = resolve_provider(config)?;

    // ── Step 3: Extract metadata ─────────────────────────────────────────
    let metadata = extract::extract_metadata(&pdf_path).await?;
    let total_pages = metadata.page_count;
    info!("PDF has {} pages", total_pages);

    // ── Step 4: Compute page indices ─────────────────────────────────────
    let page_indices = config.pages.to_indices(total_pages);
    if page_indices.is_empty() {
        return Err(Pdf2NotesError::PageOutOfRange {
            page: 0,
            total: total_pages,
        });
    }
    let total_units = page_indices.len();
    debug!("Selected {} pages for elaboration", total_units);

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(total_units);
    }

    // ── Step 5: Extract page text ────────────────────────────────────────
    let extract_start = Instant::now();
    let raw_units = extract::extract_units(&pdf_path, &page_indices).await?;
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;
    info!(
        "Extracted {} units in {}ms",
        raw_units.len(),
        extract_duration_ms
    );

    // ── Step 6: Elaborate units, one at a time ───────────────────────────
    let llm_start = Instant::now();
    let units = process_units(&provider, &raw_units, config).await;
    let llm_duration_ms = llm_start.elapsed().as_millis() as u64;

    // ── Step 7: Typeset and write the output document ────────────────────
    let typeset_start = Instant::now();
    let markups: Vec<String> = units.iter().map(|u| u.markup.clone()).collect();
    let geometry = config.geometry();
    let title = config.title.clone();
    let out_path = output_path.as_ref().to_path_buf();

    let physical_pages = tokio::task::spawn_blocking(move || {
        typeset::typeset_to_file(&markups, &geometry, title.as_deref(), &out_path)
    })
    .await
    .map_err(|e| Pdf2NotesError::Internal(format!("Typeset task panicked: {}", e)))??;
    let typeset_duration_ms = typeset_start.elapsed().as_millis() as u64;

    // ── Step 8: Compute stats ────────────────────────────────────────────
    let fallback_units = units.iter().filter(|u| u.fallback).count();
    let elaborated_units = units.len() - fallback_units;

    let stats = ConversionStats {
        total_pages,
        elaborated_units,
        fallback_units,
        physical_pages,
        total_input_tokens: units.iter().map(|u| u.input_tokens as u64).sum(),
        total_output_tokens: units.iter().map(|u| u.output_tokens as u64).sum(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        extract_duration_ms,
        llm_duration_ms,
        typeset_duration_ms,
    };

    info!(
        "Conversion complete: {}/{} units elaborated, {} output pages, {}ms total",
        elaborated_units, total_units, physical_pages, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(total_units, elaborated_units);
    }

    Ok(ConversionOutput {
        units,
        metadata,
        stats,
    })
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2NotesError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2NotesError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input, output_path, config))
}

/// Extract source metadata without converting content.
///
/// Does not require an LLM provider or API key.
pub async fn inspect(input: impl AsRef<str>) -> Result<SourceMetadata, Pdf2NotesError> {
    let pdf_path = extract::resolve_input(input.as_ref())?;
    extract::extract_metadata(&pdf_path).await
}

/// Convert PDF bytes in memory.
///
/// This avoids the need for the caller to create a temporary file. Internally
/// the library writes `bytes` to a managed [`tempfile`] and cleans it up
/// automatically on return or panic. Recommended when the source PDF comes
/// from a database, network stream, or in-memory buffer.
pub async fn convert_from_bytes(
    bytes: &[u8],
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2NotesError> {
    let mut tmp = tempfile::NamedTempFile::new()
        .map_err(|e| Pdf2NotesError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| Pdf2NotesError::Internal(format!("tempfile write: {e}")))?;
    let path = tmp.path().to_string_lossy().to_string();
    // `tmp` is dropped (and the file deleted) when `convert` returns
    convert(&path, output_path, config).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Instantiate a named provider with the given model.
fn create_text_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, Pdf2NotesError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        Pdf2NotesError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// The fallback chain lets library users and CLI users each set exactly as
/// much or as little as they need:
///
/// 1. **Pre-built provider** (`config.provider`) — the caller constructed and
///    configured the provider entirely; we use it as-is. Useful in tests or
///    when the caller needs custom middleware (caching, rate-limiting).
///
/// 2. **Named provider + model** (`config.provider_name`) — the caller named
///    a provider (e.g. `"openai"`) and optional model. The factory reads the
///    corresponding API key (`OPENAI_API_KEY`, etc.) from the environment.
///
/// 3. **OpenAI preference** — when an OpenAI key is present it wins, so users
///    with multiple provider keys get a predictable default.
///
/// 4. **Full auto-detection** (`ProviderFactory::from_env`) — the factory
///    scans all known API key variables and picks the first available
///    provider.
fn resolve_provider(config: &ConversionConfig) -> Result<Arc<dyn LLMProvider>, Pdf2NotesError> {
    // 1) User-provided provider takes priority
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    // 2) Provider name + model
    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or("gpt-4.1-nano");
        return create_text_provider(name, model);
    }

    // 3) Prefer OpenAI explicitly when an OpenAI API key is present.
    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or("gpt-4.1-nano");
            return create_text_provider("openai", model);
        }
    }

    // 4) Full auto-detection
    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| Pdf2NotesError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

/// Elaborate every unit sequentially, firing progress events as we go.
async fn process_units(
    provider: &Arc<dyn LLMProvider>,
    raw_units: &[String],
    config: &ConversionConfig,
) -> Vec<UnitResult> {
    let total_units = raw_units.len();
    let mut results = Vec::with_capacity(total_units);

    for (i, raw) in raw_units.iter().enumerate() {
        let unit_num = i + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_unit_start(unit_num, total_units);
        }

        let result = elaborate::elaborate_unit(provider, unit_num, raw, config).await;

        if let Some(ref cb) = config.progress_callback {
            match &result.error {
                None => cb.on_unit_complete(unit_num, total_units, result.markup.len()),
                Some(e) => cb.on_unit_fallback(unit_num, total_units, &e.to_string()),
            }
        }

        results.push(result);
    }

    results
}
