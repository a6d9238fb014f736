//! LLM interaction: build the elaboration request and call the provider.
//!
//! This module converts one unit of raw page text into a markup-tagged
//! outline via the text-generation provider. It is intentionally thin — all
//! prompt engineering lives in [`crate::prompts`] so it can be changed
//! without touching retry or fallback logic here.
//!
//! ## Retry Strategy
//!
//! HTTP 429 / 503 errors from LLM APIs are transient. Exponential backoff
//! (`retry_backoff_ms * 2^attempt`) avoids hammering a recovering endpoint:
//! with 500 ms base and 3 retries the wait sequence is 500 ms → 1 s → 2 s.
//!
//! ## Fallback Strategy
//!
//! A unit never fails the run. When the call errors out after all retries, or
//! returns an empty body, the unit's **original raw text** becomes the markup
//! — the parser classifies unmarked lines as plain content, so the unit still
//! renders, just without the elaborated structure. An empty response is not
//! retried: the provider answered, it simply had nothing to say, and
//! re-asking mostly burns tokens to get the same nothing back.

use crate::config::ConversionConfig;
use crate::error::UnitError;
use crate::output::UnitResult;
use crate::prompts::{elaboration_request, DEFAULT_SYSTEM_PROMPT};
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// Elaborate a single unit of raw page text into markup.
///
/// ## Message Layout
///
/// 1. **System message** — the structuring instructions (or user override)
/// 2. **User message** — the unit's raw text
///
/// ## Return Value
///
/// Always returns a `UnitResult` — never propagates the error upward, so a
/// single bad unit doesn't abort the document. Callers check
/// `result.fallback` to see whether the original text was substituted.
pub async fn elaborate_unit(
    provider: &Arc<dyn LLMProvider>,
    unit_num: usize,
    raw_text: &str,
    config: &ConversionConfig,
) -> UnitResult {
    let start = Instant::now();
    let system_prompt = config
        .system_prompt
        .as_deref()
        .unwrap_or(DEFAULT_SYSTEM_PROMPT);

    let messages = vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user(elaboration_request(raw_text)),
    ];

    let options = build_options(config);

    let mut last_err: Option<String> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = config.retry_backoff_ms * 2u64.pow(attempt - 1);
            warn!(
                "Unit {}: retry {}/{} after {}ms",
                unit_num, attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        match provider.chat(&messages, Some(&options)).await {
            Ok(response) => {
                let duration = start.elapsed();
                debug!(
                    "Unit {}: {} input tokens, {} output tokens, {:?}",
                    unit_num, response.prompt_tokens, response.completion_tokens, duration
                );

                if response.content.trim().is_empty() {
                    warn!("Unit {}: empty elaboration, using original text", unit_num);
                    let mut result = UnitResult::fallback(
                        unit_num,
                        raw_text,
                        UnitError::EmptyElaboration { unit: unit_num },
                    );
                    result.duration_ms = duration.as_millis() as u64;
                    result.retries = attempt as u8;
                    return result;
                }

                return UnitResult {
                    unit_num,
                    markup: response.content,
                    fallback: false,
                    input_tokens: response.prompt_tokens as u32,
                    output_tokens: response.completion_tokens as u32,
                    duration_ms: duration.as_millis() as u64,
                    retries: attempt as u8,
                    error: None,
                };
            }
            Err(e) => {
                let err_msg = format!("{}", e);
                warn!(
                    "Unit {}: attempt {} failed — {}",
                    unit_num,
                    attempt + 1,
                    err_msg
                );
                last_err = Some(err_msg);
            }
        }
    }

    // All retries exhausted: render this unit from the original text.
    let duration = start.elapsed();
    let detail = last_err.unwrap_or_else(|| "Unknown error".to_string());
    warn!(
        "Unit {}: elaboration failed, falling back to original text",
        unit_num
    );

    let mut result = UnitResult::fallback(
        unit_num,
        raw_text,
        UnitError::ElaborationFailed {
            unit: unit_num,
            retries: config.max_retries as u8,
            detail,
        },
    );
    result.duration_ms = duration.as_millis() as u64;
    result.retries = config.max_retries as u8;
    result
}

/// Build `CompletionOptions` from the conversion config.
fn build_options(config: &ConversionConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse;

    #[test]
    fn build_options_defaults() {
        let config = ConversionConfig::default();
        let opts = build_options(&config);
        assert_eq!(opts.temperature, Some(0.4));
        assert_eq!(opts.max_tokens, Some(4096));
    }

    #[test]
    fn fallback_unit_parses_identically_to_its_raw_text() {
        // The recovery contract: a failed unit renders the nodes its raw
        // text would produce, untouched by the other units' results.
        let raw = "Thread basics\nA thread is a unit of execution";
        let result = UnitResult::fallback(
            2,
            raw,
            UnitError::ElaborationFailed {
                unit: 2,
                retries: 3,
                detail: "503".into(),
            },
        );

        assert!(result.fallback);
        assert_eq!(parse(&result.markup), parse(raw));
    }
}
