//! Prompts for the elaboration call.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the markup grammar the parser understands
//!    (`## `, `### `, `* `, `<example>…</example>`) is exactly the grammar the
//!    model is instructed to emit. Changing one without the other silently
//!    degrades output structure, so both live within arm's reach.
//!
//! 2. **Testability** — unit tests can inspect prompts directly without a
//!    live model call.
//!
//! Callers can override the default via
//! [`crate::config::ConversionConfig::system_prompt`]; the constant here is
//! used only when no override is provided.

/// Default system prompt instructing the model to restructure page text into
/// the markup grammar the parser consumes.
///
/// This prompt is used when `ConversionConfig::system_prompt` is `None`.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an expert tutor turning lecture material into clear study notes. Elaborate on the provided content and structure your response EXACTLY like this:

## MAIN TITLE
## [Main Heading Here]

### [Subheading 1]
* Bullet points for key ideas
* Use * for bullets
* Keep explanations concise

<example>
[Relevant example here, on a single line]
</example>

### [Subheading 2]
...

Rules:
- Use ## only for the page title and main headings, ### for subheadings.
- Keep each <example> pair on one line.
- Output ONLY the structured notes, no commentary."#;

/// Assemble the user message for one elaboration unit.
pub fn elaboration_request(raw_text: &str) -> String {
    format!("Content to elaborate:\n{raw_text}")
}
