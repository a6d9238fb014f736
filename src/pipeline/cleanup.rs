//! Pre-parse cleanup: deterministic scrubbing of model-generated markup.
//!
//! ## Why is cleanup necessary?
//!
//! Even well-prompted models occasionally introduce artefacts that are
//! *semantically harmless* from the model's perspective but would confuse the
//! line-oriented parser — for example:
//!
//! - Wrapping the whole response in ` ``` ` fences despite the prompt saying
//!   not to (a fenced `## Title` line would still parse, but the fence lines
//!   themselves would render as stray body text)
//! - Windows-style `\r\n` line endings, which would leave a trailing `\r` on
//!   every extracted text value
//! - Invisible Unicode (zero-width spaces, BOM) that breaks marker prefix
//!   matching when it lands at the start of a line
//!
//! This module applies cheap, deterministic rules that fix those quirks
//! without touching content, *before* the parser runs. Each rule is a pure
//! `&str → String` pass with no shared state, independently testable.
//!
//! ## Rule Order
//!
//! Fences are stripped first so the remaining rules see the real content;
//! line endings are normalised before per-line trimming.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to raw model output (or fallback text).
///
/// Rules (applied in order):
/// 1. Strip outer code fences (models sometimes disobey the prompt)
/// 2. Normalise line endings (CRLF → LF)
/// 3. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 4. Trim trailing whitespace per line
pub fn clean_markup(input: &str) -> String {
    let s = strip_outer_fences(input);
    let s = normalise_line_endings(&s);
    let s = remove_invisible_chars(&s);
    trim_trailing_whitespace(&s)
}

// ── Rule 1: Strip outer code fences ──────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:markdown|md|text)?\n(.*)\n```\s*$").unwrap());

fn strip_outer_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Strip invisible Unicode ──────────────────────────────────────────

const INVISIBLE: [char; 5] = ['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}', '\u{00AD}'];

fn remove_invisible_chars(input: &str) -> String {
    input.chars().filter(|c| !INVISIBLE.contains(c)).collect()
}

// ── Rule 4: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outer_fences_are_stripped() {
        let input = "```markdown\n## Title\n* point\n```";
        assert_eq!(clean_markup(input), "## Title\n* point");
    }

    #[test]
    fn bare_fences_are_stripped_too() {
        let input = "```\n## Title\n```";
        assert_eq!(clean_markup(input), "## Title");
    }

    #[test]
    fn inner_fences_are_left_alone() {
        let input = "## Title\n```\ncode\n```\nafter";
        assert_eq!(clean_markup(input), input);
    }

    #[test]
    fn crlf_is_normalised() {
        // The final newline goes with the per-line trim; the parser never
        // cared about it anyway.
        assert_eq!(clean_markup("## A\r\nbody\r\n"), "## A\nbody");
    }

    #[test]
    fn zero_width_junk_is_removed() {
        let input = "\u{FEFF}## Ti\u{200B}tle";
        assert_eq!(clean_markup(input), "## Title");
    }

    #[test]
    fn trailing_whitespace_is_trimmed_per_line() {
        assert_eq!(clean_markup("## A   \nbody\t"), "## A\nbody");
    }

    #[test]
    fn clean_input_is_unchanged() {
        let input = "## Title\n### Sub\n* point\nbody";
        assert_eq!(clean_markup(input), input);
    }
}
