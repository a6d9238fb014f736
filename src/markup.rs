//! Markup parser: elaborated text → ordered sequence of typed content nodes.
//!
//! The elaboration model is instructed to answer in a small line-oriented
//! grammar (`## `, `### `, `* `, `<example>…</example>`). This module turns
//! one such response into a flat, ordered `Vec<ContentNode>` that the layout
//! engine can consume without ever looking back at the raw text.
//!
//! The parser is **total**: there is no unparseable input. Any line that
//! matches no marker is classified by the level state carried across the
//! pass — `Heading` while the most recent marker was a title line, `Body`
//! otherwise. Model output that ignores the grammar entirely (or the raw-text
//! fallback after a failed elaboration call) therefore still renders, just
//! without the richer structure.

use serde::{Deserialize, Serialize};

const EXAMPLE_OPEN: &str = "<example>";
const EXAMPLE_CLOSE: &str = "</example>";

/// The closed set of content classifications.
///
/// Each kind maps to exactly one [`crate::style::StyleProfile`]; adding a
/// variant here forces the style resolver's `match` to be extended, so the
/// mapping stays total by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// A `## ` line. Every `## ` line is a title; the grammar does not
    /// single out the first one.
    Title,
    /// A plain line while the level state is at title level.
    Heading,
    /// A `### ` line.
    Subheading,
    /// A `* ` line.
    Bullet,
    /// A line carrying an inline `<example>…</example>` pair.
    Example,
    /// Any other plain line.
    Body,
}

/// One classified piece of content: a kind plus its display text with all
/// markers and delimiters stripped.
///
/// Nodes are immutable once parsed and carry no layout state; document order
/// of the `Vec` is the render order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentNode {
    pub kind: NodeKind,
    pub text: String,
}

impl ContentNode {
    fn new(kind: NodeKind, text: &str) -> Self {
        Self {
            kind,
            text: text.trim().to_string(),
        }
    }
}

/// What an unmarked line classifies as, given the most recent level marker.
///
/// This is the parser's only state. It is a local threaded through the pass
/// rather than anything module-level, so concurrent parses cannot interfere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlainLineKind {
    /// A `## ` title line was seen most recently.
    Heading,
    /// A `### ` line was seen most recently, or no marker yet.
    Body,
}

/// Parse a markup string into document-ordered content nodes.
///
/// Single forward pass, no lookahead. Blank (or whitespace-only) lines
/// produce no node; every other line produces exactly one. Leading and
/// trailing whitespace is trimmed from every extracted text value, and
/// `<example>` / `</example>` substrings are stripped even when unbalanced.
pub fn parse(markup: &str) -> Vec<ContentNode> {
    let mut nodes = Vec::new();
    let mut plain = PlainLineKind::Body;

    for raw in markup.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let node = if let Some(rest) = line.strip_prefix("## ") {
            plain = PlainLineKind::Heading;
            ContentNode::new(NodeKind::Title, rest)
        } else if let Some(rest) = line.strip_prefix("### ") {
            plain = PlainLineKind::Body;
            ContentNode::new(NodeKind::Subheading, rest)
        } else if let Some(rest) = line.strip_prefix("* ") {
            ContentNode::new(NodeKind::Bullet, rest)
        } else if line.contains(EXAMPLE_OPEN) {
            let text = line.replace(EXAMPLE_OPEN, "").replace(EXAMPLE_CLOSE, "");
            ContentNode::new(NodeKind::Example, &text)
        } else {
            match plain {
                PlainLineKind::Heading => ContentNode::new(NodeKind::Heading, line),
                PlainLineKind::Body => ContentNode::new(NodeKind::Body, line),
            }
        };

        nodes.push(node);
    }

    nodes
}
