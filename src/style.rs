//! Style resolution: map each [`NodeKind`] to its presentation profile.
//!
//! Profiles are process-wide constants expressed as a single total `match`,
//! so a missing mapping is a compile error rather than a runtime lookup miss.
//! The palette and spacing values come from the note-taking style sheet this
//! tool ships with: dark slate titles, blue headings, a light grey panel
//! behind examples.

use std::borrow::Cow;

use oxidize_pdf::{Color, Font};

use crate::markup::{ContentNode, NodeKind};

/// Extra vertical gap applied after a title block, on top of its
/// `space_after`. Titles open a section and read better with more air.
pub const TITLE_EXTRA_GAP: f64 = 15.0;

/// Per-kind presentation attributes.
///
/// `leading` is the per-line advance used for wrapped text; `left_indent`
/// shifts the whole block right of the page margin; `space_after` is the
/// vertical gap the layout cursor adds below the block.
#[derive(Debug, Clone)]
pub struct StyleProfile {
    pub font: Font,
    pub size: f64,
    pub leading: f64,
    pub left_indent: f64,
    pub space_after: f64,
    pub color: Color,
    /// Panel fill painted behind the wrapped block, if any.
    pub background: Option<Color>,
    /// Glyph prefixed to the node text at pre-render time, if any.
    pub bullet_glyph: Option<&'static str>,
}

/// Resolve the presentation profile for a node kind.
///
/// Pure and total: repeated calls with the same kind return identical values.
pub fn resolve(kind: NodeKind) -> StyleProfile {
    match kind {
        NodeKind::Title => StyleProfile {
            font: Font::HelveticaBold,
            size: 20.0,
            leading: 24.0,
            left_indent: 0.0,
            space_after: 18.0,
            color: Color::rgb(0.173, 0.243, 0.314),
            background: None,
            bullet_glyph: None,
        },
        NodeKind::Heading => StyleProfile {
            font: Font::HelveticaBold,
            size: 16.0,
            leading: 20.0,
            left_indent: 0.0,
            space_after: 12.0,
            color: Color::rgb(0.161, 0.502, 0.725),
            background: None,
            bullet_glyph: None,
        },
        NodeKind::Subheading => StyleProfile {
            font: Font::HelveticaBold,
            size: 14.0,
            leading: 18.0,
            left_indent: 0.0,
            space_after: 10.0,
            color: Color::rgb(0.204, 0.286, 0.369),
            background: None,
            bullet_glyph: None,
        },
        NodeKind::Bullet => StyleProfile {
            font: Font::Helvetica,
            size: 12.0,
            leading: 16.0,
            left_indent: 25.0,
            space_after: 6.0,
            color: Color::rgb(0.0, 0.0, 0.0),
            background: None,
            bullet_glyph: Some("\u{2022} "),
        },
        NodeKind::Example => StyleProfile {
            font: Font::Helvetica,
            size: 12.0,
            leading: 16.0,
            left_indent: 15.0,
            space_after: 12.0,
            color: Color::rgb(0.0, 0.0, 0.0),
            background: Some(Color::rgb(0.973, 0.976, 0.980)),
            bullet_glyph: None,
        },
        NodeKind::Body => StyleProfile {
            font: Font::Helvetica,
            size: 12.0,
            leading: 16.0,
            left_indent: 10.0,
            space_after: 8.0,
            color: Color::rgb(0.0, 0.0, 0.0),
            background: None,
            bullet_glyph: None,
        },
    }
}

/// The string actually measured and drawn for a node.
///
/// Applies the bullet glyph here, at pre-render time, so the glyph is part of
/// the measured text without ever being stored in the [`ContentNode`].
pub fn display_text(node: &ContentNode) -> Cow<'_, str> {
    match resolve(node.kind).bullet_glyph {
        Some(glyph) => Cow::Owned(format!("{glyph}{}", node.text)),
        None => Cow::Borrowed(node.text.as_str()),
    }
}
