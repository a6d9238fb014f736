//! Typesetting: replay layout commands onto the output PDF document.
//!
//! This is the only stage that touches the drawing backend. Per unit it runs
//! cleanup → parse → layout, then walks the command list: every
//! [`Command::StartPage`] commits the page under construction and opens a
//! fresh one, every [`Command::Place`] wraps and draws one styled block.
//!
//! ## Measurement and drawing must agree
//!
//! The layout engine decides page breaks from the heights [`PdfMeasurer`]
//! reports, so the renderer re-wraps each block with the *same* greedy
//! algorithm against the same font metrics before drawing. Both go through
//! [`wrap_text`]; there is no second wrapping policy to drift out of sync.
//!
//! ## Coordinate system
//!
//! PDF user space puts the origin at the bottom-left. A placement's `y` is
//! the bottom of the wrapped block; line `i` (counting from the top of the
//! block) gets its baseline at `y + height - i*leading - ascent`, with the
//! ascent approximated as 80% of the font size — close enough for the base-14
//! Helvetica faces this tool uses.

use crate::error::Pdf2NotesError;
use crate::layout::{self, Command, Extent, PageGeometry, TextMeasurer};
use crate::markup;
use crate::pipeline::cleanup;
use crate::style::StyleProfile;
use oxidize_pdf::{measure_text, Document, Page};
use std::path::Path;
use tracing::debug;

/// Baseline offset from the top of a line box, as a fraction of font size.
const ASCENT_RATIO: f64 = 0.8;

/// Padding around a block's background panel.
const PANEL_PADDING: f64 = 6.0;

/// Glyph-accurate measurer backed by the PDF library's base-14 font metrics.
///
/// This is the production [`TextMeasurer`]: greedy word wrap against
/// `measure_text`, block height = line count × leading. The block's
/// `left_indent` is spent from the given `max_width`, mirroring how the
/// renderer shifts the block right of the margin.
pub struct PdfMeasurer;

impl TextMeasurer for PdfMeasurer {
    fn measure(&self, text: &str, style: &StyleProfile, max_width: f64) -> Extent {
        let wrap_width = (max_width - style.left_indent).max(1.0);
        let lines = wrap_text(text, style, wrap_width);
        let widest = lines
            .iter()
            .map(|l| measure_text(l, style.font.clone(), style.size))
            .fold(0.0_f64, f64::max);

        Extent {
            width: widest + style.left_indent,
            height: lines.len().max(1) as f64 * style.leading,
        }
    }
}

/// Greedy word wrap: fill each line while the measured width fits.
///
/// A single word wider than `max_width` gets its own overlong line — words
/// are never split mid-glyph.
fn wrap_text(text: &str, style: &StyleProfile, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        if current.is_empty() || measure_text(&candidate, style.font.clone(), style.size) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// A typeset document plus the page count the layout produced.
pub struct TypesetResult {
    pub document: Document,
    pub physical_pages: usize,
}

/// Parse, lay out, and draw every elaboration unit into a fresh document.
///
/// Each unit opens on a fresh physical page; a unit may span several pages.
/// Drawing failures are fatal to the whole render — there is no per-unit
/// recovery once ink hits the page.
pub fn typeset_units(
    units: &[String],
    geometry: &PageGeometry,
    title: Option<&str>,
) -> Result<TypesetResult, Pdf2NotesError> {
    let measurer = PdfMeasurer;
    let mut document = Document::new();
    if let Some(t) = title {
        document.set_title(t);
    }

    let mut current: Option<Page> = None;
    let mut physical_pages = 0usize;

    for unit in units {
        let cleaned = cleanup::clean_markup(unit);
        let nodes = markup::parse(&cleaned);
        debug!("Unit parsed into {} nodes", nodes.len());

        for command in layout::layout_unit(&nodes, geometry, &measurer) {
            match command {
                Command::StartPage => {
                    if let Some(done) = current.take() {
                        document.add_page(done);
                    }
                    current = Some(Page::new(geometry.width, geometry.height));
                    physical_pages += 1;
                }
                Command::Place { text, style, x, y } => {
                    let page = current.as_mut().ok_or_else(|| {
                        Pdf2NotesError::Internal(
                            "placement emitted before any page start".into(),
                        )
                    })?;
                    place_block(page, &text, &style, x, y, geometry.available_width())?;
                }
            }
        }
    }

    if let Some(done) = current.take() {
        document.add_page(done);
    }

    Ok(TypesetResult {
        document,
        physical_pages,
    })
}

/// Draw one wrapped block: optional background panel, then each line.
fn place_block(
    page: &mut Page,
    text: &str,
    style: &StyleProfile,
    x: f64,
    y: f64,
    available_width: f64,
) -> Result<(), Pdf2NotesError> {
    let wrap_width = (available_width - style.left_indent).max(1.0);
    let lines = wrap_text(text, style, wrap_width);
    let height = lines.len().max(1) as f64 * style.leading;
    let text_x = x + style.left_indent;

    if let Some(bg) = style.background {
        page.graphics()
            .set_fill_color(bg)
            .rectangle(
                text_x - PANEL_PADDING,
                y - PANEL_PADDING,
                wrap_width + 2.0 * PANEL_PADDING,
                height + 2.0 * PANEL_PADDING,
            )
            .fill();
    }

    for (i, line) in lines.iter().enumerate() {
        let line_top = y + height - i as f64 * style.leading;
        let baseline = line_top - style.size * ASCENT_RATIO;

        page.graphics().set_fill_color(style.color);
        page.text()
            .set_font(style.font.clone(), style.size)
            .at(text_x, baseline)
            .write(line)
            .map_err(|e| Pdf2NotesError::RenderFailed {
                detail: e.to_string(),
            })?;
    }

    Ok(())
}

/// Serialise the document to `path` atomically (temp file + rename).
pub fn write_document(document: &mut Document, path: &Path) -> Result<(), Pdf2NotesError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| Pdf2NotesError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
    }

    let tmp_path = path.with_extension("pdf.tmp");
    let tmp_str = tmp_path.to_string_lossy();
    document
        .save(tmp_str.as_ref())
        .map_err(|e| Pdf2NotesError::PdfWriteFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

    std::fs::rename(&tmp_path, path).map_err(|e| Pdf2NotesError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Typeset all units and write the result to `path`.
///
/// Returns the number of physical pages committed.
pub fn typeset_to_file(
    units: &[String],
    geometry: &PageGeometry,
    title: Option<&str>,
    path: &Path,
) -> Result<usize, Pdf2NotesError> {
    let TypesetResult {
        mut document,
        physical_pages,
    } = typeset_units(units, geometry, title)?;
    write_document(&mut document, path)?;
    Ok(physical_pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::NodeKind;
    use crate::style::resolve;

    #[test]
    fn wrap_splits_on_measured_width() {
        let style = resolve(NodeKind::Body);
        let text = "alpha beta gamma delta epsilon zeta eta theta";
        let lines = wrap_text(text, &style, 80.0);

        assert!(lines.len() > 1, "80pt must force a wrap, got {lines:?}");
        for line in &lines {
            let w = measure_text(line, style.font.clone(), style.size);
            // Each committed line fits, except a single overlong word.
            assert!(
                w <= 80.0 || !line.contains(' '),
                "line {line:?} is {w}pt wide"
            );
        }
    }

    #[test]
    fn wrap_preserves_every_word_in_order() {
        let style = resolve(NodeKind::Body);
        let text = "one two three four five six seven";
        let lines = wrap_text(text, &style, 60.0);
        let rejoined = lines.join(" ");
        assert_eq!(rejoined, text);
    }

    #[test]
    fn overlong_word_gets_its_own_line() {
        let style = resolve(NodeKind::Body);
        let lines = wrap_text("a incomprehensibilities b", &style, 30.0);
        assert!(lines.contains(&"incomprehensibilities".to_string()));
    }

    #[test]
    fn measured_height_is_a_multiple_of_leading() {
        let style = resolve(NodeKind::Body);
        let extent = PdfMeasurer.measure(
            "some body text that will wrap across a couple of lines at least",
            &style,
            120.0,
        );
        let lines = extent.height / style.leading;
        assert!((lines - lines.round()).abs() < 1e-9);
        assert!(lines >= 2.0);
    }

    #[test]
    fn empty_text_still_occupies_one_line() {
        let style = resolve(NodeKind::Example);
        let extent = PdfMeasurer.measure("", &style, 500.0);
        assert_eq!(extent.height, style.leading);
    }

    #[test]
    fn one_unit_per_fresh_page() {
        let geometry = PageGeometry::landscape_letter();
        let units = vec![
            "## First unit\nbody".to_string(),
            "## Second unit\nbody".to_string(),
        ];
        let result = typeset_units(&units, &geometry, None).unwrap();

        assert_eq!(result.physical_pages, 2);
        assert_eq!(result.document.page_count(), 2);
    }

    #[test]
    fn long_unit_spans_multiple_pages() {
        let geometry = PageGeometry::landscape_letter();
        // Enough body lines to exceed one 522pt-high page at 16pt leading.
        let unit = vec!["a body line"; 40].join("\n");
        let result = typeset_units(&[unit], &geometry, None).unwrap();

        assert!(
            result.physical_pages >= 2,
            "40 body blocks cannot fit one page, got {}",
            result.physical_pages
        );
    }

    #[test]
    fn empty_unit_list_produces_no_pages() {
        let geometry = PageGeometry::landscape_letter();
        let result = typeset_units(&[], &geometry, None).unwrap();
        assert_eq!(result.physical_pages, 0);
        assert_eq!(result.document.page_count(), 0);
    }
}
