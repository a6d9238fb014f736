//! Integration tests for the core pipeline: markup → nodes → layout →
//! typeset → saved PDF. No network, no API keys — the elaboration stage is
//! bypassed by feeding markup (or fallback raw text) straight to the
//! typesetter, exactly the shape a failed-elaboration run takes.

use pdf2notes::layout::{Command, PageGeometry};
use pdf2notes::pipeline::typeset::{typeset_to_file, typeset_units, PdfMeasurer};
use pdf2notes::{parse, NodeKind, UnitError, UnitResult};
use std::path::PathBuf;

fn out_path(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

const UNIT_ONE: &str = "## Threads\n\
What is a thread?\n\
### Definition\n\
* A thread is a unit of execution\n\
* Threads share an address space\n\
<example>Two threads incrementing one counter need a lock</example>\n\
Plain closing remark";

const UNIT_TWO: &str = "## Scheduling\n\
### Policies\n\
* Round robin\n\
* Priority based";

#[test]
fn markup_to_pdf_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = out_path(&dir, "notes.pdf");
    let geometry = PageGeometry::landscape_letter();

    let pages = typeset_to_file(
        &[UNIT_ONE.to_string(), UNIT_TWO.to_string()],
        &geometry,
        Some("Test Notes"),
        &path,
    )
    .expect("typeset should succeed");

    assert_eq!(pages, 2, "two short units → two physical pages");

    let bytes = std::fs::read(&path).expect("output file must exist");
    assert!(bytes.starts_with(b"%PDF"), "output must be a PDF");
    assert!(bytes.len() > 500, "suspiciously small PDF: {}", bytes.len());

    // Atomic write leaves no temp file behind.
    assert!(!path.with_extension("pdf.tmp").exists());
}

#[test]
fn units_start_on_fresh_pages_regardless_of_remaining_space() {
    let geometry = PageGeometry::landscape_letter();
    // Unit one is a single tiny block; unit two must still open page 2.
    let result = typeset_units(
        &["## Tiny".to_string(), "## Also tiny".to_string()],
        &geometry,
        None,
    )
    .unwrap();

    assert_eq!(result.physical_pages, 2);
    assert_eq!(result.document.page_count(), 2);
}

#[test]
fn overflowing_body_breaks_once_with_real_metrics() {
    // Scenario: a page nearly full, then one block that cannot fit. With the
    // glyph-accurate measurer the break must appear exactly once, immediately
    // before the overflowing block's placement.
    let geometry = PageGeometry::landscape_letter();
    let markup = vec!["filler body line"; 25].join("\n");
    let nodes = parse(&markup);
    let commands = pdf2notes::layout::layout_unit(&nodes, &geometry, &PdfMeasurer);

    let mut breaks_after_first = 0;
    let mut saw_place = false;
    for c in &commands {
        match c {
            Command::StartPage if saw_place => breaks_after_first += 1,
            Command::Place { .. } => saw_place = true,
            _ => {}
        }
    }
    assert_eq!(
        breaks_after_first, 1,
        "25 body blocks at 24pt each overflow a 522pt page exactly once"
    );

    // Every placement respects the bottom margin.
    for c in &commands {
        if let Command::Place { y, .. } = c {
            assert!(*y >= geometry.margin);
        }
    }
}

#[test]
fn fallback_unit_renders_its_raw_text_nodes() {
    // One unit among three fails elaboration: its rendered nodes equal the
    // parse of the original raw text, and the neighbours are untouched.
    let raw = "Raw page about mutexes\nLocks protect shared data";
    let failed = UnitResult::fallback(
        2,
        raw,
        UnitError::ElaborationFailed {
            unit: 2,
            retries: 3,
            detail: "boom".into(),
        },
    );

    let markups = [UNIT_ONE.to_string(), failed.markup.clone(), UNIT_TWO.to_string()];

    let fallback_nodes = parse(&markups[1]);
    assert_eq!(fallback_nodes, parse(raw));
    assert!(fallback_nodes.iter().all(|n| n.kind == NodeKind::Body));

    let first_nodes = parse(&markups[0]);
    assert_eq!(first_nodes[0].kind, NodeKind::Title);

    let geometry = PageGeometry::landscape_letter();
    let result = typeset_units(&markups, &geometry, None).unwrap();
    assert_eq!(result.physical_pages, 3);
}

#[test]
fn parsed_kinds_stay_within_the_closed_set() {
    let weird = "\u{FEFF}```\n#### not a marker\n-- dashes --\n####\n```";
    for node in parse(weird) {
        assert!(matches!(
            node.kind,
            NodeKind::Title
                | NodeKind::Heading
                | NodeKind::Subheading
                | NodeKind::Bullet
                | NodeKind::Example
                | NodeKind::Body
        ));
    }
}
