use servicedesk_docs::builder::{self, BuildError, DocumentBuilder, RenderedPdf};
use servicedesk_docs::config::BuildOptions;
use servicedesk_docs::content::{self, SECTIONS};
use servicedesk_docs::fonts;
use servicedesk_docs::inspect::{self, PdfSummary};
use genpdf::{Margins, PaperSize};
use lopdf::{Document, Object};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;
use std::sync::Once;

static SKIP_NOTICE: Once = Once::new();

/// Returns false, after printing one notice for the whole run, when no font
/// metrics are installed and the rendering checks cannot execute.
fn fonts_ready() -> bool {
    let available = fonts::fonts_available(None);
    if !available {
        SKIP_NOTICE.call_once(|| {
            eprintln!(
                "NOTE: rendering checks did not run: no Liberation Sans or Arial metrics found. \
                 Install fonts-liberation or set SERVICE_DESK_DOCS_FONTS_DIR to exercise them."
            );
        });
    }
    available
}

fn render_manual(bookmarks: bool) -> Option<RenderedPdf> {
    if !fonts_ready() {
        return None;
    }

    let pdf = DocumentBuilder::new(content::service_desk_manual())
        .with_bookmarks(bookmarks)
        .render()
        .expect("render service desk manual");
    Some(pdf)
}

fn summary_of(pdf: &RenderedPdf) -> PdfSummary {
    inspect::summarize(&pdf.bytes).expect("rendered PDF should parse")
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "servicedesk_docs_{}_{}",
        std::process::id(),
        name
    ));
    fs::create_dir_all(&dir).expect("create scratch directory");
    dir
}

fn scrub_pdf(bytes: &[u8]) -> Vec<u8> {
    fn scrub_segment(data: &mut [u8], tag: &[u8], terminator: u8) {
        let mut index = 0;
        while index + tag.len() < data.len() {
            if data[index..].starts_with(tag) {
                let mut cursor = index + tag.len();
                while cursor < data.len() {
                    let byte = data[cursor];
                    if byte == terminator {
                        break;
                    }
                    if terminator == b')' {
                        data[cursor] = b'0';
                    } else if !matches!(byte, b'<' | b'>' | b' ' | b'\n' | b'\r' | b'\t') {
                        data[cursor] = b'0';
                    }
                    cursor += 1;
                }
                index = cursor;
            } else {
                index += 1;
            }
        }
    }

    let mut normalized = bytes.to_vec();
    scrub_segment(&mut normalized, b"/CreationDate(", b')');
    scrub_segment(&mut normalized, b"/ModDate(", b')');
    scrub_segment(&mut normalized, b"/ID[", b']');
    scrub_segment(&mut normalized, b"/Producer(", b')');
    normalized
}

fn normalized_hash(bytes: &[u8]) -> [u8; 32] {
    let digest = Sha256::digest(scrub_pdf(bytes));
    digest.into()
}

#[test]
fn renders_a_parseable_pdf() {
    let Some(pdf) = render_manual(false) else {
        return;
    };

    assert!(pdf.bytes.starts_with(b"%PDF"), "missing PDF header");
    let summary = summary_of(&pdf);
    assert!(summary.page_count >= 1);
    assert_eq!(summary.page_count, pdf.page_count);
    assert!(summary.outline.is_empty(), "no outline unless requested");
    assert!(summary.contains_line(content::DOCUMENT_TITLE));
}

#[test]
fn builtin_font_text_uses_single_byte_codes() {
    let Some(pdf) = render_manual(false) else {
        return;
    };

    let summary = summary_of(&pdf);
    assert_eq!(
        summary.null_codes, 0,
        "text shown with Helvetica must not carry 0x00 codes"
    );
    assert!(summary.contains_line("1. ARQUITECTURA"));
}

fn media_box(bytes: &[u8]) -> Vec<f64> {
    let document = Document::load_mem(bytes).expect("parse PDF");
    let first_page = *document.get_pages().values().next().expect("one page");
    document
        .get_dictionary(first_page)
        .and_then(|page| page.get(b"MediaBox"))
        .and_then(Object::as_array)
        .expect("page has a MediaBox")
        .iter()
        .map(|value| match value {
            Object::Integer(value) => *value as f64,
            Object::Real(value) => f64::from(*value),
            other => panic!("unexpected MediaBox entry {other:?}"),
        })
        .collect()
}

#[test]
fn paper_size_and_margins_are_applied() {
    let Some(a4) = render_manual(false) else {
        return;
    };

    let builder = DocumentBuilder::new(content::service_desk_manual())
        .with_paper_size(PaperSize::Letter)
        .with_margins(Margins::all(40));
    assert_eq!(builder.manual().headings().len(), 6);
    let letter = builder.render().expect("render on letter paper");

    let a4_box = media_box(&a4.bytes);
    let letter_box = media_box(&letter.bytes);
    // A4 is 595.28pt wide, Letter 612pt.
    assert!((a4_box[2] - 595.0).abs() < 1.0, "A4 box {a4_box:?}");
    assert!((letter_box[2] - 612.0).abs() < 1.0, "Letter box {letter_box:?}");
    assert!(letter.page_count >= a4.page_count);
    let headings = content::service_desk_manual().headings();
    assert!(summary_of(&letter).has_headings_in_order(&headings));
}

#[test]
fn headings_render_in_fixed_order() {
    let Some(pdf) = render_manual(false) else {
        return;
    };

    let summary = summary_of(&pdf);
    assert!(summary.has_headings_in_order(&[
        "1. ARQUITECTURA",
        "2. MODULOS Y FUNCIONALIDADES",
        "3. SEGURIDAD",
        "4. INSTALACION",
        "5. ENDPOINTS API",
        "6. TROUBLESHOOTING",
    ]));
    assert!(
        pdf.section_pages.iter().all(Option::is_some),
        "every heading should be placed: {:?}",
        pdf.section_pages
    );
    assert_eq!(pdf.section_pages.first(), Some(&Some(1)));
    assert!(pdf
        .section_pages
        .windows(2)
        .all(|pair| pair[0] <= pair[1]));
}

#[test]
fn every_body_line_is_printed_in_full() {
    let Some(pdf) = render_manual(false) else {
        return;
    };

    let summary = summary_of(&pdf);
    for section in SECTIONS {
        for line in section.body_lines().into_iter().filter(|l| !l.is_empty()) {
            assert!(
                summary.contains_line(line),
                "{}: line {:?} not found in output",
                section.heading(),
                line
            );
        }
    }
}

#[test]
fn rendering_is_deterministic() {
    let Some(pdf_a) = render_manual(false) else {
        return;
    };
    let Some(pdf_b) = render_manual(false) else {
        return;
    };

    assert_eq!(pdf_a.page_count, pdf_b.page_count);
    assert_eq!(summary_of(&pdf_a), summary_of(&pdf_b));
    assert_eq!(pdf_a.bytes.len(), pdf_b.bytes.len(), "PDF sizes should match");
    assert_eq!(
        normalized_hash(&pdf_a.bytes),
        normalized_hash(&pdf_b.bytes),
        "PDF renders must be deterministic after metadata normalization"
    );
}

#[test]
fn bookmarks_point_at_every_section() {
    let Some(pdf) = render_manual(true) else {
        return;
    };

    let summary = summary_of(&pdf);
    assert_eq!(summary.outline, content::service_desk_manual().headings());
    assert_eq!(summary.page_count, pdf.page_count);
}

#[test]
fn generate_writes_the_configured_path() {
    if !fonts_ready() {
        return;
    }

    let dir = scratch_dir("generate");
    let output = dir.join("Service_Desk_Documentacion.pdf");
    let options = BuildOptions::new().with_output(&output);

    let pdf = builder::generate(&options).expect("generate manual");
    let written = fs::read(&output).expect("output file should exist");
    assert_eq!(written, pdf.bytes);
    assert_eq!(
        options.confirmation_message(),
        format!("PDF creado: {}", output.display())
    );

    let summary = inspect::summarize_file(&output).expect("written PDF should parse");
    assert_eq!(summary.page_count, pdf.page_count);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn generate_fails_when_output_directory_is_missing() {
    let dir = scratch_dir("missing");
    let output = dir.join("does-not-exist").join("manual.pdf");
    let options = BuildOptions::new().with_output(&output);

    let result = builder::generate(&options);
    assert!(result.is_err(), "build must not succeed without the directory");
    if fonts::fonts_available(None) {
        assert!(matches!(result, Err(BuildError::Write { .. })));
    }
    assert!(!output.exists());
    assert!(!output.parent().map_or(false, |parent| parent.exists()));

    fs::remove_dir_all(&dir).ok();
}
