//! Reads a rendered manual back for verification.
//!
//! Text is recovered from the page content streams. The string operands of
//! the text-showing operators are decoded with the `/Encoding` of the font
//! selected by the preceding `Tf`, using `lopdf`'s decoder.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::encoding::is_simple_font;

/// Errors raised while reading a PDF back.
#[derive(Debug)]
pub enum InspectError {
    /// The file could not be read.
    Read {
        /// File that failed to open.
        path: PathBuf,
        /// Underlying filesystem error.
        source: std::io::Error,
    },
    /// `lopdf` could not parse the document or one of its content streams.
    Parse(lopdf::Error),
}

impl From<lopdf::Error> for InspectError {
    fn from(err: lopdf::Error) -> Self {
        Self::Parse(err)
    }
}

impl fmt::Display for InspectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, .. } => write!(f, "Failed to read {}", path.display()),
            Self::Parse(err) => write!(f, "Failed to parse PDF: {err}"),
        }
    }
}

impl std::error::Error for InspectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

/// What could be recovered from a PDF file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PdfSummary {
    /// Number of pages in the page tree.
    pub page_count: usize,
    /// Printed text lines in content-stream order across all pages.
    pub lines: Vec<String>,
    /// Titles of the top-level outline entries, if any.
    pub outline: Vec<String>,
    /// Number of 0x00 codes shown with single-byte fonts.
    pub null_codes: usize,
}

impl PdfSummary {
    /// Returns whether `headings` all appear as lines, in the given order.
    pub fn has_headings_in_order(&self, headings: &[&str]) -> bool {
        headings_in_order(&self.lines, headings)
    }

    /// Returns whether `needle` appears as a whole printed line.
    pub fn contains_line(&self, needle: &str) -> bool {
        let needle = normalize_whitespace(needle);
        self.lines.iter().any(|line| *line == needle)
    }
}

/// How the strings of one page font are decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextFont {
    /// Name of the font's base encoding, when it has one.
    pub encoding: Option<String>,
    /// Whether the font reads one byte per character code.
    pub single_byte: bool,
}

impl TextFont {
    fn from_dictionary(font: &Dictionary) -> Self {
        let encoding = match font.get(b"Encoding") {
            Ok(Object::Name(name)) => Some(String::from_utf8_lossy(name).into_owned()),
            Ok(Object::Dictionary(differences)) => differences
                .get(b"BaseEncoding")
                .and_then(Object::as_name_str)
                .ok()
                .map(str::to_owned),
            _ => None,
        };
        Self {
            encoding,
            single_byte: is_simple_font(font),
        }
    }
}

/// Parses PDF bytes and extracts page count, text lines and outline titles.
pub fn summarize(bytes: &[u8]) -> Result<PdfSummary, InspectError> {
    let document = Document::load_mem(bytes)?;
    summarize_document(&document)
}

/// Reads and summarizes the PDF at `path`.
pub fn summarize_file(path: impl AsRef<Path>) -> Result<PdfSummary, InspectError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| InspectError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    summarize(&bytes)
}

fn page_fonts(document: &Document, page_id: ObjectId) -> BTreeMap<Vec<u8>, TextFont> {
    document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, TextFont::from_dictionary(font)))
        .collect()
}

fn summarize_document(document: &Document) -> Result<PdfSummary, InspectError> {
    let pages = document.get_pages();
    let mut lines = Vec::new();
    let mut null_codes = 0;

    for page_id in pages.values() {
        let fonts = page_fonts(document, *page_id);
        let content = document.get_page_content(*page_id)?;
        let content = Content::decode(&content)?;
        lines.extend(text_lines(&content.operations, &fonts));
        null_codes += count_null_codes(&content.operations, &fonts);
    }

    Ok(PdfSummary {
        page_count: pages.len(),
        lines,
        outline: outline_titles(document)?,
        null_codes,
    })
}

/// Walks the text-showing operators, tracking the font selected by `Tf`.
fn for_each_text_string<'a>(
    operations: &'a [Operation],
    fonts: &'a BTreeMap<Vec<u8>, TextFont>,
    mut visit: impl FnMut(TextEvent<'a>),
) {
    let mut font = None;

    for operation in operations {
        match operation.operator.as_str() {
            "Tf" => {
                font = operation
                    .operands
                    .first()
                    .and_then(|name| name.as_name().ok())
                    .and_then(|name| fonts.get(name));
            }
            "Tj" | "TJ" => visit_strings(&operation.operands, font, &mut visit),
            "'" | "\"" => {
                visit(TextEvent::LineBreak);
                visit_strings(&operation.operands, font, &mut visit);
            }
            "BT" | "ET" | "Td" | "TD" | "Tm" | "T*" => visit(TextEvent::LineBreak),
            _ => {}
        }
    }
    visit(TextEvent::LineBreak);
}

enum TextEvent<'a> {
    Shown(Option<&'a TextFont>, &'a [u8]),
    LineBreak,
}

fn visit_strings<'a>(
    operands: &'a [Object],
    font: Option<&'a TextFont>,
    visit: &mut impl FnMut(TextEvent<'a>),
) {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => visit(TextEvent::Shown(font, bytes)),
            Object::Array(items) => visit_strings(items, font, visit),
            _ => {}
        }
    }
}

/// Groups the text shown by `operations` into lines.
///
/// A line ends at every text object boundary or explicit cursor move. Strings
/// are decoded with the encoding of the active font from `fonts`, and runs of
/// whitespace collapse to a single space.
pub fn text_lines(operations: &[Operation], fonts: &BTreeMap<Vec<u8>, TextFont>) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for_each_text_string(operations, fonts, |event| match event {
        TextEvent::Shown(font, bytes) => {
            let encoding = font.and_then(|font| font.encoding.as_deref());
            current.push_str(&Document::decode_text(encoding, bytes));
        }
        TextEvent::LineBreak => {
            let line = normalize_whitespace(&current);
            if !line.is_empty() {
                lines.push(line);
            }
            current.clear();
        }
    });

    lines
}

/// Counts 0x00 bytes in strings shown with single-byte fonts.
///
/// Code 0 has no glyph in the standard encodings, so any hit means a string
/// was written with the wrong code width.
pub fn count_null_codes(operations: &[Operation], fonts: &BTreeMap<Vec<u8>, TextFont>) -> usize {
    let mut count = 0;
    for_each_text_string(operations, fonts, |event| {
        if let TextEvent::Shown(Some(font), bytes) = event {
            if font.single_byte {
                count += bytes.iter().filter(|byte| **byte == 0).count();
            }
        }
    });
    count
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns whether every heading occurs as a line after the previous one.
pub fn headings_in_order(lines: &[String], headings: &[&str]) -> bool {
    let mut remaining = lines.iter();
    headings
        .iter()
        .all(|heading| remaining.any(|line| line.trim() == *heading))
}

fn outline_titles(document: &Document) -> Result<Vec<String>, InspectError> {
    let catalog_id = document.trailer.get(b"Root").and_then(Object::as_reference)?;
    let catalog = document.get_dictionary(catalog_id)?;

    let Some(outlines) = referenced_dictionary(document, catalog, b"Outlines") else {
        return Ok(Vec::new());
    };

    let mut titles = Vec::new();
    let mut next = referenced_dictionary(document, outlines, b"First");
    // Bounded walk in case of a cyclic /Next chain.
    while let Some(item) = next {
        if titles.len() > document.objects.len() {
            break;
        }
        if let Ok(title) = item.get(b"Title").and_then(Object::as_str) {
            titles.push(String::from_utf8_lossy(title).into_owned());
        }
        next = referenced_dictionary(document, item, b"Next");
    }

    Ok(titles)
}

fn referenced_dictionary<'a>(
    document: &'a Document,
    dictionary: &Dictionary,
    key: &[u8],
) -> Option<&'a Dictionary> {
    let id = dictionary.get(key).and_then(Object::as_reference).ok()?;
    document.get_dictionary(id).ok()
}
