//! Post-render fix-up for text shown with simple (single-byte) fonts.
//!
//! `genpdf` hands text for built-in fonts to `printpdf` as 16-bit codes, so
//! each Windows-1252 character lands in the content stream as two bytes with a
//! leading 0x00. Simple fonts read one byte per code, which would turn every
//! high byte into an undefined glyph. This pass rewrites those strings to one
//! byte per character.

use std::collections::BTreeSet;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};

/// Returns whether a font dictionary describes a single-byte font.
pub(crate) fn is_simple_font(font: &Dictionary) -> bool {
    font.get(b"Subtype")
        .and_then(Object::as_name)
        .map_or(false, |subtype| subtype != b"Type0")
}

/// Rewrites two-byte codes under simple fonts to single bytes.
///
/// Returns the input unchanged when no string needed rewriting.
pub fn narrow_simple_font_text(pdf_bytes: &[u8]) -> Result<Vec<u8>, lopdf::Error> {
    let mut document = Document::load_mem(pdf_bytes)?;
    let pages: Vec<ObjectId> = document.get_pages().into_values().collect();
    let mut changed = false;

    for page_id in pages {
        let simple_fonts: BTreeSet<Vec<u8>> = document
            .get_page_fonts(page_id)
            .into_iter()
            .filter(|(_, font)| is_simple_font(font))
            .map(|(name, _)| name)
            .collect();
        if simple_fonts.is_empty() {
            continue;
        }

        let mut content = Content::decode(&document.get_page_content(page_id)?)?;
        if narrow_operations(&mut content.operations, &simple_fonts) {
            document.change_page_content(page_id, content.encode()?)?;
            changed = true;
        }
    }

    if !changed {
        return Ok(pdf_bytes.to_vec());
    }

    document.compress();
    let mut buffer = Vec::new();
    document.save_to(&mut buffer)?;
    Ok(buffer)
}

fn narrow_operations(operations: &mut [Operation], simple_fonts: &BTreeSet<Vec<u8>>) -> bool {
    let mut in_simple_font = false;
    let mut changed = false;

    for operation in operations.iter_mut() {
        match operation.operator.as_str() {
            "Tf" => {
                in_simple_font = operation
                    .operands
                    .first()
                    .and_then(|name| name.as_name().ok())
                    .map_or(false, |name| simple_fonts.contains(name));
            }
            "Tj" | "TJ" | "'" | "\"" if in_simple_font => {
                for operand in &mut operation.operands {
                    changed |= narrow_object(operand);
                }
            }
            _ => {}
        }
    }

    changed
}

fn narrow_object(object: &mut Object) -> bool {
    match object {
        Object::String(bytes, _) => match narrow_codes(bytes) {
            Some(narrowed) => {
                *bytes = narrowed;
                true
            }
            None => false,
        },
        Object::Array(items) => items
            .iter_mut()
            .fold(false, |changed, item| narrow_object(item) | changed),
        _ => false,
    }
}

/// Collapses `00 xx` pairs to `xx`; anything else is left alone.
fn narrow_codes(bytes: &[u8]) -> Option<Vec<u8>> {
    if bytes.is_empty() || bytes.len() % 2 != 0 {
        return None;
    }
    if !bytes.chunks_exact(2).all(|pair| pair[0] == 0) {
        return None;
    }
    Some(bytes.chunks_exact(2).map(|pair| pair[1]).collect())
}

#[cfg(test)]
mod tests {
    use super::{is_simple_font, narrow_codes, narrow_operations};
    use lopdf::content::Operation;
    use lopdf::{Dictionary, Object, StringFormat};
    use std::collections::BTreeSet;

    fn hex(bytes: &[u8]) -> Object {
        Object::String(bytes.to_vec(), StringFormat::Hexadecimal)
    }

    fn strings(operation: &Operation) -> Vec<Vec<u8>> {
        fn collect(object: &Object, out: &mut Vec<Vec<u8>>) {
            match object {
                Object::String(bytes, _) => out.push(bytes.clone()),
                Object::Array(items) => items.iter().for_each(|item| collect(item, out)),
                _ => {}
            }
        }
        let mut out = Vec::new();
        operation.operands.iter().for_each(|operand| collect(operand, &mut out));
        out
    }

    fn font_selection(name: &str) -> Operation {
        Operation::new("Tf", vec![Object::Name(name.into()), Object::Integer(12)])
    }

    #[test]
    fn wide_ascii_codes_collapse() {
        assert_eq!(narrow_codes(&[0, b'O', 0, b'K']), Some(b"OK".to_vec()));
        assert_eq!(narrow_codes(b"OK"), None);
        assert_eq!(narrow_codes(&[0, b'O', 0]), None);
        assert_eq!(narrow_codes(&[]), None);
    }

    #[test]
    fn only_strings_under_simple_fonts_change() {
        let simple: BTreeSet<Vec<u8>> = [b"Helvetica".to_vec()].into_iter().collect();
        let mut operations = vec![
            font_selection("Helvetica"),
            Operation::new(
                "TJ",
                vec![Object::Array(vec![
                    hex(&[0, b'1', 0, b'.']),
                    Object::Integer(-20),
                    hex(&[0, b' ']),
                ])],
            ),
            font_selection("F1"),
            Operation::new("TJ", vec![Object::Array(vec![hex(&[0, 0x24])])]),
        ];

        assert!(narrow_operations(&mut operations, &simple));
        assert_eq!(strings(&operations[1]), vec![b"1.".to_vec(), b" ".to_vec()]);
        assert_eq!(strings(&operations[3]), vec![vec![0, 0x24]]);
    }

    #[test]
    fn type0_fonts_are_not_simple() {
        let mut type1 = Dictionary::new();
        type1.set("Subtype", Object::Name(b"Type1".to_vec()));
        let mut type0 = Dictionary::new();
        type0.set("Subtype", Object::Name(b"Type0".to_vec()));

        assert!(is_simple_font(&type1));
        assert!(!is_simple_font(&type0));
        assert!(!is_simple_font(&Dictionary::new()));
    }
}
