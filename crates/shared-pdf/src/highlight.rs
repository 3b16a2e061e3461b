//! Clause highlight annotation
//!
//! Walks each page's content stream, finds matched clause occurrences in
//! the text-showing operators, and adds yellow Highlight annotations over
//! them. lopdf exposes no glyph metrics, so positions come from tracking
//! the text cursor and estimating advance widths; the result lands on the
//! cited text closely enough for review, and the original page content is
//! never modified.

use std::path::Path;

use clause_engine::clause_pattern;
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use regex::Regex;
use shared_types::MatchSet;
use tracing::{info, warn};

use crate::error::PdfError;

/// Estimated glyph advance as a fraction of the font size.
const GLYPH_ADVANCE_EM: f64 = 0.5;

/// Font size assumed when no `Tf` has been seen yet.
const DEFAULT_FONT_SIZE: f64 = 12.0;

#[derive(Debug, Clone, Copy)]
struct Rect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

/// Write a copy of the PDF with every occurrence of every matched clause
/// highlighted. Page-level failures are logged and skipped; the copy is
/// still produced.
pub fn highlight_pdf(input: &Path, output: &Path, found: &MatchSet) -> Result<(), PdfError> {
    let mut doc = Document::load(input).map_err(|e| PdfError::Parse(e.to_string()))?;

    if !found.is_empty() {
        let identifiers: Vec<&str> = found.iter().collect();
        let pattern = clause_pattern(&identifiers)?;

        let pages: Vec<(u32, ObjectId)> = doc.get_pages().into_iter().collect();
        let mut total = 0usize;
        for (page_num, page_id) in pages {
            let rects = match find_match_rects(&doc, page_id, &pattern) {
                Ok(rects) => rects,
                Err(e) => {
                    warn!(page = page_num, error = %e, "skipped page during highlighting");
                    continue;
                }
            };
            for rect in rects {
                let annot_id = doc.add_object(Object::Dictionary(highlight_annotation(&rect)));
                add_annotation_to_page(&mut doc, page_id, annot_id)?;
                total += 1;
            }
        }
        info!(annotations = total, "added clause highlights");
    }

    doc.save(output)
        .map_err(|e| PdfError::Operation(e.to_string()))?;
    Ok(())
}

/// Track the text cursor through one page's content stream and collect an
/// approximate rect for every pattern match inside a text-showing operator.
fn find_match_rects(
    doc: &Document,
    page_id: ObjectId,
    pattern: &Regex,
) -> Result<Vec<Rect>, PdfError> {
    let content_bytes = doc
        .get_page_content(page_id)
        .map_err(|e| PdfError::Operation(e.to_string()))?;
    let content = Content::decode(&content_bytes).map_err(|e| PdfError::Parse(e.to_string()))?;

    let mut rects = Vec::new();
    let mut x = 0.0_f64;
    let mut y = 0.0_f64;
    let mut font_size = DEFAULT_FONT_SIZE;
    let mut leading = 0.0_f64;

    for op in &content.operations {
        match op.operator.as_str() {
            "BT" => {
                x = 0.0;
                y = 0.0;
            }
            "Tm" => {
                if op.operands.len() == 6 {
                    if let (Some(e), Some(f)) = (number(&op.operands[4]), number(&op.operands[5])) {
                        x = e;
                        y = f;
                    }
                }
            }
            "Td" | "TD" => {
                if op.operands.len() == 2 {
                    if let (Some(tx), Some(ty)) = (number(&op.operands[0]), number(&op.operands[1]))
                    {
                        x += tx;
                        y += ty;
                        if op.operator == "TD" {
                            leading = -ty;
                        }
                    }
                }
            }
            "TL" => {
                if let Some(l) = op.operands.first().and_then(number) {
                    leading = l;
                }
            }
            "T*" => {
                y -= leading;
            }
            "Tf" => {
                if let Some(size) = op.operands.get(1).and_then(number) {
                    font_size = size;
                }
            }
            "Tj" | "'" => {
                if op.operator == "'" {
                    y -= leading;
                }
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    let text = decode_simple_string(bytes);
                    collect_rects(&text, pattern, x, y, font_size, &mut rects);
                    x += text.chars().count() as f64 * font_size * GLYPH_ADVANCE_EM;
                }
            }
            "TJ" => {
                if let Some(Object::Array(parts)) = op.operands.first() {
                    // Concatenate the string parts; kerning adjustments are
                    // small relative to the advance estimate
                    let text: String = parts
                        .iter()
                        .filter_map(|part| match part {
                            Object::String(bytes, _) => Some(decode_simple_string(bytes)),
                            _ => None,
                        })
                        .collect();
                    collect_rects(&text, pattern, x, y, font_size, &mut rects);
                    x += text.chars().count() as f64 * font_size * GLYPH_ADVANCE_EM;
                }
            }
            _ => {}
        }
    }
    Ok(rects)
}

fn collect_rects(
    text: &str,
    pattern: &Regex,
    x: f64,
    y: f64,
    font_size: f64,
    rects: &mut Vec<Rect>,
) {
    let advance = font_size * GLYPH_ADVANCE_EM;
    for m in pattern.find_iter(text) {
        let chars_before = text[..m.start()].chars().count() as f64;
        let chars_matched = m.as_str().chars().count() as f64;
        rects.push(Rect {
            x: x + chars_before * advance,
            y,
            width: chars_matched * advance,
            height: font_size,
        });
    }
}

/// Decode PDF string bytes as a simple single-byte encoding. Text written
/// with CID/composite fonts will not round-trip to a matchable string and
/// simply produces no highlight on that operator.
fn decode_simple_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

fn highlight_annotation(rect: &Rect) -> Dictionary {
    let mut annot = Dictionary::new();
    annot.set("Type", Object::Name(b"Annot".to_vec()));
    annot.set("Subtype", Object::Name(b"Highlight".to_vec()));
    annot.set(
        "Rect",
        Object::Array(vec![
            Object::Real(rect.x as f32),
            Object::Real(rect.y as f32),
            Object::Real((rect.x + rect.width) as f32),
            Object::Real((rect.y + rect.height) as f32),
        ]),
    );
    // QuadPoints for highlight
    annot.set(
        "QuadPoints",
        Object::Array(vec![
            Object::Real(rect.x as f32),
            Object::Real((rect.y + rect.height) as f32),
            Object::Real((rect.x + rect.width) as f32),
            Object::Real((rect.y + rect.height) as f32),
            Object::Real(rect.x as f32),
            Object::Real(rect.y as f32),
            Object::Real((rect.x + rect.width) as f32),
            Object::Real(rect.y as f32),
        ]),
    );
    annot.set("CA", Object::Real(0.5));
    // Yellow
    annot.set(
        "C",
        Object::Array(vec![
            Object::Real(1.0),
            Object::Real(1.0),
            Object::Real(0.0),
        ]),
    );
    annot
}

fn add_annotation_to_page(
    doc: &mut Document,
    page_id: ObjectId,
    annot_id: ObjectId,
) -> Result<(), PdfError> {
    let page = doc
        .get_object_mut(page_id)
        .map_err(|e| PdfError::Operation(e.to_string()))?;

    if let Object::Dictionary(ref mut page_dict) = page {
        if let Ok(Object::Array(ref mut arr)) = page_dict.get_mut(b"Annots") {
            arr.push(Object::Reference(annot_id));
        } else {
            page_dict.set("Annots", Object::Array(vec![Object::Reference(annot_id)]));
        }
    }
    Ok(())
}
