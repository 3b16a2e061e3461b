//! DOCX clause highlighting
//!
//! A run-level highlight cannot be spliced into an existing paragraph
//! without re-authoring it, so matched paragraphs are rebuilt run-by-run
//! from the spans the engine derives, while untouched paragraphs (and every
//! other archive entry) are replayed byte-for-byte. Paragraphs carrying
//! structure a rebuild would destroy (drawings, text boxes) are left alone.

use std::fs::File;
use std::io::{Cursor, Write};
use std::path::Path;

use clause_engine::split_highlights;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use shared_types::{HighlightSpan, MatchSet};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::DocxError;
use crate::extract::read_document_xml;
use crate::DOCUMENT_PART;

/// Write a copy of the DOCX with every occurrence of every matched clause
/// rendered as a yellow-highlighted run.
pub fn highlight_docx(input: &Path, output: &Path, found: &MatchSet) -> Result<(), DocxError> {
    let xml = read_document_xml(input)?;
    let rewritten = rewrite_document_xml(&xml, found)?;

    let mut archive = ZipArchive::new(File::open(input)?)?;
    let mut writer = ZipWriter::new(File::create(output)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();
        if entry.is_dir() {
            writer.add_directory(name.as_str(), options)?;
            continue;
        }
        writer.start_file(name.as_str(), options)?;
        if name == DOCUMENT_PART {
            writer.write_all(rewritten.as_bytes())?;
        } else {
            std::io::copy(&mut entry, &mut writer)?;
        }
    }
    writer.finish()?;
    Ok(())
}

/// One buffered `<w:p>` element, start tag through end tag inclusive.
struct ParagraphBuf {
    events: Vec<Event<'static>>,
    depth: usize,
    complex: bool,
}

fn rewrite_document_xml(xml: &str, found: &MatchSet) -> Result<String, DocxError> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut buf = Vec::new();
    let mut para: Option<ParagraphBuf> = None;
    let mut rewritten = 0usize;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| DocxError::Xml(e.to_string()))?;
        match event {
            Event::Eof => break,
            Event::Start(ref e) if e.name().as_ref() == b"w:p" => match para.as_mut() {
                Some(p) => {
                    // A paragraph nested inside a run (text box content);
                    // re-authoring the outer paragraph would destroy it
                    p.depth += 1;
                    p.complex = true;
                    p.events.push(event.into_owned());
                }
                None => {
                    para = Some(ParagraphBuf {
                        events: vec![event.into_owned()],
                        depth: 1,
                        complex: false,
                    });
                }
            },
            Event::End(ref e) if e.name().as_ref() == b"w:p" => {
                let closed = match para.as_mut() {
                    Some(p) if p.depth > 1 => {
                        p.depth -= 1;
                        p.events.push(event.into_owned());
                        false
                    }
                    Some(p) => {
                        p.events.push(event.into_owned());
                        true
                    }
                    None => {
                        writer.write_event(event.into_owned())?;
                        false
                    }
                };
                if closed {
                    if let Some(p) = para.take() {
                        if flush_paragraph(&mut writer, &p, found)? {
                            rewritten += 1;
                        }
                    }
                }
            }
            _ => match para.as_mut() {
                Some(p) => {
                    if let Event::Start(ref e) = event {
                        if matches!(
                            e.name().as_ref(),
                            b"w:drawing" | b"w:pict" | b"w:txbxContent"
                        ) {
                            p.complex = true;
                        }
                    }
                    p.events.push(event.into_owned());
                }
                None => writer.write_event(event.into_owned())?,
            },
        }
        buf.clear();
    }

    // Unclosed paragraph at EOF: replay untouched rather than drop content
    if let Some(p) = para.take() {
        for ev in &p.events {
            writer.write_event(ev.clone())?;
        }
    }

    debug!(paragraphs = rewritten, "rewrote matched paragraphs");
    String::from_utf8(writer.into_inner().into_inner()).map_err(|e| DocxError::Xml(e.to_string()))
}

/// Emit one buffered paragraph: verbatim when untouched or too complex to
/// re-author, otherwise rebuilt as highlight runs. Returns whether the
/// paragraph was rewritten.
fn flush_paragraph(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    para: &ParagraphBuf,
    found: &MatchSet,
) -> Result<bool, DocxError> {
    let spans = if para.complex {
        None
    } else {
        let text = paragraph_text(&para.events)?;
        split_highlights(&text, found)?
    };

    let Some(spans) = spans else {
        for ev in &para.events {
            writer.write_event(ev.clone())?;
        }
        return Ok(false);
    };

    // <w:p> start tag, verbatim
    writer.write_event(para.events[0].clone())?;

    // Paragraph properties block, verbatim
    match para.events.get(1) {
        Some(Event::Empty(e)) if e.name().as_ref() == b"w:pPr" => {
            writer.write_event(para.events[1].clone())?;
        }
        Some(Event::Start(e)) if e.name().as_ref() == b"w:pPr" => {
            let mut depth = 0usize;
            for ev in para.events.iter().skip(1) {
                writer.write_event(ev.clone())?;
                match ev {
                    Event::Start(e) if e.name().as_ref() == b"w:pPr" => depth += 1,
                    Event::End(e) if e.name().as_ref() == b"w:pPr" => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }

    for span in &spans {
        write_run(writer, span)?;
    }
    writer.write_event(Event::End(BytesEnd::new("w:p")))?;
    Ok(true)
}

/// Concatenated text of a buffered paragraph. Tab and break elements are
/// modeled as `\t` / `\n` so a rebuild can emit them back; `w:tab` inside
/// `w:pPr` is a tab-stop definition, not content, and is ignored.
fn paragraph_text(events: &[Event<'static>]) -> Result<String, DocxError> {
    let mut text = String::new();
    let mut in_t = false;
    let mut in_ppr = false;
    for ev in events {
        match ev {
            Event::Start(e) => match e.name().as_ref() {
                b"w:t" => in_t = true,
                b"w:pPr" => in_ppr = true,
                b"w:tab" if !in_ppr => text.push('\t'),
                b"w:br" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" if !in_ppr => text.push('\t'),
                b"w:br" => text.push('\n'),
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_t = false,
                b"w:pPr" => in_ppr = false,
                _ => {}
            },
            Event::Text(e) if in_t => {
                let piece = e.unescape().map_err(|e| DocxError::Xml(e.to_string()))?;
                text.push_str(&piece);
            }
            _ => {}
        }
    }
    Ok(text)
}

fn write_run(writer: &mut Writer<Cursor<Vec<u8>>>, span: &HighlightSpan) -> Result<(), DocxError> {
    writer.write_event(Event::Start(BytesStart::new("w:r")))?;
    if span.is_highlight() {
        writer.write_event(Event::Start(BytesStart::new("w:rPr")))?;
        let mut highlight = BytesStart::new("w:highlight");
        highlight.push_attribute(("w:val", "yellow"));
        writer.write_event(Event::Empty(highlight))?;
        writer.write_event(Event::End(BytesEnd::new("w:rPr")))?;
    }
    // Emit `\t` / `\n` back as the tab/break elements they were read from
    let mut buffered = String::new();
    for ch in span.text.chars() {
        match ch {
            '\t' | '\n' => {
                if !buffered.is_empty() {
                    write_text(writer, &buffered)?;
                    buffered.clear();
                }
                let name = if ch == '\t' { "w:tab" } else { "w:br" };
                writer.write_event(Event::Empty(BytesStart::new(name)))?;
            }
            _ => buffered.push(ch),
        }
    }
    if !buffered.is_empty() {
        write_text(writer, &buffered)?;
    }
    writer.write_event(Event::End(BytesEnd::new("w:r")))?;
    Ok(())
}

fn write_text(writer: &mut Writer<Cursor<Vec<u8>>>, text: &str) -> Result<(), DocxError> {
    let mut t = BytesStart::new("w:t");
    t.push_attribute(("xml:space", "preserve"));
    writer.write_event(Event::Start(t))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new("w:t")))?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Read;

    /// Minimal DOCX archive around the given `<w:body>` markup.
    pub(crate) fn build_docx(body: &str) -> Vec<u8> {
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">{body}</w:document>"#
        );
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer.start_file("[Content_Types].xml", options).unwrap();
        writer
            .write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
            .unwrap();
        writer.start_file(DOCUMENT_PART, options).unwrap();
        writer.write_all(document.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    fn read_part(path: &Path, part: &str) -> String {
        let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut entry = archive.by_name(part).unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        content
    }

    fn set(ids: &[&str]) -> MatchSet {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_matched_paragraphs_gain_highlight_runs() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.docx");
        let output = dir.path().join("out.docx");
        std::fs::write(
            &input,
            build_docx(
                r#"<w:body><w:p><w:r><w:t>per clause 52.212-4 and 52.219-6(a)</w:t></w:r></w:p><w:p><w:r><w:t>no citations here</w:t></w:r></w:p><w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell cites 52.219-6</w:t></w:r></w:p></w:tc></w:tr></w:tbl></w:body>"#,
            ),
        )
        .unwrap();

        highlight_docx(&input, &output, &set(&["52.212-4", "52.219-6"])).unwrap();

        let xml = read_part(&output, DOCUMENT_PART);
        let highlights = xml.matches(r#"<w:highlight w:val="yellow"/>"#).count();
        assert_eq!(highlights, 3); // two in the body paragraph, one in the cell
    }

    #[test]
    fn test_document_text_is_preserved_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.docx");
        let output = dir.path().join("out.docx");
        std::fs::write(
            &input,
            build_docx(
                r#"<w:body><w:p><w:r><w:t>per clause 52.212-4, then more text</w:t></w:r></w:p><w:p><w:r><w:t>untouched paragraph</w:t></w:r></w:p></w:body>"#,
            ),
        )
        .unwrap();

        highlight_docx(&input, &output, &set(&["52.212-4"])).unwrap();

        // Round-trip law at document level: same extracted text before/after
        let before = crate::extract::extract_text(&input).unwrap();
        let after = crate::extract::extract_text(&output).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_untouched_paragraph_replayed_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.docx");
        let output = dir.path().join("out.docx");
        std::fs::write(
            &input,
            build_docx(
                r#"<w:body><w:p><w:pPr><w:jc w:val="both"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t>no citations here</w:t></w:r></w:p></w:body>"#,
            ),
        )
        .unwrap();

        highlight_docx(&input, &output, &set(&["52.212-4"])).unwrap();

        let xml = read_part(&output, DOCUMENT_PART);
        // Original formatting runs survive untouched, including bold marker
        assert!(xml.contains(
            r#"<w:p><w:pPr><w:jc w:val="both"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t>no citations here</w:t></w:r></w:p>"#
        ));
        assert!(!xml.contains("w:highlight"));
    }

    #[test]
    fn test_paragraph_properties_preserved_on_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.docx");
        let output = dir.path().join("out.docx");
        std::fs::write(
            &input,
            build_docx(
                r#"<w:body><w:p><w:pPr><w:jc w:val="both"/></w:pPr><w:r><w:t>see 52.212-4</w:t></w:r></w:p></w:body>"#,
            ),
        )
        .unwrap();

        highlight_docx(&input, &output, &set(&["52.212-4"])).unwrap();

        let xml = read_part(&output, DOCUMENT_PART);
        assert!(xml.contains(r#"<w:pPr><w:jc w:val="both"/></w:pPr>"#));
        assert!(xml.contains(r#"<w:highlight w:val="yellow"/>"#));
        assert!(xml.contains(r#"<w:t xml:space="preserve">see </w:t>"#));
        assert!(xml.contains(r#"<w:t xml:space="preserve">52.212-4</w:t>"#));
    }

    #[test]
    fn test_other_archive_entries_copied_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.docx");
        let output = dir.path().join("out.docx");
        std::fs::write(
            &input,
            build_docx(r#"<w:body><w:p><w:r><w:t>see 52.212-4</w:t></w:r></w:p></w:body>"#),
        )
        .unwrap();

        highlight_docx(&input, &output, &set(&["52.212-4"])).unwrap();

        assert_eq!(
            read_part(&input, "[Content_Types].xml"),
            read_part(&output, "[Content_Types].xml")
        );
    }

    #[test]
    fn test_paragraph_with_drawing_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.docx");
        let output = dir.path().join("out.docx");
        std::fs::write(
            &input,
            build_docx(
                r#"<w:body><w:p><w:r><w:drawing><wp:inline/></w:drawing></w:r><w:r><w:t>see 52.212-4</w:t></w:r></w:p></w:body>"#,
            ),
        )
        .unwrap();

        highlight_docx(&input, &output, &set(&["52.212-4"])).unwrap();

        let xml = read_part(&output, DOCUMENT_PART);
        assert!(xml.contains("<w:drawing>"));
        assert!(!xml.contains("w:highlight"));
    }

    #[test]
    fn test_escaped_text_stays_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.docx");
        let output = dir.path().join("out.docx");
        std::fs::write(
            &input,
            build_docx(
                r#"<w:body><w:p><w:r><w:t>Ts &amp; Cs per 52.212-4</w:t></w:r></w:p></w:body>"#,
            ),
        )
        .unwrap();

        highlight_docx(&input, &output, &set(&["52.212-4"])).unwrap();

        let xml = read_part(&output, DOCUMENT_PART);
        assert!(xml.contains("Ts &amp; Cs per "));
        let text = crate::extract::extract_text(&output).unwrap();
        assert_eq!(text, "Ts & Cs per 52.212-4\n");
    }

    #[test]
    fn test_tab_element_survives_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.docx");
        let output = dir.path().join("out.docx");
        std::fs::write(
            &input,
            build_docx(
                r#"<w:body><w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>see 52.212-4</w:t></w:r><w:r><w:tab/></w:r><w:r><w:t>(applies)</w:t></w:r></w:p></w:body>"#,
            ),
        )
        .unwrap();

        highlight_docx(&input, &output, &set(&["52.212-4"])).unwrap();

        let xml = read_part(&output, DOCUMENT_PART);
        assert!(xml.contains(r#"<w:highlight w:val="yellow"/>"#));
        // The content tab is re-emitted; the tab-stop definition is replayed
        // with the rest of w:pPr and must not leak a second content tab
        assert_eq!(xml.matches("<w:tab/>").count(), 1);
        assert!(xml.contains(r#"<w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs>"#));
        let text = crate::extract::extract_text(&output).unwrap();
        assert_eq!(text, "see 52.212-4\t(applies)\n");
    }

    #[test]
    fn test_break_element_survives_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.docx");
        let output = dir.path().join("out.docx");
        std::fs::write(
            &input,
            build_docx(
                r#"<w:body><w:p><w:r><w:t>52.212-4</w:t><w:br/><w:t>continued below</w:t></w:r></w:p></w:body>"#,
            ),
        )
        .unwrap();

        highlight_docx(&input, &output, &set(&["52.212-4"])).unwrap();

        let xml = read_part(&output, DOCUMENT_PART);
        assert!(xml.contains("<w:br/>"));
        assert!(xml.contains(r#"<w:highlight w:val="yellow"/>"#));
        let text = crate::extract::extract_text(&output).unwrap();
        assert_eq!(text, "52.212-4\ncontinued below\n");
    }

    #[test]
    fn test_no_matches_leaves_document_xml_identical() {
        let body =
            r#"<w:body><w:p><w:pPr><w:jc w:val="left"/></w:pPr><w:r><w:t>plain</w:t></w:r></w:p></w:body>"#;
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.docx");
        let output = dir.path().join("out.docx");
        std::fs::write(&input, build_docx(body)).unwrap();

        highlight_docx(&input, &output, &set(&["52.212-4"])).unwrap();

        assert_eq!(
            read_part(&input, DOCUMENT_PART),
            read_part(&output, DOCUMENT_PART)
        );
    }
}
