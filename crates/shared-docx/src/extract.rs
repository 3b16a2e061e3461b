//! DOCX text extraction

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;
use zip::ZipArchive;

use crate::error::DocxError;
use crate::DOCUMENT_PART;

/// Extract the document's plain text, one line per paragraph. Tab and
/// break elements inside runs come through as `\t` / `\n`, keeping token
/// boundaries intact for matching.
///
/// Walking `document.xml` in order visits table-cell paragraphs (and nested
/// tables) along with body paragraphs, so text hidden inside tables is
/// searched like everything else.
pub fn extract_text(path: &Path) -> Result<String, DocxError> {
    let xml = read_document_xml(path)?;
    let text = document_text(&xml)?;
    debug!(chars = text.len(), path = %path.display(), "extracted DOCX text");
    Ok(text)
}

pub(crate) fn read_document_xml(path: &Path) -> Result<String, DocxError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;
    let mut entry = archive
        .by_name(DOCUMENT_PART)
        .map_err(|_| DocxError::MissingDocumentPart)?;
    let mut xml = String::new();
    entry.read_to_string(&mut xml)?;
    Ok(xml)
}

fn document_text(xml: &str) -> Result<String, DocxError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut in_text = false;
    let mut in_ppr = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:t" => in_text = true,
                b"w:pPr" => in_ppr = true,
                // w:tab under w:pPr is a tab-stop definition, not content
                b"w:tab" if !in_ppr => text.push('\t'),
                b"w:br" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" if !in_ppr => text.push('\t'),
                b"w:br" => text.push('\n'),
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:pPr" => in_ppr = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let piece = e.unescape().map_err(|e| DocxError::Xml(e.to_string()))?;
                text.push_str(&piece);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(DocxError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::tests::build_docx;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extracts_body_and_table_paragraphs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sol.docx");
        std::fs::write(
            &path,
            build_docx(
                r#"<w:body><w:p><w:r><w:t>first paragraph</w:t></w:r></w:p><w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell text</w:t></w:r></w:p></w:tc></w:tr></w:tbl></w:body>"#,
            ),
        )
        .unwrap();

        let text = extract_text(&path).unwrap();
        assert_eq!(text, "first paragraph\ncell text\n");
    }

    #[test]
    fn test_split_runs_concatenate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sol.docx");
        std::fs::write(
            &path,
            build_docx(
                r#"<w:body><w:p><w:r><w:t>per clause </w:t></w:r><w:r><w:t>52.212-4</w:t></w:r></w:p></w:body>"#,
            ),
        )
        .unwrap();

        let text = extract_text(&path).unwrap();
        assert_eq!(text, "per clause 52.212-4\n");
    }

    #[test]
    fn test_tabs_and_breaks_keep_tokens_separated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sol.docx");
        std::fs::write(
            &path,
            build_docx(
                r#"<w:body><w:p><w:r><w:t>Section C</w:t></w:r><w:r><w:tab/></w:r><w:r><w:t>52.212-4</w:t><w:br/><w:t>applies</w:t></w:r></w:p></w:body>"#,
            ),
        )
        .unwrap();

        let text = extract_text(&path).unwrap();
        assert_eq!(text, "Section C\t52.212-4\napplies\n");
    }

    #[test]
    fn test_entities_are_unescaped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sol.docx");
        std::fs::write(
            &path,
            build_docx(r#"<w:body><w:p><w:r><w:t>Ts &amp; Cs</w:t></w:r></w:p></w:body>"#),
        )
        .unwrap();

        let text = extract_text(&path).unwrap();
        assert_eq!(text, "Ts & Cs\n");
    }

    #[test]
    fn test_missing_document_part() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hollow.docx");
        // A valid ZIP with no word/document.xml
        let cursor = std::io::Cursor::new(Vec::new());
        let mut writer = zip::ZipWriter::new(cursor);
        writer
            .start_file("stub.txt", zip::write::SimpleFileOptions::default())
            .unwrap();
        std::io::Write::write_all(&mut writer, b"empty").unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        std::fs::write(&path, bytes).unwrap();

        assert!(matches!(
            extract_text(&path),
            Err(DocxError::MissingDocumentPart)
        ));
    }
}
