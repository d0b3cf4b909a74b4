//! Word documents: paragraph text from `word/document.xml`.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use super::Result;
use crate::error::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";

fn parse_error(reason: impl ToString) -> ExtractionError {
    ExtractionError::Parse {
        format: "docx",
        reason: reason.to_string(),
    }
}

/// Paragraphs of the main document body, one per line.
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(parse_error)?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| parse_error(format!("{DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(parse_error)?;

    paragraphs(&xml).map(|paragraphs| paragraphs.join("\n"))
}

fn paragraphs(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event().map_err(parse_error)? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" | b"w:cr" => current.push('\n'),
                b"w:p" => paragraphs.push(String::new()),
                _ => {}
            },
            Event::Text(e) if in_text => current.push_str(&e.unescape().map_err(parse_error)?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn docx(document_xml: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file(DOCUMENT_PART, SimpleFileOptions::default()).unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_paragraphs_joined_by_newline() {
        let xml = r#"<w:document><w:body>
            <w:p><w:r><w:t>Invoice Number: </w:t></w:r><w:r><w:t>A1B2</w:t></w:r></w:p>
            <w:p/>
            <w:p><w:r><w:t>Total &amp; Due</w:t><w:tab/><w:t>$5.00</w:t></w:r></w:p>
        </w:body></w:document>"#;

        let text = extract_text(&docx(xml)).unwrap();
        assert_eq!(text, "Invoice Number: A1B2\n\nTotal & Due\t$5.00");
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(
            extract_text(b"plain bytes"),
            Err(ExtractionError::Parse { format: "docx", .. })
        ));
    }

    #[test]
    fn test_missing_document_part() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file("other.xml", SimpleFileOptions::default()).unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        assert!(extract_text(&bytes).is_err());
    }
}
