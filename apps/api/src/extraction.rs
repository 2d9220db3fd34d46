//! Text extraction: turns an uploaded résumé or JD file into plain text.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

const DOCX_BODY: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported file type '{0}' (expected .pdf, .docx, .txt or .md)")]
    UnsupportedFormat(String),

    #[error("uploaded file is empty")]
    Empty,

    #[error("could not read PDF: {0}")]
    Pdf(String),

    #[error("could not read DOCX: {0}")]
    Docx(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentKind {
    /// Infers the kind from the file extension. A missing extension is treated as text.
    pub fn from_file_name(file_name: &str) -> Result<Self, ExtractionError> {
        let extension = std::path::Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("pdf") => Ok(DocumentKind::Pdf),
            Some("docx") => Ok(DocumentKind::Docx),
            Some("txt") | Some("md") | None => Ok(DocumentKind::PlainText),
            Some(other) => Err(ExtractionError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Extracts plain text from `bytes`. PDF and DOCX parsing is CPU-bound; call from
/// `spawn_blocking`.
pub fn extract_text(file_name: &str, bytes: &[u8]) -> Result<String, ExtractionError> {
    let kind = DocumentKind::from_file_name(file_name)?;
    if bytes.is_empty() {
        return Err(ExtractionError::Empty);
    }

    match kind {
        DocumentKind::Pdf => {
            pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractionError::Pdf(e.to_string()))
        }
        DocumentKind::Docx => extract_docx(bytes),
        DocumentKind::PlainText => Ok(String::from_utf8_lossy(bytes).into_owned()),
    }
}

/// Reads `word/document.xml` from the archive and joins its `<w:t>` runs, one line per
/// paragraph.
fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| ExtractionError::Docx(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| ExtractionError::Docx(format!("{DOCX_BODY}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::Docx(e.to_string()))?;

    document_text(&xml)
}

fn document_text(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        match reader
            .read_event()
            .map_err(|e| ExtractionError::Docx(e.to_string()))?
        {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_run_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_run_text => {
                let run = t
                    .unescape()
                    .map_err(|e| ExtractionError::Docx(e.to_string()))?;
                text.push_str(&run);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;

    use super::*;

    fn docx_with_body(body: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        write!(
            writer,
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        )
        .unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(DocumentKind::from_file_name("cv.PDF").unwrap(), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_file_name("cv.docx").unwrap(), DocumentKind::Docx);
        assert_eq!(DocumentKind::from_file_name("jd.txt").unwrap(), DocumentKind::PlainText);
        assert_eq!(DocumentKind::from_file_name("notes.md").unwrap(), DocumentKind::PlainText);
        assert_eq!(DocumentKind::from_file_name("resume").unwrap(), DocumentKind::PlainText);
    }

    #[test]
    fn test_docx_paragraphs_become_lines() {
        let bytes = docx_with_body(
            r#"<w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p><w:p><w:r><w:t xml:space="preserve">Experienced in </w:t></w:r><w:r><w:t>Python &amp; SQL</w:t></w:r></w:p>"#,
        );
        let text = extract_text("resume.docx", &bytes).unwrap();
        assert_eq!(text, "Jane Doe\nExperienced in Python & SQL");
    }

    #[test]
    fn test_docx_without_document_body_is_an_error() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/styles.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<w:styles/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        assert!(matches!(
            extract_text("resume.docx", &bytes),
            Err(ExtractionError::Docx(_))
        ));
    }

    #[test]
    fn test_non_zip_docx_is_an_error() {
        assert!(matches!(
            extract_text("resume.docx", b"not a zip archive"),
            Err(ExtractionError::Docx(_))
        ));
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let err = extract_text("resume.odt", b"PK\x03\x04").unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFormat(ref ext) if ext == "odt"));
    }

    #[test]
    fn test_plain_text_is_decoded_lossily() {
        let text = extract_text("resume.txt", b"Python \xff SQL").unwrap();
        assert!(text.starts_with("Python"));
        assert!(text.ends_with("SQL"));
    }

    #[test]
    fn test_empty_upload_is_an_error() {
        assert!(matches!(extract_text("resume.txt", b""), Err(ExtractionError::Empty)));
    }
}
