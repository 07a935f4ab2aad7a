//! Text extraction for binary source documents (PDF, DOCX).
//!
//! The loader hands over raw bytes plus a [`DocumentKind`]; this module
//! returns plain UTF-8 text. Plain text and markdown are decoded lossily.
//! Failures are typed so the loader can log them and degrade to empty text.

use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Maximum decompressed bytes read from a single ZIP entry (zip-bomb guard).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

const DOCX_BODY: &str = "word/document.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Text,
    Markdown,
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Kind by file extension, case-insensitive. `None` for anything the
    /// pipeline cannot read.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" => Some(DocumentKind::Text),
            "md" | "markdown" => Some(DocumentKind::Markdown),
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("DOCX extraction failed: {0}")]
    Docx(String),
}

/// Turns document bytes into text. Implementations must not panic on
/// malformed input.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8], kind: DocumentKind) -> Result<String, ExtractError>;
}

/// `pdf-extract` for PDF, `zip` + `quick-xml` for DOCX.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultExtractor;

impl TextExtractor for DefaultExtractor {
    fn extract(&self, bytes: &[u8], kind: DocumentKind) -> Result<String, ExtractError> {
        match kind {
            DocumentKind::Text | DocumentKind::Markdown => {
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
            DocumentKind::Pdf => extract_pdf(bytes),
            DocumentKind::Docx => extract_docx(bytes),
        }
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    // pdf-extract panics on some malformed fonts and streams.
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(result) => result.map_err(|e| ExtractError::Pdf(e.to_string())),
        Err(_) => Err(ExtractError::Pdf("parser panicked".to_string())),
    }
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    let entry = archive
        .by_name(DOCX_BODY)
        .map_err(|_| ExtractError::Docx(format!("{} not found", DOCX_BODY)))?;

    let mut xml = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut xml)
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    if xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(ExtractError::Docx(format!(
            "{} exceeds size limit ({} bytes)",
            DOCX_BODY, MAX_XML_ENTRY_BYTES
        )));
    }
    docx_paragraphs(&xml)
}

/// Collects `w:t` runs, one line per `w:p` paragraph.
fn docx_paragraphs(xml: &[u8]) -> Result<String, ExtractError> {
    use quick_xml::events::Event;

    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => lines.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => current.push('\t'),
                b"br" => lines.push(std::mem::take(&mut current)),
                b"p" => lines.push(String::new()),
                _ => {}
            },
            Ok(Event::Text(te)) if in_text => {
                let text = te.unescape().map_err(|e| ExtractError::Docx(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Docx(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    if !current.is_empty() {
        lines.push(current);
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_extension() {
        assert_eq!(
            DocumentKind::from_path(Path::new("a/B.MD")),
            Some(DocumentKind::Markdown)
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("x.docx")),
            Some(DocumentKind::Docx)
        );
        assert_eq!(DocumentKind::from_path(Path::new("x.rtf")), None);
        assert_eq!(DocumentKind::from_path(Path::new("README")), None);
    }

    #[test]
    fn plain_text_is_lossy_utf8() {
        let text = DefaultExtractor
            .extract(b"hello \xff world", DocumentKind::Text)
            .unwrap();
        assert!(text.starts_with("hello "));
        assert!(text.ends_with(" world"));
    }

    #[test]
    fn invalid_pdf_returns_error() {
        let err = DefaultExtractor
            .extract(b"not a pdf", DocumentKind::Pdf)
            .unwrap_err();
        assert!(matches!(err, ExtractError::Pdf(_)));
    }

    #[test]
    fn invalid_zip_returns_error_for_docx() {
        let err = DefaultExtractor
            .extract(b"not a zip", DocumentKind::Docx)
            .unwrap_err();
        assert!(matches!(err, ExtractError::Docx(_)));
    }

    #[test]
    fn paragraphs_become_lines() {
        let xml = br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:p><w:r><w:t>Part 1 Intro</w:t></w:r></w:p>
<w:p><w:r><w:t xml:space="preserve">Hello </w:t></w:r><w:r><w:t>world &amp; more</w:t></w:r></w:p>
<w:p/>
<w:p><w:r><w:t>Part 2 Next</w:t></w:r></w:p>
</w:body></w:document>"#;
        let text = docx_paragraphs(xml).unwrap();
        assert_eq!(text, "Part 1 Intro\nHello world & more\n\nPart 2 Next");
    }
}
