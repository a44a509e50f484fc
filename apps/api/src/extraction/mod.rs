//! Resume text extraction for uploaded documents.
//!
//! Two formats are recognized by their declared media type: PDF (text per page, joined
//! with nothing) and DOCX (text per paragraph, joined with newlines). Everything else is
//! rejected before any parsing happens.

use bytes::Bytes;
use thiserror::Error;

mod docx;
mod pdf;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";
pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type '{0}'. Please upload a PDF or DOCX.")]
    UnsupportedFormat(String),

    #[error("Could not read {kind} document: {reason}")]
    Unreadable { kind: DocumentKind, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Unsupported,
}

impl DocumentKind {
    /// Classifies a declared media type. Parameters such as `; charset=` are ignored.
    pub fn from_media_type(media_type: &str) -> Self {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            PDF_MEDIA_TYPE => DocumentKind::Pdf,
            DOCX_MEDIA_TYPE => DocumentKind::Docx,
            _ => DocumentKind::Unsupported,
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::Docx => "DOCX",
            DocumentKind::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

/// A file as received from the client. Consumed once by [`extract`].
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub content: Bytes,
    pub media_type: String,
}

impl UploadedDocument {
    pub fn new(content: impl Into<Bytes>, media_type: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            media_type: media_type.into(),
        }
    }

    pub fn kind(&self) -> DocumentKind {
        DocumentKind::from_media_type(&self.media_type)
    }
}

/// Produces the plain text of `document`.
///
/// An empty string is a valid result: the document parsed but carried no text.
pub fn extract(document: &UploadedDocument) -> Result<String, ExtractionError> {
    match document.kind() {
        DocumentKind::Pdf => pdf::extract_pages(&document.content),
        DocumentKind::Docx => docx::extract_paragraphs(&document.content),
        DocumentKind::Unsupported => Err(ExtractionError::UnsupportedFormat(
            document.media_type.clone(),
        )),
    }
}
