use lopdf::Document;
use tracing::debug;

use super::{DocumentKind, ExtractionError};

/// Concatenates the text of every page in page order.
///
/// A page that fails to decode or carries only whitespace is skipped; it never
/// aborts the rest of the document.
pub(super) fn extract_pages(data: &[u8]) -> Result<String, ExtractionError> {
    let doc = Document::load_mem(data).map_err(|e| ExtractionError::Unreadable {
        kind: DocumentKind::Pdf,
        reason: e.to_string(),
    })?;

    let mut text = String::new();
    for page_number in doc.get_pages().keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(page_text) if !page_text.trim().is_empty() => text.push_str(&page_text),
            Ok(_) => debug!("PDF page {page_number} has no extractable text, skipping"),
            Err(e) => debug!("PDF page {page_number} could not be decoded, skipping: {e}"),
        }
    }

    Ok(text)
}
