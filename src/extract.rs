//! PDF text extraction.

use tracing::debug;

use crate::document::UploadedDocument;
use crate::error::{RagError, Result};

/// PDF files begin with this header regardless of version.
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Return true if the upload declares itself as a PDF by filename extension
/// or content type.
fn declares_pdf(upload: &UploadedDocument) -> bool {
    upload.filename.to_lowercase().ends_with(".pdf")
        || upload.content_type.eq_ignore_ascii_case("application/pdf")
}

/// Extract the full text of an uploaded PDF, pages concatenated in order.
///
/// # Errors
///
/// Returns [`RagError::UnsupportedFormatError`] if the upload is not declared
/// as a PDF, lacks the `%PDF-` header, or cannot be parsed as a PDF.
/// Returns [`RagError::ExtractionError`] if a page's text cannot be decoded.
pub fn extract_pdf_text(upload: &UploadedDocument) -> Result<String> {
    if !declares_pdf(upload) {
        return Err(RagError::UnsupportedFormatError(format!(
            "'{}' is not a PDF (content type '{}')",
            upload.filename, upload.content_type
        )));
    }

    if !upload.bytes.starts_with(PDF_MAGIC) {
        return Err(RagError::UnsupportedFormatError(format!(
            "'{}' does not have a valid PDF header",
            upload.filename
        )));
    }

    let pdf = lopdf::Document::load_mem(&upload.bytes).map_err(|e| {
        RagError::UnsupportedFormatError(format!("failed to parse '{}': {e}", upload.filename))
    })?;

    let page_numbers: Vec<u32> = pdf.get_pages().keys().copied().collect();
    debug!(filename = %upload.filename, pages = page_numbers.len(), "extracting PDF text");

    let mut pages = Vec::with_capacity(page_numbers.len());
    for page in page_numbers {
        let text = pdf.extract_text(&[page]).map_err(|e| {
            RagError::ExtractionError(format!(
                "failed to extract text from page {page} of '{}': {e}",
                upload.filename
            ))
        })?;
        pages.push(text);
    }

    Ok(pages.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_pdf_filename_and_content_type() {
        let upload = UploadedDocument::new("notes.txt", "text/plain", b"hello".to_vec());
        let err = extract_pdf_text(&upload).unwrap_err();
        assert!(matches!(err, RagError::UnsupportedFormatError(_)));
    }

    #[test]
    fn rejects_renamed_text_file_with_bad_header() {
        let upload =
            UploadedDocument::new("notes.pdf", "application/pdf", b"just some text".to_vec());
        let err = extract_pdf_text(&upload).unwrap_err();
        assert!(matches!(err, RagError::UnsupportedFormatError(_)));
    }

    #[test]
    fn rejects_truncated_pdf_bytes() {
        let upload = UploadedDocument::new("doc.pdf", "application/pdf", b"%PDF-1.5".to_vec());
        let err = extract_pdf_text(&upload).unwrap_err();
        assert!(matches!(err, RagError::UnsupportedFormatError(_)));
    }
}
