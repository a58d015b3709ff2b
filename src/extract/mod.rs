use std::fmt;

use lopdf::Document;

/// Marker rendered for files the extractor does not understand. This is a
/// data value, not an error, and renders exactly like extracted text.
pub const UNSUPPORTED_MARKER: &str = "Unsupported file type";

/// Error returned when a supported file cannot be decoded.
#[derive(Debug)]
pub enum ExtractError {
    /// The byte stream is not a parseable PDF document.
    UnreadablePdf(String),
    /// A `.txt` upload contained invalid UTF-8.
    InvalidText(String),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::UnreadablePdf(detail) => write!(f, "unreadable PDF: {detail}"),
            ExtractError::InvalidText(detail) => write!(f, "invalid UTF-8 text: {detail}"),
        }
    }
}

impl std::error::Error for ExtractError {}

/// Upload content type, resolved once per upload from the filename and then
/// matched exhaustively.
///
/// Dispatch is a case-sensitive exact suffix match: `.PDF` and `.TXT` are
/// deliberately unsupported, matching the original service's behavior.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
    Unsupported,
}

impl DocumentKind {
    pub fn from_filename(filename: &str) -> Self {
        if filename.ends_with(".pdf") {
            DocumentKind::Pdf
        } else if filename.ends_with(".txt") {
            DocumentKind::PlainText
        } else {
            DocumentKind::Unsupported
        }
    }
}

/// Extract the text content of an uploaded file.
///
/// PDF pages are concatenated with newline separators in page order; a page
/// with no extractable text contributes an empty segment. Plain text is
/// decoded as UTF-8 verbatim. Everything else yields [`UNSUPPORTED_MARKER`].
///
/// No size limit is enforced here; memory use is proportional to the upload.
pub fn extract(filename: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    match DocumentKind::from_filename(filename) {
        DocumentKind::Pdf => extract_pdf(bytes),
        DocumentKind::PlainText => String::from_utf8(bytes.to_vec())
            .map_err(|err| ExtractError::InvalidText(err.to_string())),
        DocumentKind::Unsupported => Ok(UNSUPPORTED_MARKER.to_string()),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    let doc =
        Document::load_mem(bytes).map_err(|err| ExtractError::UnreadablePdf(err.to_string()))?;

    // get_pages keys are 1-based page numbers; the BTreeMap iterates them in
    // ascending order, which is encounter order for the document.
    let segments: Vec<String> = doc
        .get_pages()
        .keys()
        .map(|page_number| {
            doc.extract_text(&[*page_number])
                .map(|text| text.trim_end_matches('\n').to_string())
                .unwrap_or_default()
        })
        .collect();

    Ok(segments.join("\n"))
}
