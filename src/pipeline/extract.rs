//! PDF text-layer extraction.
//!
//! `pdf-extract` walks the page tree and concatenates the text layer of
//! every page in page order. There is no OCR fallback: a scanned PDF with a
//! blank text layer is legitimate "no extractable text", reported as
//! [`Extraction::Empty`].
//!
//! This stage never errors past its boundary. A library failure (corrupt
//! xref, unsupported encoding) is logged and reported as
//! [`Extraction::Failed`] so the orchestrator can fold it into the envelope;
//! the distinction between "no text" and "extractor broke" stays explicit
//! instead of both collapsing into an empty string.

use crate::pipeline::input::DocumentInput;
use tracing::{debug, warn};

/// Extracted text plus its byte length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub byte_len: usize,
}

impl ExtractedText {
    pub fn new(text: String) -> Self {
        let byte_len = text.len();
        Self { text, byte_len }
    }
}

/// Tagged outcome of a text-extraction strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// A strategy applied and produced non-empty text.
    Text(ExtractedText),
    /// A strategy applied but the document carries no extractable text.
    Empty,
    /// The extraction backend or model call failed; the cause is logged and
    /// carried for the envelope's error message.
    Failed { detail: String },
}

impl Extraction {
    /// Wrap `text`, mapping whitespace-only output to [`Extraction::Empty`].
    pub fn from_text(text: String) -> Self {
        if text.trim().is_empty() {
            Extraction::Empty
        } else {
            Extraction::Text(ExtractedText::new(text))
        }
    }
}

/// Extract the concatenated text layer of a PDF document.
pub fn pdf_text(input: &DocumentInput) -> Extraction {
    match pdf_extract::extract_text_from_mem(&input.bytes) {
        Ok(text) => {
            debug!(
                filename = %input.filename,
                chars = text.chars().count(),
                "extracted PDF text layer"
            );
            Extraction::from_text(text)
        }
        Err(e) => {
            warn!(filename = %input.filename, error = %e, "PDF text extraction failed");
            Extraction::Failed {
                detail: e.to_string(),
            }
        }
    }
}
