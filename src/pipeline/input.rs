//! Input value and strategy routing.
//!
//! Routing keys on the declared MIME type first and falls back to extension
//! sniffing on the filename, matching what browsers and upload libraries
//! actually send: a correct `Content-Type` most of the time, and
//! `application/octet-stream` plus a well-named file the rest of it.

use serde::{Deserialize, Serialize};

/// The PDF MIME type.
pub const PDF_MIME: &str = "application/pdf";

/// Raster extensions accepted when the MIME type does not already decide.
pub const RASTER_EXTENSIONS: [&str; 8] =
    ["png", "jpg", "jpeg", "gif", "bmp", "tiff", "tif", "webp"];

/// One document submitted for parsing. Immutable for the duration of a call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInput {
    /// Raw document bytes.
    pub bytes: Vec<u8>,
    /// Original filename; used only for extension sniffing and log context.
    pub filename: String,
    /// Declared MIME type.
    pub content_type: String,
}

impl DocumentInput {
    pub fn new(
        bytes: Vec<u8>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            bytes,
            filename: filename.into(),
            content_type: content_type.into(),
        }
    }

    /// Which extraction strategy applies, if any.
    ///
    /// The PDF check runs first, so a `.pdf` filename with an `image/*`
    /// content type routes to PDF extraction.
    pub fn kind(&self) -> Option<DocumentKind> {
        let filename = self.filename.to_ascii_lowercase();
        if self.content_type == PDF_MIME || filename.ends_with(".pdf") {
            return Some(DocumentKind::Pdf);
        }
        let has_raster_extension = RASTER_EXTENSIONS
            .iter()
            .any(|ext| filename.ends_with(&format!(".{ext}")));
        if self.content_type.starts_with("image/") || has_raster_extension {
            return Some(DocumentKind::Image);
        }
        None
    }
}

/// Extraction strategy selected by [`DocumentInput::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Direct text-layer extraction.
    Pdf,
    /// Vision-model-assisted transcription.
    Image,
}
