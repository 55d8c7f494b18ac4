//! Vision-model-assisted image transcription.
//!
//! Raster receipts have no text layer to read, so the image is base64-encoded
//! and sent to the vision model with a fixed transcription instruction. Low
//! temperature and a generous output cap favour a faithful, complete
//! transcription over a creative one.
//!
//! Like the PDF path, this stage never errors past its boundary: a transport
//! failure is logged and reported as [`Extraction::Failed`]. A reply without
//! the expected chat shape yields the [`NO_TRANSCRIPTION_SENTINEL`] string as
//! extracted text — the pipeline proceeds and the structuring stage decides
//! what to make of it.

use crate::client::{ContentBlock, InferenceConfig, ModelClient, ModelRequest};
use crate::config::ParserConfig;
use crate::pipeline::extract::Extraction;
use crate::pipeline::input::DocumentInput;
use crate::prompts::DEFAULT_TRANSCRIPTION_PROMPT;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::sync::Arc;
use tracing::{debug, warn};

/// Returned as the transcription when the model reply has no text segment.
pub const NO_TRANSCRIPTION_SENTINEL: &str = "Could not extract text from image";

/// Raster format tag used when neither the MIME subtype nor the magic bytes
/// identify the image.
const DEFAULT_IMAGE_FORMAT: &str = "png";

/// Transcribe a raster image via the vision model.
pub async fn transcribe_image(
    client: &Arc<dyn ModelClient>,
    input: &DocumentInput,
    config: &ParserConfig,
) -> Extraction {
    let encoded = STANDARD.encode(&input.bytes);
    let format = image_format(input);
    debug!(
        filename = %input.filename,
        format,
        base64_len = encoded.len(),
        "transcribing image"
    );

    let prompt = config
        .transcription_prompt
        .as_deref()
        .unwrap_or(DEFAULT_TRANSCRIPTION_PROMPT);

    let request = ModelRequest::user(
        vec![
            ContentBlock::text(prompt),
            ContentBlock::image(format, encoded),
        ],
        InferenceConfig {
            max_tokens: config.transcription_max_tokens,
            temperature: config.temperature,
        },
    );

    let reply = match client.invoke(&request).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(filename = %input.filename, error = %e, "vision transcription failed");
            return Extraction::Failed {
                detail: e.to_string(),
            };
        }
    };

    match reply.first_text() {
        Some(text) => Extraction::from_text(text.to_string()),
        None => {
            warn!(filename = %input.filename, "unexpected vision reply shape");
            Extraction::from_text(NO_TRANSCRIPTION_SENTINEL.to_string())
        }
    }
}

/// Resolve the raster format tag for the image payload.
///
/// The MIME subtype decides when present (`jpg`/`tif` aliases normalised);
/// otherwise the magic bytes are sniffed, and `png` is the final default.
fn image_format(input: &DocumentInput) -> &'static str {
    match input.content_type.split_once('/').map(|(_, sub)| sub) {
        Some("png") => "png",
        Some("jpeg") | Some("jpg") => "jpeg",
        Some("gif") => "gif",
        Some("bmp") => "bmp",
        Some("tiff") | Some("tif") => "tiff",
        Some("webp") => "webp",
        _ => sniff_format(&input.bytes),
    }
}

/// Sniff the raster format from magic bytes, defaulting to `png`.
fn sniff_format(bytes: &[u8]) -> &'static str {
    use image::ImageFormat;
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => "png",
        Ok(ImageFormat::Jpeg) => "jpeg",
        Ok(ImageFormat::Gif) => "gif",
        Ok(ImageFormat::Bmp) => "bmp",
        Ok(ImageFormat::Tiff) => "tiff",
        Ok(ImageFormat::WebP) => "webp",
        _ => DEFAULT_IMAGE_FORMAT,
    }
}
