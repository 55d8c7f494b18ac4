//! The pipeline orchestrator and sole public entry point.
//!
//! [`ReceiptParser`] sequences the three stages — route, extract, structure —
//! and owns the output contract: [`ReceiptParser::parse`] returns a
//! well-formed [`ParseResult`] for every input, whatever happens inside. Any
//! error that escapes a stage is caught here and folded into a
//! `success: false` envelope carrying the fallback record and the causal
//! message.
//!
//! The parser is constructed once at startup and shared (`Arc`) across
//! concurrent requests; it holds only the immutable configuration and the
//! model client, so invocations need no coordination.

use crate::client::{BedrockClient, ModelClient};
use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::pipeline::extract::Extraction;
use crate::pipeline::input::{DocumentInput, DocumentKind};
use crate::pipeline::{extract, structure, vision};
use crate::record::ParseResult;
use std::sync::Arc;
use tracing::{error, info};

/// Document-to-record extraction pipeline.
///
/// # Example
/// ```rust,no_run
/// use receipt2asset::{DocumentInput, ParserConfig, ReceiptParser};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let parser = ReceiptParser::connect(ParserConfig::from_env()).await?;
///     let bytes = std::fs::read("receipt.pdf")?;
///     let input = DocumentInput::new(bytes, "receipt.pdf", "application/pdf");
///     let result = parser.parse(input).await;
///     println!("{}", serde_json::to_string_pretty(&result)?);
///     Ok(())
/// }
/// ```
pub struct ReceiptParser {
    config: ParserConfig,
    client: Arc<dyn ModelClient>,
}

impl ReceiptParser {
    /// Construct a parser backed by the Bedrock Runtime.
    ///
    /// Missing credentials fail here, at startup, as
    /// [`ParseError::CredentialsMissing`] — never deferred to the first
    /// request.
    pub async fn connect(config: ParserConfig) -> Result<Self, ParseError> {
        let client = Arc::new(BedrockClient::connect(&config).await?);
        Ok(Self::with_client(config, client))
    }

    /// Construct a parser over an injected model client.
    ///
    /// This is the seam tests use for deterministic stubs, and callers use
    /// for custom transport middleware.
    pub fn with_client(config: ParserConfig, client: Arc<dyn ModelClient>) -> Self {
        Self { config, client }
    }

    /// The configuration this parser was constructed with.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse one document into the output envelope.
    ///
    /// Infallible at the type level: internal errors become a
    /// `success: false` envelope with the fallback record.
    pub async fn parse(&self, input: DocumentInput) -> ParseResult {
        info!(
            filename = %input.filename,
            content_type = %input.content_type,
            bytes = input.bytes.len(),
            "parsing document"
        );

        match self.run(&input).await {
            Ok(result) => result,
            Err(e) => {
                error!(filename = %input.filename, error = %e, "pipeline failed");
                ParseResult::failure(e.to_string())
            }
        }
    }

    /// The linear three-stage pipeline. `Err` is reserved for fatal
    /// conditions (unsupported type, transport failure); everything else is
    /// already an envelope.
    async fn run(&self, input: &DocumentInput) -> Result<ParseResult, ParseError> {
        // ── Stage 1: route ───────────────────────────────────────────────
        let kind = input
            .kind()
            .ok_or_else(|| ParseError::UnsupportedContentType {
                content_type: input.content_type.clone(),
            })?;

        // ── Stage 2: extract text ────────────────────────────────────────
        let extraction = match kind {
            DocumentKind::Pdf => extract::pdf_text(input),
            DocumentKind::Image => {
                vision::transcribe_image(&self.client, input, &self.config).await
            }
        };

        let extracted = match extraction {
            Extraction::Text(t) => t,
            Extraction::Empty => {
                return Ok(ParseResult::failure(
                    "no text extracted from the document",
                ));
            }
            Extraction::Failed { detail } => {
                return Ok(ParseResult::failure(format!(
                    "no text extracted from the document: {detail}"
                )));
            }
        };

        // ── Stage 3: structure ───────────────────────────────────────────
        let record = structure::structure_text(&self.client, &extracted, &self.config).await?;

        info!(
            filename = %input.filename,
            category = %record.category,
            extracted_bytes = extracted.byte_len,
            "document parsed"
        );
        Ok(ParseResult::success(record, &extracted.text))
    }
}
