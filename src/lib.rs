//! # receipt2asset
//!
//! Extract structured asset-purchase records from receipts, invoices, and
//! warranty cards using Bedrock vision models.
//!
//! ## Why this crate?
//!
//! Receipts arrive as PDFs with a proper text layer, phone photos, and
//! scans. Template-based field extraction breaks on every new store layout;
//! instead this crate reads whatever text the document carries (directly for
//! PDFs, via a vision model for images) and lets a generative model map it
//! onto a fixed schema — item, price, date, vendor, model number, category.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Document bytes
//!  │
//!  ├─ 1. Route      content type / extension → PDF or image strategy
//!  ├─ 2. Extract    PDF text layer (pdf-extract) │ vision transcription
//!  ├─ 3. Structure  model call → JSON → validated AssetRecord
//!  └─ 4. Envelope   ParseResult { success, data, preview, error }
//! ```
//!
//! The envelope contract is unconditional: `data` is always a structurally
//! valid [`AssetRecord`] — the fixed fallback record when extraction or
//! structuring could not produce one — and `category` is always one of the
//! nine enumerated values.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use receipt2asset::{DocumentInput, ParserConfig, ReceiptParser};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credentials and model from AWS_* environment variables
//!     let parser = ReceiptParser::connect(ParserConfig::from_env()).await?;
//!
//!     let bytes = std::fs::read("receipt.pdf")?;
//!     let result = parser
//!         .parse(DocumentInput::new(bytes, "receipt.pdf", "application/pdf"))
//!         .await;
//!
//!     println!("{} — {}", result.data.item_name, result.data.price);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `receipt2asset` binary (clap + anyhow + tracing-subscriber + dotenvy) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! receipt2asset = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod error;
pub mod parse;
pub mod pipeline;
pub mod prompts;
pub mod record;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::{BedrockClient, ModelClient, ModelReply, ModelRequest};
pub use config::{ParserConfig, ParserConfigBuilder};
pub use error::ParseError;
pub use parse::ReceiptParser;
pub use pipeline::input::{DocumentInput, DocumentKind};
pub use record::{AssetRecord, Category, ParseResult};
