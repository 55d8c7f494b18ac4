//! CLI binary for receipt2asset.
//!
//! A thin shim over the library crate: reads a document from disk, runs the
//! pipeline once, prints the result envelope as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use receipt2asset::{DocumentInput, ParserConfig, ReceiptParser};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Parse a PDF receipt (pretty JSON on stdout)
  receipt2asset receipt.pdf

  # Parse a photographed receipt
  receipt2asset photo.jpg

  # Override the declared content type
  receipt2asset upload.bin --content-type image/png

  # Use a different model / region
  receipt2asset receipt.pdf --model amazon.nova-pro-v1:0 --region eu-central-1

EXIT STATUS:
  0  the envelope reports success
  1  the envelope reports failure (unsupported type, no text extracted, ...),
     or startup failed (missing credentials, unreadable file)

ENVIRONMENT VARIABLES:
  AWS_ACCESS_KEY_ID       AWS access key (required)
  AWS_SECRET_ACCESS_KEY   AWS secret key (required)
  AWS_BEDROCK_REGION      Inference region       (default: us-east-1)
  AWS_BEDROCK_MODEL_ID    Bedrock model ID       (default: amazon.nova-lite-v1:0)

  A .env file in the working directory is loaded first.
"#;

/// Extract a structured asset record from a receipt, invoice, or warranty card.
#[derive(Parser, Debug)]
#[command(
    name = "receipt2asset",
    version,
    about = "Extract structured asset records from receipts and invoices using Bedrock vision models",
    arg_required_else_help = true,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to a PDF or raster image document.
    input: PathBuf,

    /// Declared MIME type. Guessed from the file extension if not set.
    #[arg(long)]
    content_type: Option<String>,

    /// Bedrock model ID.
    #[arg(long, env = "AWS_BEDROCK_MODEL_ID")]
    model: Option<String>,

    /// AWS region hosting the inference endpoint.
    #[arg(long, env = "AWS_BEDROCK_REGION")]
    region: Option<String>,

    /// Print compact JSON instead of pretty-printed.
    #[arg(long)]
    compact: bool,
}

/// Map a file extension to the MIME type an upload layer would declare.
fn guess_content_type(path: &std::path::Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("tiff") | Some("tif") => "image/tiff",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
    .to_string()
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ParserConfig::from_env();
    if let Some(model) = cli.model {
        config.model_id = model;
    }
    if let Some(region) = cli.region {
        config.region = region;
    }

    let parser = ReceiptParser::connect(config)
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to initialise the parser")?;

    let bytes = std::fs::read(&cli.input)
        .with_context(|| format!("failed to read '{}'", cli.input.display()))?;

    let filename = cli
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content_type = cli
        .content_type
        .unwrap_or_else(|| guess_content_type(&cli.input));

    let result = parser
        .parse(DocumentInput::new(bytes, filename, content_type))
        .await;

    let json = if cli.compact {
        serde_json::to_string(&result)?
    } else {
        serde_json::to_string_pretty(&result)?
    };
    println!("{json}");

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}
