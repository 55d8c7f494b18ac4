//! Error types for the receipt2asset library.
//!
//! Only *fatal* conditions live here. The pipeline's contract is that
//! [`crate::parse::ReceiptParser::parse`] always returns a well-formed
//! [`crate::record::ParseResult`], so most failures never reach callers as a
//! [`ParseError`] — they are folded into the envelope:
//!
//! * extraction failures become the tagged
//!   [`crate::pipeline::extract::Extraction`] states and end up as a
//!   `success: false` envelope;
//! * structuring decode failures substitute the fallback record and keep
//!   `success: true`.
//!
//! What remains fatal: construction-time problems (missing credentials,
//! invalid configuration), the unsupported-content-type routing branch, and
//! transport errors from the inference endpoint. The orchestrator catches
//! every one of these and converts it to a failure envelope; the typed enum
//! exists so call sites inside the crate can match on them.

use thiserror::Error;

/// All fatal errors produced by the receipt2asset library.
#[derive(Debug, Error)]
pub enum ParseError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// No extraction strategy applies to the declared content type.
    #[error("unsupported content type: {content_type}")]
    UnsupportedContentType { content_type: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// The AWS credential pair is absent at construction time.
    #[error(
        "AWS credentials are not configured.\n\
         Set AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY (or pass them via \
         ParserConfig) before constructing the parser."
    )]
    CredentialsMissing,

    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Model errors ──────────────────────────────────────────────────────
    /// The Bedrock Runtime call failed (network, credential, or service error).
    #[error("model invocation failed: {message}")]
    ModelInvocation { message: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_content_type_display() {
        let e = ParseError::UnsupportedContentType {
            content_type: "application/zip".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("unsupported content type"), "got: {msg}");
        assert!(msg.contains("application/zip"), "got: {msg}");
    }

    #[test]
    fn credentials_missing_names_both_variables() {
        let msg = ParseError::CredentialsMissing.to_string();
        assert!(msg.contains("AWS_ACCESS_KEY_ID"));
        assert!(msg.contains("AWS_SECRET_ACCESS_KEY"));
    }

    #[test]
    fn model_invocation_preserves_cause() {
        let e = ParseError::ModelInvocation {
            message: "dispatch failure: connection refused".into(),
        };
        assert!(e.to_string().contains("connection refused"));
    }
}
