//! Configuration for the receipt parsing pipeline.
//!
//! All behaviour is controlled through [`ParserConfig`], built via its
//! [`ParserConfigBuilder`] or read from the environment with
//! [`ParserConfig::from_env`]. The config is process-wide and read-only:
//! constructed once at startup, then shared by reference for the lifetime of
//! the [`crate::parse::ReceiptParser`]. There is no lazily-initialised global
//! state — construction failure (bad value, missing credentials) surfaces at
//! startup, not on the first request.

use crate::error::ParseError;
use std::fmt;

/// Model identifier used when `AWS_BEDROCK_MODEL_ID` is not set.
pub const DEFAULT_MODEL_ID: &str = "amazon.nova-lite-v1:0";

/// Inference region used when `AWS_BEDROCK_REGION` is not set.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Configuration for one [`crate::parse::ReceiptParser`].
///
/// # Example
/// ```rust
/// use receipt2asset::ParserConfig;
///
/// let config = ParserConfig::builder()
///     .model_id("amazon.nova-pro-v1:0")
///     .region("eu-central-1")
///     .credentials("AKIA...", "secret")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ParserConfig {
    /// Bedrock model identifier, e.g. `amazon.nova-lite-v1:0`.
    pub model_id: String,

    /// AWS region hosting the inference endpoint.
    pub region: String,

    /// AWS access key id. `None` falls through to
    /// [`ParseError::CredentialsMissing`] at connect time.
    pub access_key_id: Option<String>,

    /// AWS secret access key.
    pub secret_access_key: Option<String>,

    /// Sampling temperature for both model calls. Default: 0.1.
    ///
    /// Low temperature keeps the model faithful to what is on the page,
    /// which is what transcription and field extraction both need.
    pub temperature: f32,

    /// Output-token cap for the vision transcription call. Default: 4000.
    ///
    /// Dense receipts (itemised invoices, warranty cards with terms) can run
    /// long; too low a cap silently truncates the transcription mid-line.
    pub transcription_max_tokens: u32,

    /// Output-token cap for the structuring call. Default: 1000.
    ///
    /// The reply is a single small JSON object; 1000 tokens is generous
    /// headroom without risking runaway output.
    pub structuring_max_tokens: u32,

    /// Custom transcription instruction. If `None`, uses
    /// [`crate::prompts::DEFAULT_TRANSCRIPTION_PROMPT`].
    pub transcription_prompt: Option<String>,

    /// Custom structuring instruction (field list + category heuristics).
    /// If `None`, uses [`crate::prompts::DEFAULT_STRUCTURING_INSTRUCTION`].
    /// The extracted text and the JSON-only closing line are appended either
    /// way.
    pub structuring_instruction: Option<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            region: DEFAULT_REGION.to_string(),
            access_key_id: None,
            secret_access_key: None,
            temperature: 0.1,
            transcription_max_tokens: 4000,
            structuring_max_tokens: 1000,
            transcription_prompt: None,
            structuring_instruction: None,
        }
    }
}

impl fmt::Debug for ParserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserConfig")
            .field("model_id", &self.model_id)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("temperature", &self.temperature)
            .field("transcription_max_tokens", &self.transcription_max_tokens)
            .field("structuring_max_tokens", &self.structuring_max_tokens)
            .finish()
    }
}

impl ParserConfig {
    /// Create a new builder for `ParserConfig`.
    pub fn builder() -> ParserConfigBuilder {
        ParserConfigBuilder {
            config: Self::default(),
        }
    }

    /// Read configuration from the environment.
    ///
    /// Variables: `AWS_BEDROCK_MODEL_ID`, `AWS_BEDROCK_REGION`,
    /// `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`. Unset model/region fall
    /// back to the defaults; unset credentials stay `None` and fail at
    /// connect time.
    pub fn from_env() -> Self {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            model_id: non_empty("AWS_BEDROCK_MODEL_ID").unwrap_or_else(|| DEFAULT_MODEL_ID.into()),
            region: non_empty("AWS_BEDROCK_REGION").unwrap_or_else(|| DEFAULT_REGION.into()),
            access_key_id: non_empty("AWS_ACCESS_KEY_ID"),
            secret_access_key: non_empty("AWS_SECRET_ACCESS_KEY"),
            ..Self::default()
        }
    }

    /// The credential pair, or [`ParseError::CredentialsMissing`] when either
    /// half is absent.
    pub fn credentials(&self) -> Result<(&str, &str), ParseError> {
        match (self.access_key_id.as_deref(), self.secret_access_key.as_deref()) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => {
                Ok((key, secret))
            }
            _ => Err(ParseError::CredentialsMissing),
        }
    }
}

/// Builder for [`ParserConfig`].
#[derive(Debug)]
pub struct ParserConfigBuilder {
    config: ParserConfig,
}

impl ParserConfigBuilder {
    pub fn model_id(mut self, model_id: impl Into<String>) -> Self {
        self.config.model_id = model_id.into();
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.config.region = region.into();
        self
    }

    pub fn credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.config.access_key_id = Some(access_key_id.into());
        self.config.secret_access_key = Some(secret_access_key.into());
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 1.0);
        self
    }

    pub fn transcription_max_tokens(mut self, n: u32) -> Self {
        self.config.transcription_max_tokens = n;
        self
    }

    pub fn structuring_max_tokens(mut self, n: u32) -> Self {
        self.config.structuring_max_tokens = n;
        self
    }

    pub fn transcription_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.transcription_prompt = Some(prompt.into());
        self
    }

    pub fn structuring_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.config.structuring_instruction = Some(instruction.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ParserConfig, ParseError> {
        let c = &self.config;
        if c.model_id.is_empty() {
            return Err(ParseError::InvalidConfig("model_id must not be empty".into()));
        }
        if c.region.is_empty() {
            return Err(ParseError::InvalidConfig("region must not be empty".into()));
        }
        if c.transcription_max_tokens == 0 || c.structuring_max_tokens == 0 {
            return Err(ParseError::InvalidConfig(
                "token caps must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_service() {
        let c = ParserConfig::default();
        assert_eq!(c.model_id, "amazon.nova-lite-v1:0");
        assert_eq!(c.region, "us-east-1");
        assert_eq!(c.temperature, 0.1);
        assert_eq!(c.transcription_max_tokens, 4000);
        assert_eq!(c.structuring_max_tokens, 1000);
    }

    #[test]
    fn builder_clamps_temperature() {
        let c = ParserConfig::builder().temperature(3.0).build().unwrap();
        assert_eq!(c.temperature, 1.0);
    }

    #[test]
    fn builder_rejects_empty_model_id() {
        assert!(ParserConfig::builder().model_id("").build().is_err());
    }

    #[test]
    fn builder_rejects_zero_token_cap() {
        assert!(ParserConfig::builder()
            .structuring_max_tokens(0)
            .build()
            .is_err());
    }

    #[test]
    fn credentials_require_both_halves() {
        let c = ParserConfig::default();
        assert!(c.credentials().is_err());

        let c = ParserConfig::builder()
            .credentials("AKIAEXAMPLE", "secret")
            .build()
            .unwrap();
        let (key, secret) = c.credentials().unwrap();
        assert_eq!(key, "AKIAEXAMPLE");
        assert_eq!(secret, "secret");
    }

    #[test]
    fn debug_redacts_secret() {
        let c = ParserConfig::builder()
            .credentials("AKIAEXAMPLE", "super-secret")
            .build()
            .unwrap();
        let debug = format!("{c:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
