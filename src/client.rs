//! Model transport: the `InvokeModel` wire types and the Bedrock client.
//!
//! The pipeline talks to the inference service through the [`ModelClient`]
//! trait, not the AWS SDK directly. The trait is the test seam: integration
//! tests drive the whole pipeline against a scripted stub, and callers can
//! wrap the real client with their own middleware. [`BedrockClient`] is the
//! production implementation over `aws-sdk-bedrockruntime`.
//!
//! The request/response structs mirror the Nova message schema accepted by
//! `InvokeModel` — `messages[].content[]` blocks plus an `inferenceConfig`
//! object. Reply decoding is deliberately lenient: every level of
//! [`ModelReply`] is optional, because an unexpected reply shape is a
//! recoverable condition for the pipeline (sentinel and fallback handling),
//! not a transport failure.

use crate::config::ParserConfig;
use crate::error::ParseError;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_bedrockruntime::config::Credentials;
use aws_sdk_bedrockruntime::error::DisplayErrorContext;
use aws_sdk_bedrockruntime::primitives::Blob;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ── Request wire types ───────────────────────────────────────────────────

/// One `InvokeModel` request body.
#[derive(Debug, Clone, Serialize)]
pub struct ModelRequest {
    pub messages: Vec<Message>,
    #[serde(rename = "inferenceConfig")]
    pub inference_config: InferenceConfig,
}

impl ModelRequest {
    /// A single-turn user request with the given content blocks.
    pub fn user(content: Vec<ContentBlock>, inference_config: InferenceConfig) -> Self {
        Self {
            messages: vec![Message {
                role: "user".to_string(),
                content,
            }],
            inference_config,
        }
    }
}

/// One chat turn.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: String,
    pub content: Vec<ContentBlock>,
}

/// A text or image segment of a message.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ContentBlock {
    Text { text: String },
    Image { image: ImageBlock },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    /// An image payload tagged with its raster format (`png`, `jpeg`, ...).
    pub fn image(format: impl Into<String>, base64_bytes: impl Into<String>) -> Self {
        ContentBlock::Image {
            image: ImageBlock {
                format: format.into(),
                source: ImageSource {
                    bytes: base64_bytes.into(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageBlock {
    pub format: String,
    pub source: ImageSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageSource {
    /// Base64-encoded image bytes.
    pub bytes: String,
}

/// Sampling parameters for one call.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceConfig {
    pub max_tokens: u32,
    pub temperature: f32,
}

// ── Reply wire types ─────────────────────────────────────────────────────

/// One `InvokeModel` response body.
///
/// Every level is optional so shape drift decodes to `None` instead of a
/// hard error; [`ModelReply::first_text`] is the only accessor the pipeline
/// needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelReply {
    #[serde(default)]
    pub output: Option<ReplyOutput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplyOutput {
    #[serde(default)]
    pub message: Option<ReplyMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplyMessage {
    #[serde(default)]
    pub content: Vec<ReplyContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplyContent {
    #[serde(default)]
    pub text: Option<String>,
}

impl ModelReply {
    /// The first text segment of the reply message, if the reply has the
    /// expected chat shape.
    pub fn first_text(&self) -> Option<&str> {
        self.output
            .as_ref()?
            .message
            .as_ref()?
            .content
            .iter()
            .find_map(|c| c.text.as_deref())
    }
}

// ── Client trait ─────────────────────────────────────────────────────────

/// Request/response interface to the generative-model endpoint.
///
/// `Err` means the call itself failed (network, credentials, service); a
/// decodable-but-unexpected reply body is `Ok` with an empty [`ModelReply`].
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn invoke(&self, request: &ModelRequest) -> Result<ModelReply, ParseError>;
}

// ── Bedrock implementation ───────────────────────────────────────────────

/// [`ModelClient`] backed by the AWS Bedrock Runtime `InvokeModel` API.
pub struct BedrockClient {
    client: aws_sdk_bedrockruntime::Client,
    model_id: String,
}

impl BedrockClient {
    /// Build a client from the parser configuration.
    ///
    /// Fails with [`ParseError::CredentialsMissing`] when the credential pair
    /// is absent, so a misconfigured process dies at startup rather than on
    /// its first request.
    pub async fn connect(config: &ParserConfig) -> Result<Self, ParseError> {
        let (access_key_id, secret_access_key) = config.credentials()?;
        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "receipt2asset",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        debug!(region = %config.region, model_id = %config.model_id, "Bedrock client initialised");

        Ok(Self {
            client: aws_sdk_bedrockruntime::Client::new(&sdk_config),
            model_id: config.model_id.clone(),
        })
    }
}

#[async_trait]
impl ModelClient for BedrockClient {
    async fn invoke(&self, request: &ModelRequest) -> Result<ModelReply, ParseError> {
        let body = serde_json::to_vec(request)
            .map_err(|e| ParseError::Internal(format!("request serialisation: {e}")))?;

        let response = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| ParseError::ModelInvocation {
                message: DisplayErrorContext(&e).to_string(),
            })?;

        serde_json::from_slice(response.body().as_ref()).map_err(|e| {
            ParseError::ModelInvocation {
                message: format!("undecodable response body: {e}"),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serialises_to_nova_schema() {
        let request = ModelRequest::user(
            vec![
                ContentBlock::text("transcribe this"),
                ContentBlock::image("png", "aGVsbG8="),
            ],
            // 0.5 survives the f32-to-f64 widening exactly, keeping the
            // JSON number comparison below stable.
            InferenceConfig {
                max_tokens: 4000,
                temperature: 0.5,
            },
        );

        let v = serde_json::to_value(&request).unwrap();
        assert_eq!(
            v,
            json!({
                "messages": [{
                    "role": "user",
                    "content": [
                        { "text": "transcribe this" },
                        { "image": { "format": "png", "source": { "bytes": "aGVsbG8=" } } }
                    ]
                }],
                "inferenceConfig": { "maxTokens": 4000, "temperature": 0.5 }
            })
        );
    }

    #[test]
    fn first_text_reads_the_first_text_segment() {
        let reply: ModelReply = serde_json::from_value(json!({
            "output": { "message": { "role": "assistant", "content": [
                { "text": "first" },
                { "text": "second" }
            ]}},
            "stopReason": "end_turn"
        }))
        .unwrap();
        assert_eq!(reply.first_text(), Some("first"));
    }

    #[test]
    fn first_text_is_none_for_unexpected_shapes() {
        let missing_output: ModelReply = serde_json::from_value(json!({})).unwrap();
        assert_eq!(missing_output.first_text(), None);

        let empty_content: ModelReply = serde_json::from_value(json!({
            "output": { "message": { "content": [] } }
        }))
        .unwrap();
        assert_eq!(empty_content.first_text(), None);

        let non_text_content: ModelReply = serde_json::from_value(json!({
            "output": { "message": { "content": [ { "toolUse": {} } ] } }
        }))
        .unwrap();
        assert_eq!(non_text_content.first_text(), None);
    }
}
