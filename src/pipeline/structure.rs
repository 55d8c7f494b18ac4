//! Structuring: extracted text → typed [`AssetRecord`] via the model.
//!
//! The model is asked for a bare JSON object; replies are decoded through a
//! deliberately lenient intermediate shape (every field optional, price
//! accepted as number or string) and then normalised against the closed
//! schema. Two failure classes are handled differently:
//!
//! * **Recoverable** — undecodable JSON or an unexpected reply shape. The
//!   fallback record is substituted and the pipeline continues; callers
//!   still see `success: true` because text *was* extracted.
//! * **Fatal** — the transport call itself failed. Propagated as
//!   [`ParseError::ModelInvocation`] for the orchestrator boundary to fold
//!   into a `success: false` envelope with the causal message.
//!
//! The returned category is validated against the [`Category`] enumeration
//! here rather than trusted verbatim; an off-enumeration label costs only the
//! category (coerced to `Other`), not the whole record.

use crate::client::{ContentBlock, InferenceConfig, ModelClient, ModelRequest};
use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::pipeline::extract::ExtractedText;
use crate::prompts::{structuring_prompt, DEFAULT_STRUCTURING_INSTRUCTION};
use crate::record::{AssetRecord, Category};
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use tracing::{debug, warn};

/// Structure extracted text into a typed record.
///
/// Never returns a schema-violating record: every recoverable failure path
/// lands on [`AssetRecord::fallback`].
pub async fn structure_text(
    client: &Arc<dyn ModelClient>,
    extracted: &ExtractedText,
    config: &ParserConfig,
) -> Result<AssetRecord, ParseError> {
    let instruction = config
        .structuring_instruction
        .as_deref()
        .unwrap_or(DEFAULT_STRUCTURING_INSTRUCTION);
    let prompt = structuring_prompt(instruction, &extracted.text);

    let request = ModelRequest::user(
        vec![ContentBlock::text(prompt)],
        InferenceConfig {
            max_tokens: config.structuring_max_tokens,
            temperature: config.temperature,
        },
    );

    let reply = client.invoke(&request).await?;

    let Some(text) = reply.first_text() else {
        warn!("unexpected structuring reply shape, substituting fallback record");
        return Ok(AssetRecord::fallback());
    };

    let body = strip_code_fence(text);
    match serde_json::from_str::<RawRecord>(body) {
        Ok(raw) => {
            debug!("structured record decoded");
            Ok(raw.into_record())
        }
        Err(e) => {
            warn!(error = %e, reply = body, "structuring reply is not valid JSON, substituting fallback record");
            Ok(AssetRecord::fallback())
        }
    }
}

/// Strip one outer markdown fence, if present.
///
/// Models wrap JSON in ```` ```json … ``` ```` blocks despite the
/// JSON-only instruction; the content between the fences is returned
/// unchanged.
fn strip_code_fence(reply: &str) -> &str {
    let mut s = reply.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest;
    } else if let Some(rest) = s.strip_prefix("```") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

// ── Lenient reply decoding ───────────────────────────────────────────────

/// The model's reply as decoded, before normalisation.
#[derive(Debug, Default, Deserialize)]
struct RawRecord {
    #[serde(default)]
    item_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_price")]
    price: Option<f64>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    vendor: Option<String>,
    #[serde(default)]
    model_number: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

impl RawRecord {
    /// Normalise against the closed schema: sentinels for absent fields,
    /// category validated against the enumeration.
    fn into_record(self) -> AssetRecord {
        let fallback = AssetRecord::fallback();
        let category = match self.category.as_deref() {
            Some(label) => Category::from_label(label).unwrap_or_else(|| {
                warn!(label, "model returned an off-enumeration category, coercing to Other");
                Category::Other
            }),
            None => Category::Other,
        };

        let non_blank = |s: Option<String>| s.filter(|v| !v.trim().is_empty());

        AssetRecord {
            item_name: non_blank(self.item_name).unwrap_or(fallback.item_name),
            price: self.price.unwrap_or(fallback.price),
            date: self.date.unwrap_or(fallback.date),
            vendor: non_blank(self.vendor).unwrap_or(fallback.vendor),
            model_number: non_blank(self.model_number),
            description: non_blank(self.description).unwrap_or(fallback.description),
            category,
        }
    }
}

/// Accept a price as a JSON number or as a string, stripping currency
/// symbols and thousands separators from the latter.
fn lenient_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ModelReply;

    #[test]
    fn transport_failure_propagates_to_the_caller() {
        struct FailingClient;

        #[async_trait::async_trait]
        impl ModelClient for FailingClient {
            async fn invoke(&self, _request: &ModelRequest) -> Result<ModelReply, ParseError> {
                Err(ParseError::ModelInvocation {
                    message: "boom".into(),
                })
            }
        }

        let client: Arc<dyn ModelClient> = Arc::new(FailingClient);
        let extracted = ExtractedText::new("Widget 19.99".into());
        let config = ParserConfig::default();

        let err = tokio_test::block_on(structure_text(&client, &extracted, &config))
            .expect_err("transport errors must not be swallowed");
        assert!(matches!(err, ParseError::ModelInvocation { .. }));
    }

    #[test]
    fn strip_code_fence_variants() {
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  ```json {\"a\":1} ```  "), "{\"a\":1}");
    }

    #[test]
    fn complete_reply_decodes_to_record() {
        let raw: RawRecord = serde_json::from_str(
            r#"{
                "item_name": "AirPods Pro",
                "price": 249.0,
                "date": "05.01.2024",
                "vendor": "Apple Store",
                "model_number": "A2931",
                "description": "Wireless earbuds",
                "category": "Electronics"
            }"#,
        )
        .unwrap();
        let record = raw.into_record();
        assert_eq!(record.item_name, "AirPods Pro");
        assert_eq!(record.price, 249.0);
        assert_eq!(record.category, Category::Electronics);
        assert_eq!(record.model_number.as_deref(), Some("A2931"));
    }

    #[test]
    fn absent_fields_take_fallback_sentinels() {
        let raw: RawRecord = serde_json::from_str(r#"{"price": 10}"#).unwrap();
        let record = raw.into_record();
        assert_eq!(record.item_name, "Unable to extract");
        assert_eq!(record.price, 10.0);
        assert_eq!(record.date, "");
        assert_eq!(record.vendor, "Unable to extract");
        assert_eq!(record.description, "Manual entry required");
        assert_eq!(record.category, Category::Other);
    }

    #[test]
    fn null_model_number_stays_none() {
        let raw: RawRecord =
            serde_json::from_str(r#"{"model_number": null}"#).unwrap();
        assert_eq!(raw.into_record().model_number, None);
    }

    #[test]
    fn price_accepted_as_string_with_currency() {
        for (json, expected) in [
            (r#"{"price": "19.99"}"#, 19.99),
            (r#"{"price": "$19.99"}"#, 19.99),
            (r#"{"price": "1,299.00"}"#, 1299.0),
        ] {
            let raw: RawRecord = serde_json::from_str(json).unwrap();
            assert_eq!(raw.into_record().price, expected, "input: {json}");
        }
    }

    #[test]
    fn unparseable_price_takes_zero_sentinel() {
        let raw: RawRecord = serde_json::from_str(r#"{"price": "free"}"#).unwrap();
        assert_eq!(raw.into_record().price, 0.0);
    }

    #[test]
    fn off_enumeration_category_coerces_to_other() {
        let raw: RawRecord = serde_json::from_str(
            r#"{"item_name": "Bananas", "category": "Groceries"}"#,
        )
        .unwrap();
        let record = raw.into_record();
        assert_eq!(record.category, Category::Other);
        // The rest of the extraction survives.
        assert_eq!(record.item_name, "Bananas");
    }

    #[test]
    fn category_labels_match_case_insensitively() {
        let raw: RawRecord =
            serde_json::from_str(r#"{"category": "home appliances"}"#).unwrap();
        assert_eq!(raw.into_record().category, Category::HomeAppliances);
    }
}
