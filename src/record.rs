//! The typed extraction result and its output envelope.
//!
//! [`AssetRecord`] is the inter-stage contract between the structuring engine
//! and callers. Keeping it a concrete struct with a closed [`Category`] enum
//! (rather than an untyped JSON map) means a schema-violating model reply can
//! never leak out of the pipeline: anything that does not decode cleanly is
//! replaced by [`AssetRecord::fallback`] before a caller sees it.
//!
//! [`ParseResult`] is the envelope returned for every invocation. Its
//! invariant is unconditional: `data` is always a structurally valid record,
//! whether the pipeline succeeded, fell back, or failed outright. Callers
//! must read `success` (and `error`) to distinguish outcomes — field shape
//! alone does not signal failure.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of characters of extracted text carried in the envelope.
pub const PREVIEW_MAX_CHARS: usize = 500;

/// Ellipsis marker appended when the preview is truncated.
const PREVIEW_ELLIPSIS: &str = "...";

// ── Category ─────────────────────────────────────────────────────────────

/// Closed set of asset categories.
///
/// The serde labels match the category names used in the structuring prompt
/// verbatim — the prompt and this enum are two halves of one contract. The
/// model's returned label is validated against this set at the structuring
/// boundary; anything else is coerced to [`Category::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Category {
    Electronics,
    #[serde(rename = "Home Appliances")]
    HomeAppliances,
    Vehicles,
    Furniture,
    #[serde(rename = "Tools & Equipment")]
    ToolsEquipment,
    Jewelry,
    #[serde(rename = "Art & Collectibles")]
    ArtCollectibles,
    #[serde(rename = "Sports & Recreation")]
    SportsRecreation,
    #[default]
    Other,
}

impl Category {
    /// Every category, in prompt order.
    pub const ALL: [Category; 9] = [
        Category::Electronics,
        Category::HomeAppliances,
        Category::Vehicles,
        Category::Furniture,
        Category::ToolsEquipment,
        Category::Jewelry,
        Category::ArtCollectibles,
        Category::SportsRecreation,
        Category::Other,
    ];

    /// The label as it appears in the prompt and in serialised records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electronics => "Electronics",
            Category::HomeAppliances => "Home Appliances",
            Category::Vehicles => "Vehicles",
            Category::Furniture => "Furniture",
            Category::ToolsEquipment => "Tools & Equipment",
            Category::Jewelry => "Jewelry",
            Category::ArtCollectibles => "Art & Collectibles",
            Category::SportsRecreation => "Sports & Recreation",
            Category::Other => "Other",
        }
    }

    /// Match a model-returned label against the enumeration.
    ///
    /// Comparison is whitespace-trimmed and case-insensitive; models reliably
    /// return the requested labels but occasionally vary the casing.
    pub fn from_label(label: &str) -> Option<Category> {
        let label = label.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_label(s).ok_or_else(|| format!("unknown category label: {s:?}"))
    }
}

// ── AssetRecord ──────────────────────────────────────────────────────────

/// Structured asset-purchase information extracted from one document.
///
/// Absent fields are never omitted: they carry the sentinel values of
/// [`AssetRecord::fallback`] instead, so the serialised shape is identical
/// for full, partial, and failed extractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Main product/item name, as written on the document.
    pub item_name: String,
    /// Total amount paid, currency symbols stripped.
    pub price: f64,
    /// Purchase/invoice date, normalised to DD.MM.YYYY.
    pub date: String,
    /// Store/company/brand name.
    pub vendor: String,
    /// Product model, SKU, or part number.
    pub model_number: Option<String>,
    /// Brief product description.
    pub description: String,
    /// Validated asset category.
    pub category: Category,
}

impl AssetRecord {
    /// The fixed sentinel record substituted whenever structuring cannot
    /// produce usable output.
    ///
    /// Structurally indistinguishable from a successful extraction — callers
    /// must rely on the envelope's `success` flag, not on field shape.
    pub fn fallback() -> Self {
        Self {
            item_name: "Unable to extract".to_string(),
            price: 0.0,
            date: String::new(),
            vendor: "Unable to extract".to_string(),
            model_number: None,
            description: "Manual entry required".to_string(),
            category: Category::Other,
        }
    }
}

// ── ParseResult ──────────────────────────────────────────────────────────

/// The pipeline's output envelope, returned for every invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    /// Whether text was extracted and the pipeline ran to completion.
    ///
    /// A `true` here does not guarantee structuring succeeded — a decode
    /// failure after successful extraction substitutes the fallback record
    /// while keeping `success: true`.
    pub success: bool,
    /// The extraction result; the fallback record when unavailable.
    pub data: AssetRecord,
    /// First [`PREVIEW_MAX_CHARS`] characters of the extracted text, with an
    /// ellipsis marker when truncated. Empty on the failure paths.
    pub extracted_text_preview: String,
    /// Causal message, populated only when `success` is `false`.
    pub error: Option<String>,
}

impl ParseResult {
    /// Successful envelope wrapping a record and the source text.
    pub fn success(data: AssetRecord, extracted_text: &str) -> Self {
        Self {
            success: true,
            data,
            extracted_text_preview: preview(extracted_text),
            error: None,
        }
    }

    /// Failure envelope carrying the fallback record and a causal message.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: AssetRecord::fallback(),
            extracted_text_preview: String::new(),
            error: Some(error.into()),
        }
    }
}

/// Truncate extracted text for the envelope.
///
/// Counts characters, not bytes, so multi-byte text never splits mid-scalar.
/// Output length is at most `PREVIEW_MAX_CHARS` + the 3-char ellipsis.
pub fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}{PREVIEW_ELLIPSIS}")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_round_trip_serde() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
            let back: Category = serde_json::from_str(&json).unwrap();
            assert_eq!(back, category);
        }
    }

    #[test]
    fn from_label_is_case_insensitive() {
        assert_eq!(Category::from_label("electronics"), Some(Category::Electronics));
        assert_eq!(
            Category::from_label("  Home Appliances "),
            Some(Category::HomeAppliances)
        );
        assert_eq!(
            Category::from_label("tools & equipment"),
            Some(Category::ToolsEquipment)
        );
        assert_eq!(Category::from_label("Groceries"), None);
    }

    #[test]
    fn from_str_rejects_unknown_labels() {
        assert!("Sports & Recreation".parse::<Category>().is_ok());
        assert!("Sports".parse::<Category>().is_err());
    }

    #[test]
    fn fallback_record_sentinels() {
        let r = AssetRecord::fallback();
        assert_eq!(r.item_name, "Unable to extract");
        assert_eq!(r.price, 0.0);
        assert_eq!(r.date, "");
        assert_eq!(r.vendor, "Unable to extract");
        assert_eq!(r.model_number, None);
        assert_eq!(r.description, "Manual entry required");
        assert_eq!(r.category, Category::Other);
    }

    #[test]
    fn failure_envelope_carries_fallback_and_error() {
        let result = ParseResult::failure("no text extracted from the document");
        assert!(!result.success);
        assert_eq!(result.data, AssetRecord::fallback());
        assert_eq!(result.extracted_text_preview, "");
        assert_eq!(
            result.error.as_deref(),
            Some("no text extracted from the document")
        );
    }

    #[test]
    fn preview_short_text_is_verbatim() {
        let text = "a".repeat(PREVIEW_MAX_CHARS);
        assert_eq!(preview(&text), text);
        assert_eq!(preview(""), "");
    }

    #[test]
    fn preview_long_text_is_truncated_with_ellipsis() {
        let text = "b".repeat(PREVIEW_MAX_CHARS + 1);
        let p = preview(&text);
        assert_eq!(p.chars().count(), PREVIEW_MAX_CHARS + 3);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn preview_counts_chars_not_bytes() {
        // 501 three-byte scalars; a byte-based cut would split one of them.
        let text = "€".repeat(PREVIEW_MAX_CHARS + 1);
        let p = preview(&text);
        assert_eq!(p.chars().count(), PREVIEW_MAX_CHARS + 3);
        assert!(p.starts_with('€'));
    }

    #[test]
    fn record_serialises_with_prompt_field_names() {
        let record = AssetRecord {
            item_name: "AirPods Pro".into(),
            price: 249.0,
            date: "05.01.2024".into(),
            vendor: "Apple".into(),
            model_number: Some("A2931".into()),
            description: "Wireless earbuds".into(),
            category: Category::Electronics,
        };
        let v = serde_json::to_value(&record).unwrap();
        assert_eq!(v["item_name"], "AirPods Pro");
        assert_eq!(v["model_number"], "A2931");
        assert_eq!(v["category"], "Electronics");
    }
}
