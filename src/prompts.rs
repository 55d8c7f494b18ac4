//! Instruction templates for the two model calls.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the category heuristics are the only place
//!    classification logic lives; changing a label or adding an example means
//!    editing exactly one constant. The [`crate::record::Category`] labels
//!    must stay in lock-step with the text below.
//!
//! 2. **Testability** — unit tests inspect the prompts directly without
//!    invoking a real model, so wording regressions that would break the
//!    reply contract (bare JSON, exact field names) are caught early.
//!
//! Callers can override either instruction via
//! [`crate::config::ParserConfig`]; the constants here are used when no
//! override is provided.

/// Characters of extracted text embedded in the structuring prompt.
///
/// Receipts carry their useful fields near the top; the cap bounds prompt
/// size on pathological inputs (book-length PDFs) without losing signal.
pub const STRUCTURING_INPUT_MAX_CHARS: usize = 3000;

/// Default instruction for the vision transcription call.
///
/// Used when `ParserConfig::transcription_prompt` is `None`.
pub const DEFAULT_TRANSCRIPTION_PROMPT: &str = r#"Analyze this receipt/invoice image and extract all visible text and information.
Focus on:
- Product/item names
- Prices and amounts
- Dates
- Store/vendor information
- Model numbers or serial numbers
- Warranty information

Provide all extracted text clearly formatted."#;

/// Default instruction for the structuring call.
///
/// Lists the seven required output fields with their exact semantics and the
/// nine category labels with detection heuristics. The extracted text and the
/// JSON-only closing line are appended by [`structuring_prompt`], so an
/// override of this instruction never has to repeat them.
pub const DEFAULT_STRUCTURING_INSTRUCTION: &str = r#"You are an expert at analyzing receipts and invoices to extract product information. Analyze this text and extract the following information in JSON format:

REQUIRED FIELDS:
- item_name: The main product/item name (exactly as written)
- price: The total amount paid (just the number, no currency symbols)
- date: The purchase/invoice date (convert to DD.MM.YYYY format)
- vendor: The store/company/brand name
- model_number: Product model, SKU, or part number (null if not found)
- description: Brief product description
- category: Product category (see categories below)

CATEGORY DETECTION RULES:
Analyze the item name, vendor, and product details to determine the most appropriate category:

"Electronics" - for: phones, computers, tablets, headphones, earbuds, speakers, cameras, gaming devices, smart watches, chargers, cables, TV, monitors, keyboards, mice, electronic accessories
Examples: iPhone, AirPods, MacBook, Samsung Galaxy, PlayStation, Xbox, Apple Watch, wireless charger

"Home Appliances" - for: kitchen appliances, washing machines, refrigerators, microwaves, air conditioners, vacuum cleaners, small home devices
Examples: coffee maker, blender, dishwasher, iron, hair dryer, toaster

"Vehicles" - for: cars, motorcycles, bicycles, car parts, automotive accessories
Examples: Toyota Camry, Honda bike, car tires, brake pads

"Furniture" - for: chairs, tables, beds, sofas, storage furniture, office furniture
Examples: dining table, office chair, bookshelf, mattress

"Tools & Equipment" - for: power tools, hand tools, machinery, construction equipment, workshop items
Examples: drill, hammer, saw, toolbox, generator

"Jewelry" - for: rings, necklaces, watches (non-smart), precious metals, gems
Examples: gold ring, diamond necklace, luxury watch

"Art & Collectibles" - for: paintings, sculptures, collectible items, antiques, art supplies
Examples: artwork, vintage items, collectible cards

"Sports & Recreation" - for: sports equipment, gym gear, outdoor gear, games, recreational items
Examples: tennis racket, dumbbells, camping gear, board games

"Other" - for items that don't fit the above categories

IMPORTANT:
- Look at product names like "AirPods", "iPhone", "MacBook" → clearly "Electronics"
- Look at vendor names like "Apple", "Samsung", "Sony" → likely "Electronics"
- Be intelligent about categorization based on product context
- Always choose the most specific and appropriate category"#;

/// Assemble the full structuring prompt: instruction, at most
/// [`STRUCTURING_INPUT_MAX_CHARS`] characters of extracted text, and the
/// JSON-only closing line.
pub fn structuring_prompt(instruction: &str, extracted_text: &str) -> String {
    let embedded: String = extracted_text
        .chars()
        .take(STRUCTURING_INPUT_MAX_CHARS)
        .collect();
    format!(
        "{instruction}\n\nText to analyze:\n{embedded}\n\n\
         Return ONLY valid JSON format with all required fields. No explanations or extra text."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Category;

    #[test]
    fn structuring_instruction_names_every_field() {
        for field in [
            "item_name",
            "price",
            "date",
            "vendor",
            "model_number",
            "description",
            "category",
        ] {
            assert!(
                DEFAULT_STRUCTURING_INSTRUCTION.contains(field),
                "missing field: {field}"
            );
        }
    }

    #[test]
    fn structuring_instruction_lists_every_category_label() {
        for category in Category::ALL {
            assert!(
                DEFAULT_STRUCTURING_INSTRUCTION.contains(category.as_str()),
                "missing category label: {}",
                category.as_str()
            );
        }
    }

    #[test]
    fn structuring_instruction_fixes_date_and_price_semantics() {
        assert!(DEFAULT_STRUCTURING_INSTRUCTION.contains("DD.MM.YYYY"));
        assert!(DEFAULT_STRUCTURING_INSTRUCTION.contains("no currency symbols"));
        assert!(DEFAULT_STRUCTURING_INSTRUCTION.contains("null if not found"));
    }

    #[test]
    fn transcription_prompt_targets_receipt_fields() {
        for needle in ["Prices", "Dates", "vendor", "Model numbers", "Warranty"] {
            assert!(
                DEFAULT_TRANSCRIPTION_PROMPT.contains(needle),
                "missing: {needle}"
            );
        }
    }

    #[test]
    fn structuring_prompt_embeds_text_and_demands_bare_json() {
        let prompt = structuring_prompt(DEFAULT_STRUCTURING_INSTRUCTION, "Widget $19.99");
        assert!(prompt.contains("Widget $19.99"));
        assert!(prompt.contains("Return ONLY valid JSON"));
    }

    #[test]
    fn structuring_prompt_caps_embedded_text() {
        // 'q' does not occur in the instruction or the closing line, so its
        // count measures the embedded text alone.
        let long = "q".repeat(STRUCTURING_INPUT_MAX_CHARS + 500);
        let prompt = structuring_prompt("instruction", &long);
        let embedded_len = prompt.matches('q').count();
        assert_eq!(embedded_len, STRUCTURING_INPUT_MAX_CHARS);
    }
}
