use schemars::JsonSchema;
use serde::Deserialize;

use keepwell_core::enums::{ContentCategory, ContentIntent};

/// Shape demanded of the classification LLM call. `content_category` is
/// the authoritative tag assigned exactly once, here.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ClassificationResult {
    pub content_category: ContentCategory,
    pub topic_main: String,
    #[serde(default)]
    pub subcategories: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub entities: Vec<String>,
    pub intent: Option<ContentIntent>,
    pub visual_description: Option<String>,
    #[serde(default)]
    pub visual_tags: Vec<String>,
}

pub const CLASSIFICATION_SYSTEM_PROMPT: &str = r#"You are a content classification assistant.
Given the text of a saved social post, respond with a single JSON object (no markdown fences)
containing exactly these fields:
- content_category: one of Travel, Food, Learning, Career, Fitness, Entertainment, Shopping, Tech, Lifestyle, Misc
- topic_main: a short phrase naming the main topic
- subcategories: an array of up to 5 short tags
- locations: an array of place names mentioned or implied, in the order they appear
- entities: an array of named people, brands, or organisations mentioned
- intent: one of learn, visit, buy, try, watch, misc
- visual_description: a one-sentence description of the visual content, or null
- visual_tags: an array of short visual descriptors

Respond with the JSON object only."#;

pub fn build_user_prompt(content_text: &str) -> String {
    const MAX_CHARS: usize = 8000;
    let truncated = ai_client::truncate_to_char_boundary(content_text, MAX_CHARS);
    format!("Saved content text:\n\n{truncated}")
}
