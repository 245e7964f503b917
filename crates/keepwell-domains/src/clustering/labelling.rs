use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use keepwell_core::enums::ContentCategory;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ClusterLabel {
    pub label: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SampleMember {
    pub topic_main: Option<String>,
    pub title: Option<String>,
    pub locations: Vec<String>,
    pub subcategories: Vec<String>,
}

const MAX_SAMPLES: usize = 5;

pub fn build_prompt(category: ContentCategory, samples: &[SampleMember]) -> String {
    let sample_json = serde_json::to_string_pretty(&samples.iter().take(MAX_SAMPLES).collect::<Vec<_>>())
        .unwrap_or_default();
    format!(
        "Category: {category}\n\nSample members (JSON):\n{sample_json}\n\n\
         Respond with a JSON object {{\"label\": ..., \"description\": ...}} where label is a short \
         human-readable name for this group and description is one sentence summarising what ties \
         these items together."
    )
}

pub const LABEL_SYSTEM_PROMPT: &str =
    "You generate short, friendly labels and one-sentence descriptions for a group of similar \
     saved items. Respond with a single JSON object and nothing else.";

/// Deterministic label used when the LLM is unavailable. Prefers the most
/// common shared location across the sample; otherwise falls back to a
/// generic "{Category} Collection".
pub fn fallback_label(category: ContentCategory, samples: &[SampleMember]) -> ClusterLabel {
    let shared_location = samples
        .iter()
        .flat_map(|s| s.locations.first().cloned())
        .next();

    match shared_location {
        Some(location) => ClusterLabel {
            label: format!("{category} in {location}"),
            description: format!(
                "A collection of {category} items related to {location}."
            ),
        },
        None => ClusterLabel {
            label: format!("{category} Collection"),
            description: format!("A collection of related {category} items."),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(location: Option<&str>) -> SampleMember {
        SampleMember {
            topic_main: Some("ramen".to_string()),
            title: Some("Best ramen spot".to_string()),
            locations: location.map(|l| vec![l.to_string()]).unwrap_or_default(),
            subcategories: vec![],
        }
    }

    #[test]
    fn fallback_uses_shared_location_when_present() {
        let samples = vec![sample(Some("Indiranagar")), sample(Some("Indiranagar"))];
        let label = fallback_label(ContentCategory::Food, &samples);
        assert_eq!(label.label, "Food in Indiranagar");
    }

    #[test]
    fn fallback_uses_generic_collection_when_no_location() {
        let samples = vec![sample(None)];
        let label = fallback_label(ContentCategory::Food, &samples);
        assert_eq!(label.label, "Food Collection");
    }

    #[test]
    fn fallback_is_fully_deterministic() {
        let samples = vec![sample(Some("Koramangala"))];
        let a = fallback_label(ContentCategory::Travel, &samples);
        let b = fallback_label(ContentCategory::Travel, &samples);
        assert_eq!(a.label, b.label);
        assert_eq!(a.description, b.description);
    }
}
