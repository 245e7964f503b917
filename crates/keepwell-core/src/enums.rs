use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform a saved URL originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "source_platform", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SourcePlatform {
    Instagram,
    Youtube,
    Unknown,
}

impl SourcePlatform {
    /// Detect a platform from a (not-yet-normalised) URL's host.
    pub fn detect(url: &url::Url) -> Self {
        let host = url.host_str().unwrap_or("").trim_start_matches("www.");
        if host.contains("instagram.com") {
            SourcePlatform::Instagram
        } else if host.contains("youtube.com") || host.contains("youtu.be") {
            SourcePlatform::Youtube
        } else {
            SourcePlatform::Unknown
        }
    }
}

/// SharedContent processing lifecycle. Transitions only move forward;
/// READY and FAILED are terminal from the pipeline's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "item_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemStatus {
    Pending,
    Processing,
    Ready,
    Failed,
}

/// The closed set of content categories. Assigned once, at the
/// PROCESSING -> READY transition, and immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "content_category", rename_all = "PascalCase")]
#[serde(rename_all = "PascalCase")]
pub enum ContentCategory {
    Travel,
    Food,
    Learning,
    Career,
    Fitness,
    Entertainment,
    Shopping,
    Tech,
    Lifestyle,
    Misc,
}

impl ContentCategory {
    pub const ALL: [ContentCategory; 10] = [
        ContentCategory::Travel,
        ContentCategory::Food,
        ContentCategory::Learning,
        ContentCategory::Career,
        ContentCategory::Fitness,
        ContentCategory::Entertainment,
        ContentCategory::Shopping,
        ContentCategory::Tech,
        ContentCategory::Lifestyle,
        ContentCategory::Misc,
    ];
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContentCategory::Travel => "Travel",
            ContentCategory::Food => "Food",
            ContentCategory::Learning => "Learning",
            ContentCategory::Career => "Career",
            ContentCategory::Fitness => "Fitness",
            ContentCategory::Entertainment => "Entertainment",
            ContentCategory::Shopping => "Shopping",
            ContentCategory::Tech => "Tech",
            ContentCategory::Lifestyle => "Lifestyle",
            ContentCategory::Misc => "Misc",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownCategory;

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("category is not in the enumerated set")
    }
}

impl FromStr for ContentCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.to_string().eq_ignore_ascii_case(s))
            .ok_or(UnknownCategory)
    }
}

/// Likely intent behind a piece of saved content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "content_intent", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContentIntent {
    Learn,
    Visit,
    Buy,
    Try,
    Watch,
    Misc,
}

/// ProcessingJob audit status. Not consulted for scheduling — the queue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "job_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_instagram() {
        let url = url::Url::parse("https://www.instagram.com/p/XYZ/").unwrap();
        assert_eq!(SourcePlatform::detect(&url), SourcePlatform::Instagram);
    }

    #[test]
    fn detects_youtube_short_domain() {
        let url = url::Url::parse("https://youtu.be/abc123").unwrap();
        assert_eq!(SourcePlatform::detect(&url), SourcePlatform::Youtube);
    }

    #[test]
    fn unrecognised_domain_is_unknown() {
        let url = url::Url::parse("https://example.com/post/1").unwrap();
        assert_eq!(SourcePlatform::detect(&url), SourcePlatform::Unknown);
    }

    #[test]
    fn category_round_trips_through_display_and_from_str() {
        for cat in ContentCategory::ALL {
            assert_eq!(cat.to_string().parse::<ContentCategory>().unwrap(), cat);
        }
    }

    #[test]
    fn rejects_category_outside_the_closed_set() {
        assert!("Gardening".parse::<ContentCategory>().is_err());
    }
}
