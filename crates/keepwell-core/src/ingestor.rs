use async_trait::async_trait;

use crate::error::CoreResult;

/// Platform-agnostic metadata pulled from a saved URL before analysis.
///
/// Fields are best-effort: a platform-specific ingestor fills in what it can
/// scrape or fetch from the page and leaves the rest `None`.
#[derive(Debug, Clone, Default)]
pub struct RawPage {
    pub title: Option<String>,
    pub caption: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<i32>,
    pub content_text: Option<String>,
}

/// Fetches raw metadata for a saved URL.
///
/// Narrower than a general-purpose web ingestor: there is no discovery or
/// crawling here, only a single best-effort fetch per save.
#[async_trait]
pub trait Ingestor: Send + Sync {
    async fn fetch_metadata(&self, url: &str) -> CoreResult<RawPage>;
}
