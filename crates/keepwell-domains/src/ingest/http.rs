use async_trait::async_trait;
use keepwell_core::error::{CoreError, CoreResult};
use keepwell_core::ingestor::{Ingestor, RawPage};

/// Best-effort metadata fetch via a single GET and regex-based meta tag
/// extraction. No link-following, no JS rendering — just the tags a saved
/// URL's page already exposes to link previews.
pub struct HttpIngestor {
    client: reqwest::Client,
    user_agent: String,
}

impl HttpIngestor {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            user_agent: "KeepwellBot/1.0".to_string(),
        }
    }

    fn meta_content(html: &str, property: &str) -> Option<String> {
        let pattern = format!(
            r#"<meta[^>]+(?:property|name)\s*=\s*["']{}["'][^>]+content\s*=\s*["']([^"']*)["']"#,
            regex::escape(property)
        );
        let re = regex::Regex::new(&pattern).ok()?;
        re.captures(html)
            .and_then(|c| c.get(1))
            .map(|m| html_unescape(m.as_str()))
            .filter(|s| !s.is_empty())
    }

    fn title_tag(html: &str) -> Option<String> {
        let re = regex::Regex::new(r"(?is)<title[^>]*>(.*?)</title>").ok()?;
        re.captures(html)
            .and_then(|c| c.get(1))
            .map(|m| html_unescape(m.as_str().trim()))
            .filter(|s| !s.is_empty())
    }

    fn duration_seconds(html: &str) -> Option<i32> {
        let re = regex::Regex::new(r#"<meta[^>]+itemprop\s*=\s*["']duration["'][^>]+content\s*=\s*["']PT(?:(\d+)M)?(?:(\d+)S)?["']"#).ok()?;
        let caps = re.captures(html)?;
        let minutes: i32 = caps.get(1).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
        let seconds: i32 = caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
        Some(minutes * 60 + seconds)
    }
}

fn html_unescape(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

#[async_trait]
impl Ingestor for HttpIngestor {
    async fn fetch_metadata(&self, url: &str) -> CoreResult<RawPage> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| CoreError::UnavailableExternal(format!("fetching {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(CoreError::UnavailableExternal(format!(
                "{url} returned {}",
                response.status()
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| CoreError::UnavailableExternal(format!("reading {url}: {e}")))?;

        let title = Self::meta_content(&html, "og:title").or_else(|| Self::title_tag(&html));
        let caption = Self::meta_content(&html, "og:description")
            .or_else(|| Self::meta_content(&html, "description"));
        let thumbnail_url = Self::meta_content(&html, "og:image");
        let duration_seconds = Self::duration_seconds(&html);

        Ok(RawPage {
            title,
            caption,
            description: None,
            thumbnail_url,
            duration_seconds,
            content_text: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_og_title() {
        let html = r#"<html><head><meta property="og:title" content="Best Ramen in Tokyo"></head></html>"#;
        assert_eq!(
            HttpIngestor::meta_content(html, "og:title"),
            Some("Best Ramen in Tokyo".to_string())
        );
    }

    #[test]
    fn falls_back_to_title_tag() {
        let html = "<html><head><title>Fallback Title</title></head></html>";
        assert_eq!(HttpIngestor::title_tag(html), Some("Fallback Title".to_string()));
    }

    #[test]
    fn parses_iso8601_duration() {
        let html = r#"<meta itemprop="duration" content="PT4M30S">"#;
        assert_eq!(HttpIngestor::duration_seconds(html), Some(270));
    }

    #[test]
    fn unescapes_html_entities() {
        let html = r#"<meta property="og:title" content="Rock &amp; Roll">"#;
        assert_eq!(
            HttpIngestor::meta_content(html, "og:title"),
            Some("Rock & Roll".to_string())
        );
    }
}
