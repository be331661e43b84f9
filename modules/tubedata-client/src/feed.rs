//! Syndication-feed discovery of newly published videos.
//!
//! The platform serves an unauthenticated Atom document per channel; entry
//! ids carry the video id. Plain XML, so no API key or quota involved.

use std::time::Duration;

use tracing::info;

use crate::error::{Result, TubeError};

const DEFAULT_FEED_BASE: &str = "https://www.tubedata.example/feeds/videos.xml";

pub struct FeedReader {
    http: reqwest::Client,
    base_url: String,
}

impl FeedReader {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to build feed HTTP client");
        Self {
            http,
            base_url: DEFAULT_FEED_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Fetch the channel's feed and return the discovered video ids,
    /// deduplicated, in first-seen order.
    pub async fn video_ids(&self, channel_id: &str) -> Result<Vec<String>> {
        let url = format!("{}?channel_id={}", self.base_url, channel_id);

        let resp = self
            .http
            .get(&url)
            .header("User-Agent", "channelpulse/0.1")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(TubeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = resp.bytes().await?;
        let feed = feed_rs::parser::parse(&bytes[..])
            .map_err(|e| TubeError::Parse(format!("feed parse failed: {e}")))?;

        let ids: Vec<String> = feed
            .entries
            .iter()
            .filter_map(|entry| extract_video_id(&entry.id))
            .collect();
        let ids = dedup_preserving_order(ids);

        info!(channel_id, videos = ids.len(), "Parsed channel feed");
        Ok(ids)
    }
}

impl Default for FeedReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Feed entry ids look like `yt:video:VIDEOID`. Fall back to the raw id when
/// it carries no namespace prefix.
fn extract_video_id(entry_id: &str) -> Option<String> {
    let id = entry_id.rsplit(':').next().unwrap_or(entry_id).trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

fn dedup_preserving_order(ids: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_namespaced_entry_id() {
        assert_eq!(extract_video_id("yt:video:abc123"), Some("abc123".to_string()));
    }

    #[test]
    fn extracts_bare_entry_id() {
        assert_eq!(extract_video_id("abc123"), Some("abc123".to_string()));
    }

    #[test]
    fn rejects_empty_entry_id() {
        assert_eq!(extract_video_id(""), None);
        assert_eq!(extract_video_id("yt:video:"), None);
    }

    #[test]
    fn dedup_keeps_first_seen_order() {
        let ids = vec![
            "b".to_string(),
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
            "a".to_string(),
        ];
        assert_eq!(dedup_preserving_order(ids), vec!["b", "a", "c"]);
    }
}
