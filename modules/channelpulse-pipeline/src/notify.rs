//! Webhook-backed delivery of video-live events.

use async_trait::async_trait;

use channelpulse_common::{ChannelProfile, CrawlError, CrawlResult, Video};
use discord_webhook::{VideoEmbed, WebhookClient};

use crate::traits::{Announcer, NotificationKind};

const WATCH_URL_BASE: &str = "https://www.tubedata.example/watch?v=";

/// Delivers to the chat webhook (rich embed) and the task tracker (plain
/// JSON task). Either client may be disabled; a disabled channel delivers
/// nothing and reports success.
pub struct WebhookAnnouncer {
    chat: WebhookClient,
    tracker: WebhookClient,
}

impl WebhookAnnouncer {
    pub fn new(chat_url: Option<&str>, tracker_url: Option<&str>) -> Self {
        Self {
            chat: WebhookClient::new(chat_url),
            tracker: WebhookClient::new(tracker_url),
        }
    }
}

#[async_trait]
impl Announcer for WebhookAnnouncer {
    async fn announce(
        &self,
        kind: NotificationKind,
        video: &Video,
        profile: &ChannelProfile,
    ) -> CrawlResult<()> {
        let watch_url = format!("{WATCH_URL_BASE}{}", video.id);

        match kind {
            NotificationKind::Chat => {
                let embed = VideoEmbed {
                    title: video.title.clone(),
                    url: watch_url,
                    thumbnail_url: video.thumbnail_url.clone(),
                    channel_name: profile.display_name.clone(),
                    published_at: video.published_at,
                };
                self.chat
                    .send_video_embed(&embed)
                    .await
                    .map_err(|e| CrawlError::Upstream(e.to_string()))
            }
            NotificationKind::Tracker => {
                let payload = serde_json::json!({
                    "title": format!("Video live: {}", video.title),
                    "description": watch_url,
                    "labels": ["video-live"],
                });
                self.tracker
                    .send_json(&payload)
                    .await
                    .map_err(|e| CrawlError::Upstream(e.to_string()))
            }
        }
    }
}
