pub mod error;

pub use error::{Result, WebhookError};

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

const MAX_ATTEMPTS: u32 = 3;
const RETRY_BASE: Duration = Duration::from_millis(500);

/// A rich embed announcing a published video.
#[derive(Debug, Clone, Serialize)]
pub struct VideoEmbed {
    pub title: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub channel_name: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// Delivery client for one webhook URL. A missing or empty URL means the
/// channel is disabled: sends succeed without doing anything.
pub struct WebhookClient {
    http: reqwest::Client,
    url: Option<String>,
}

impl WebhookClient {
    pub fn new(url: Option<&str>) -> Self {
        let url = url.filter(|u| !u.is_empty()).map(String::from);
        if url.is_none() {
            debug!("Webhook URL not set, deliveries disabled");
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to build webhook HTTP client");
        Self { http, url }
    }

    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    /// Deliver the video-live embed. No-op when disabled.
    pub async fn send_video_embed(&self, embed: &VideoEmbed) -> Result<()> {
        let payload = serde_json::json!({
            "embeds": [{
                "title": embed.title,
                "url": embed.url,
                "author": { "name": embed.channel_name },
                "thumbnail": embed.thumbnail_url.as_ref().map(|u| serde_json::json!({ "url": u })),
                "timestamp": embed.published_at,
            }]
        });
        self.send_json(&payload).await
    }

    /// POST an arbitrary JSON payload, retrying transient failures. No-op
    /// when disabled.
    pub async fn send_json(&self, payload: &serde_json::Value) -> Result<()> {
        let Some(ref url) = self.url else {
            return Ok(());
        };

        for attempt in 0..MAX_ATTEMPTS {
            let result = self.http.post(url).json(payload).send().await;

            let resp = match result {
                Ok(resp) => resp,
                Err(e) => {
                    if attempt + 1 < MAX_ATTEMPTS {
                        let backoff = RETRY_BASE * 2u32.pow(attempt);
                        let jitter = Duration::from_millis(rand::rng().random_range(0..250));
                        warn!(attempt = attempt + 1, error = %e, "Webhook send failed, backing off");
                        tokio::time::sleep(backoff + jitter).await;
                        continue;
                    }
                    return Err(e.into());
                }
            };

            let status = resp.status();
            if status.is_server_error() || status.as_u16() == 429 {
                if attempt + 1 < MAX_ATTEMPTS {
                    let backoff = RETRY_BASE * 2u32.pow(attempt);
                    let jitter = Duration::from_millis(rand::rng().random_range(0..250));
                    warn!(
                        status = status.as_u16(),
                        attempt = attempt + 1,
                        "Retryable webhook status, backing off"
                    );
                    tokio::time::sleep(backoff + jitter).await;
                    continue;
                }
            }
            if !status.is_success() {
                let message = resp.text().await.unwrap_or_default();
                return Err(WebhookError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            info!("Webhook delivered");
            return Ok(());
        }

        unreachable!("retry loop always returns")
    }
}
