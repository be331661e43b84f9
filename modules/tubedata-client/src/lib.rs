pub mod error;
pub mod feed;
pub mod types;

pub use error::{Result, TubeError};
pub use feed::FeedReader;
pub use types::{CommentBatch, CommentData, PlaylistPage, VideoData};

use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use types::{
    ChannelListResponse, CommentThreadListResponse, PlaylistItemListResponse, VideoListResponse,
};

const DEFAULT_BASE_URL: &str = "https://api.tubedata.example/v3";

/// Comment pages are requested at this size; the API caps maxResults at 100.
const COMMENT_PAGE_SIZE: usize = 100;

/// Playlist pages come back 50 items at a time.
const PLAYLIST_PAGE_SIZE: usize = 50;

/// Max attempts per logical call. Transient failures (network, 5xx, 429) are
/// retried with exponential backoff plus jitter; everything else returns on
/// the first attempt.
const MAX_ATTEMPTS: u32 = 3;
const RETRY_BASE: Duration = Duration::from_millis(500);

pub struct TubeClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl TubeClient {
    pub fn new(api_key: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            http,
            api_key: api_key.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn key(&self) -> Result<&str> {
        if self.api_key.is_empty() {
            return Err(TubeError::MissingApiKey);
        }
        Ok(&self.api_key)
    }

    /// GET with the retry budget applied. Returns the final response whatever
    /// its status; per-endpoint status handling happens at the call site.
    async fn get_with_retry(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<reqwest::Response> {
        let url = format!("{}/{}", self.base_url, path);

        for attempt in 0..MAX_ATTEMPTS {
            let result = self.http.get(&url).query(query).send().await;

            match result {
                Ok(resp) => {
                    let status = resp.status();
                    let retryable = status.is_server_error() || status.as_u16() == 429;
                    if retryable && attempt + 1 < MAX_ATTEMPTS {
                        let backoff = RETRY_BASE * 2u32.pow(attempt);
                        let jitter = Duration::from_millis(rand::rng().random_range(0..250));
                        warn!(
                            path,
                            status = status.as_u16(),
                            attempt = attempt + 1,
                            backoff_ms = backoff.as_millis() as u64,
                            "Retryable API status, backing off"
                        );
                        tokio::time::sleep(backoff + jitter).await;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(e) => {
                    if attempt + 1 < MAX_ATTEMPTS {
                        let backoff = RETRY_BASE * 2u32.pow(attempt);
                        let jitter = Duration::from_millis(rand::rng().random_range(0..250));
                        warn!(
                            path,
                            attempt = attempt + 1,
                            backoff_ms = backoff.as_millis() as u64,
                            error = %e,
                            "Request failed, backing off"
                        );
                        tokio::time::sleep(backoff + jitter).await;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }

        unreachable!("retry loop always returns")
    }

    /// Fetch one video's live metadata. `Ok(None)` means the API answered but
    /// knows no such video.
    pub async fn video_by_id(&self, video_id: &str) -> Result<Option<VideoData>> {
        let key = self.key()?;
        debug!(video_id, "Fetching video metadata");

        let resp = self
            .get_with_retry(
                "videos",
                &[
                    ("key", key),
                    ("id", video_id),
                    ("part", "snippet,statistics"),
                ],
            )
            .await?;

        let status = resp.status();
        if status.as_u16() == 404 {
            return Err(TubeError::NotFound(video_id.to_string()));
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(TubeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: VideoListResponse = resp
            .json()
            .await
            .map_err(|e| TubeError::Parse(e.to_string()))?;

        Ok(body.items.into_iter().next().map(|i| i.into_video_data()))
    }

    /// Fetch up to `cap` top-level comments, paginating until the cap or the
    /// thread is exhausted. A thread with comments disabled comes back as an
    /// empty successful batch, not an error.
    pub async fn top_level_comments(&self, video_id: &str, cap: usize) -> Result<CommentBatch> {
        let key = self.key()?;

        let mut comments = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let remaining = cap.saturating_sub(comments.len());
            if remaining == 0 {
                // Cap hit with upstream possibly holding more.
                return Ok(CommentBatch {
                    comments,
                    is_limited: true,
                });
            }

            let page_size = remaining.min(COMMENT_PAGE_SIZE);
            let page_size_str = page_size.to_string();
            let mut query = vec![
                ("key", key),
                ("videoId", video_id),
                ("part", "snippet"),
                ("order", "time"),
                ("maxResults", page_size_str.as_str()),
            ];
            if let Some(ref token) = page_token {
                query.push(("pageToken", token.as_str()));
            }

            let resp = self.get_with_retry("commentThreads", &query).await?;
            let status = resp.status();
            if !status.is_success() {
                let message = resp.text().await.unwrap_or_default();
                if status.as_u16() == 403 && message.contains("commentsDisabled") {
                    debug!(video_id, "Comments disabled, returning empty batch");
                    return Ok(CommentBatch::default());
                }
                if status.as_u16() == 404 {
                    return Err(TubeError::NotFound(video_id.to_string()));
                }
                return Err(TubeError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body: CommentThreadListResponse = resp
                .json()
                .await
                .map_err(|e| TubeError::Parse(e.to_string()))?;

            let fetched = body.items.len();
            comments.extend(body.items.into_iter().map(|t| t.into_comment_data()));

            // A short page or a missing continuation token means the thread
            // is exhausted.
            match body.next_page_token {
                Some(token) if fetched == page_size => page_token = Some(token),
                _ => {
                    debug!(video_id, total = comments.len(), "Comment thread exhausted");
                    return Ok(CommentBatch {
                        comments,
                        is_limited: false,
                    });
                }
            }
        }
    }

    /// Resolve a channel's uploads playlist id.
    pub async fn uploads_playlist_id(&self, channel_id: &str) -> Result<String> {
        let key = self.key()?;
        debug!(channel_id, "Resolving uploads playlist");

        let resp = self
            .get_with_retry(
                "channels",
                &[("key", key), ("id", channel_id), ("part", "contentDetails")],
            )
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            if status.as_u16() == 404 {
                return Err(TubeError::NotFound(channel_id.to_string()));
            }
            return Err(TubeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChannelListResponse = resp
            .json()
            .await
            .map_err(|e| TubeError::Parse(e.to_string()))?;

        body.items
            .into_iter()
            .next()
            .and_then(|ch| ch.content_details)
            .and_then(|cd| cd.related_playlists)
            .and_then(|rp| rp.uploads)
            .ok_or_else(|| TubeError::NotFound(format!("uploads playlist for {channel_id}")))
    }

    /// Fetch one page of a playlist. The caller owns the walk; the returned
    /// cursor (if any) fetches the next page.
    pub async fn playlist_page(
        &self,
        playlist_id: &str,
        cursor: Option<&str>,
    ) -> Result<PlaylistPage> {
        let key = self.key()?;
        let page_size = PLAYLIST_PAGE_SIZE.to_string();

        let mut query = vec![
            ("key", key),
            ("playlistId", playlist_id),
            ("part", "contentDetails"),
            ("maxResults", page_size.as_str()),
        ];
        if let Some(token) = cursor {
            query.push(("pageToken", token));
        }

        let resp = self.get_with_retry("playlistItems", &query).await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            if status.as_u16() == 404 {
                return Err(TubeError::NotFound(playlist_id.to_string()));
            }
            return Err(TubeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: PlaylistItemListResponse = resp
            .json()
            .await
            .map_err(|e| TubeError::Parse(e.to_string()))?;

        let video_ids = body
            .items
            .into_iter()
            .filter_map(|i| i.content_details.map(|cd| cd.video_id))
            .collect::<Vec<_>>();

        debug!(
            playlist_id,
            items = video_ids.len(),
            has_next = body.next_page_token.is_some(),
            "Fetched playlist page"
        );

        Ok(PlaylistPage {
            video_ids,
            next_cursor: body.next_page_token,
        })
    }
}
