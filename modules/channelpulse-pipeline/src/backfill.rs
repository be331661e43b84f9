//! Checkpointed historical backfill.

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use channelpulse_common::{CrawlError, CrawlResult};

use crate::crawler::Crawler;
use crate::summary::{BackfillLimit, BackfillSummary, CrawlSummary, VideoFailure};
use crate::traits::{ChannelStore, VideoSource};

impl Crawler {
    /// Walk the channel's upload history page by page, crawling each video
    /// without notifications.
    ///
    /// Unbounded runs (`limit = All`) resume from the checkpoint under
    /// `backfill:<channel_id>` and persist the cursor after every page, so a
    /// crash re-crawls at most one page (idempotently). Bounded runs never
    /// touch the checkpoint: differently-sized manual runs would only stale
    /// the stored cursor.
    pub async fn backfill_channel(
        &self,
        channel_id: Option<&str>,
        limit: BackfillLimit,
        concurrency: usize,
    ) -> CrawlResult<BackfillSummary> {
        limit.validate()?;
        if concurrency == 0 {
            return Err(CrawlError::InvalidInput(
                "backfill concurrency must be at least 1".to_string(),
            ));
        }

        let channel = channel_id.unwrap_or(&self.profile.channel_id).to_string();
        info!(channel = channel.as_str(), %limit, "Starting backfill");

        let playlist_id = self.videos.uploads_playlist_id(&channel).await?;
        let checkpoint_key = format!("backfill:{channel}");

        let mut cursor: Option<String> = match limit {
            BackfillLimit::All => {
                let checkpoint = self.store.checkpoint(&checkpoint_key).await?;
                if let Some(ref cp) = checkpoint {
                    info!(
                        cursor = cp.cursor.as_deref().unwrap_or("<start>"),
                        "Resuming backfill from checkpoint"
                    );
                }
                checkpoint.and_then(|c| c.cursor)
            }
            BackfillLimit::Count(_) => None,
        };

        let mut remaining: Option<usize> = match limit {
            BackfillLimit::All => None,
            BackfillLimit::Count(n) => Some(n as usize),
        };

        let mut summary = BackfillSummary::default();

        loop {
            let page = self
                .videos
                .playlist_page(&playlist_id, cursor.as_deref())
                .await?;

            let take = remaining
                .unwrap_or(page.video_ids.len())
                .min(page.video_ids.len());
            let slice: Vec<String> = page.video_ids.iter().take(take).cloned().collect();

            let outcomes: Vec<(String, CrawlResult<CrawlSummary>)> =
                stream::iter(slice.into_iter().map(|id| async move {
                    let result = self.crawl_video(&id, false).await;
                    (id, result)
                }))
                .buffer_unordered(concurrency)
                .collect()
                .await;

            for (id, outcome) in outcomes {
                match outcome {
                    Ok(_) => summary.videos_crawled += 1,
                    Err(e) => {
                        warn!(video_id = id.as_str(), error = %e, "Backfill crawl failed");
                        summary.failed += 1;
                        summary.failures.push(VideoFailure {
                            video_id: id,
                            message: e.to_string(),
                        });
                    }
                }
            }

            if let Some(ref mut quota) = remaining {
                *quota = quota.saturating_sub(take);
            }

            cursor = page.next_cursor;

            if limit == BackfillLimit::All {
                let meta = serde_json::json!({
                    "channel_id": channel,
                    "uploads_playlist_id": playlist_id,
                    "limit": limit.to_string(),
                });
                self.store
                    .save_checkpoint(&checkpoint_key, cursor.as_deref(), &meta)
                    .await?;
            }

            // No next token (including an empty final page) or quota spent.
            if cursor.is_none() || remaining == Some(0) {
                break;
            }
        }

        summary.next_cursor = cursor;
        info!("{summary}");
        Ok(summary)
    }
}
