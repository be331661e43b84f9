//! The crawl orchestrator.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use channelpulse_common::{
    notification_id, ChannelProfile, Comment, CommentFlags, CrawlError, CrawlResult,
    LinkedPostMetrics, SoftFailure, SoftStage, Sponsor, Video, CRAWL_CONCURRENCY,
    MAX_COMMENTS_PER_VIDEO, MAX_COMMENT_CLASSIFICATIONS_PER_CRAWL,
};
use tubedata_client::VideoData;

use crate::diff::diff_comments;
use crate::summary::{CrawlSummary, FeedSummary, VideoFailure};
use crate::traits::{
    Announcer, ChannelStore, CommentContext, Enricher, FeedSource, MetricsSource,
    NotificationKind, VideoSource,
};

/// One channel's pipeline. All collaborators are injected at construction;
/// multiple channels run as independent `Crawler` instances with no shared
/// state.
pub struct Crawler {
    pub(crate) store: Arc<dyn ChannelStore>,
    pub(crate) videos: Arc<dyn VideoSource>,
    pub(crate) feed: Arc<dyn FeedSource>,
    pub(crate) metrics: Arc<dyn MetricsSource>,
    pub(crate) enricher: Arc<dyn Enricher>,
    pub(crate) announcer: Arc<dyn Announcer>,
    pub(crate) profile: ChannelProfile,
}

impl Crawler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn ChannelStore>,
        videos: Arc<dyn VideoSource>,
        feed: Arc<dyn FeedSource>,
        metrics: Arc<dyn MetricsSource>,
        enricher: Arc<dyn Enricher>,
        announcer: Arc<dyn Announcer>,
        profile: ChannelProfile,
    ) -> Self {
        Self {
            store,
            videos,
            feed,
            metrics,
            enricher,
            announcer,
            profile,
        }
    }

    /// Sync one video: fetch, diff, persist, enrich, notify.
    ///
    /// Metadata fetch, comment fetch, and the core video/comment writes are
    /// fatal; linked-post refresh, sponsor extraction, classification, and
    /// notifications degrade to soft failures recorded in the summary.
    pub async fn crawl_video(
        &self,
        video_id: &str,
        send_notifications: bool,
    ) -> CrawlResult<CrawlSummary> {
        let video_id = video_id.trim();
        if video_id.is_empty() {
            return Err(CrawlError::InvalidInput("video id must not be empty".to_string()));
        }

        let mut summary = CrawlSummary::new(video_id);
        info!(video_id, "Crawling video");

        let data = self
            .videos
            .video_by_id(video_id)
            .await?
            .ok_or_else(|| CrawlError::NotFound(format!("video {video_id}")))?;

        let batch = self
            .videos
            .top_level_comments(video_id, MAX_COMMENTS_PER_VIDEO)
            .await?;
        summary.comments_fetched = batch.comments.len() as u32;
        summary.is_limited = batch.is_limited;

        // The prior row carries the linked-post URL; the fresh upsert must
        // not clobber it.
        let prior = self.store.video(video_id).await?;
        let video = video_from_data(&data);
        self.store.upsert_video(&video).await?;

        let existing = self.store.comments_for_video(video_id).await?;
        let diff = diff_comments(&existing, &batch.comments, batch.is_limited);

        for c in &diff.to_insert {
            self.store
                .insert_comment(&Comment {
                    id: c.id.clone(),
                    video_id: video_id.to_string(),
                    text: c.text.clone(),
                    author: c.author.clone(),
                    published_at: c.published_at,
                    like_count: c.like_count,
                    reply_count: c.reply_count,
                    flags: CommentFlags::default(),
                    processed: false,
                })
                .await?;
            summary.comments_inserted += 1;
        }
        for c in &diff.to_update_counts {
            self.store
                .update_comment_counts(&c.id, c.like_count, c.reply_count)
                .await?;
            summary.comments_updated += 1;
        }
        for c in &diff.to_update_text {
            self.store
                .update_comment_text(&c.id, &c.text, c.like_count, c.reply_count)
                .await?;
            summary.comments_updated += 1;
        }
        summary.comments_deleted = self
            .store
            .delete_comments(video_id, &diff.to_delete)
            .await? as u32;

        self.refresh_linked_post(video_id, prior.as_ref(), &mut summary)
            .await;
        self.relink_sponsor(video_id, &data, &mut summary).await;
        self.classify_pending(video_id, &data, &mut summary).await;

        if send_notifications {
            self.notify_live(video_id, &video, &mut summary).await;
        }

        info!(video_id, "{summary}");
        Ok(summary)
    }

    /// Step 5: refresh cached metrics for a previously linked social post.
    /// A stored link that no longer parses is a soft failure here, not the
    /// `InvalidLinkedUrl` rejection reserved for explicit link requests.
    async fn refresh_linked_post(
        &self,
        video_id: &str,
        prior: Option<&Video>,
        summary: &mut CrawlSummary,
    ) {
        let Some(url) = prior.and_then(|p| p.linked_post_url.clone()) else {
            return;
        };

        let Some(parsed) = self.metrics.parse_post_url(&url) else {
            summary.push_soft(SoftFailure {
                stage: SoftStage::LinkedPost,
                message: format!("stored link no longer parses: {url}"),
            });
            return;
        };

        match self.metrics.post_metrics(&parsed.post_id).await {
            Ok(m) => {
                let metrics = LinkedPostMetrics {
                    views: m.views,
                    likes: m.likes,
                    reposts: m.reposts,
                    replies: m.replies,
                };
                if let Err(e) = self
                    .store
                    .set_linked_post_metrics(video_id, &parsed.canonical_url, &metrics)
                    .await
                {
                    summary.push_soft(SoftFailure {
                        stage: SoftStage::LinkedPost,
                        message: e.to_string(),
                    });
                }
            }
            Err(e) => {
                warn!(video_id, error = %e, "Linked-post metrics refresh failed");
                summary.push_soft(SoftFailure {
                    stage: SoftStage::LinkedPost,
                    message: e.to_string(),
                });
            }
        }
    }

    /// Step 6: run sponsor extraction and replace the video's linkage.
    /// Extraction failure leaves the existing linkage untouched; an explicit
    /// no-sponsor verdict clears it.
    async fn relink_sponsor(&self, video_id: &str, data: &VideoData, summary: &mut CrawlSummary) {
        let verdict = match self
            .enricher
            .extract_sponsor(&data.title, &data.description, &self.profile)
            .await
        {
            Ok(v) => v,
            Err(e) => {
                warn!(video_id, error = %e, "Sponsor extraction failed, linkage untouched");
                summary.push_soft(SoftFailure {
                    stage: SoftStage::Sponsor,
                    message: e.to_string(),
                });
                return;
            }
        };

        let sponsor = match (&verdict.name, &verdict.key) {
            (Some(name), Some(key)) if verdict.has_sponsor => {
                Some(Sponsor::from_normalized(name, key))
            }
            _ => None,
        };

        if let Err(e) = self
            .store
            .replace_sponsor_links(video_id, sponsor.as_ref())
            .await
        {
            summary.push_soft(SoftFailure {
                stage: SoftStage::Sponsor,
                message: e.to_string(),
            });
        }
    }

    /// Step 7: classify pending comments, strictly one at a time. The outer
    /// crawl fan-out is bounded separately; keeping this sequential bounds
    /// burst load on the AI provider no matter how many workers run.
    async fn classify_pending(&self, video_id: &str, data: &VideoData, summary: &mut CrawlSummary) {
        let pending = match self
            .store
            .unprocessed_comments(video_id, MAX_COMMENT_CLASSIFICATIONS_PER_CRAWL)
            .await
        {
            Ok(pending) => pending,
            Err(e) => {
                summary.push_soft(SoftFailure {
                    stage: SoftStage::Classification,
                    message: e.to_string(),
                });
                return;
            }
        };

        for comment in pending {
            let ctx = CommentContext {
                video_title: &data.title,
                video_description: &data.description,
                author: &comment.author,
                text: &comment.text,
            };
            match self.enricher.classify_comment(&ctx).await {
                Ok(flags) => match self.store.set_comment_flags(&comment.id, &flags).await {
                    Ok(()) => summary.comments_classified += 1,
                    Err(e) => summary.push_soft(SoftFailure {
                        stage: SoftStage::Classification,
                        message: format!("comment {}: {e}", comment.id),
                    }),
                },
                // Stays unprocessed; a later crawl picks it up.
                Err(e) => summary.push_soft(SoftFailure {
                    stage: SoftStage::Classification,
                    message: format!("comment {}: {e}", comment.id),
                }),
            }
        }
    }

    /// Step 8: deterministic-keyed notification rows, delivery only for rows
    /// that were genuinely new.
    async fn notify_live(&self, video_id: &str, video: &Video, summary: &mut CrawlSummary) {
        for kind in NotificationKind::ALL {
            let id = notification_id(kind.as_str(), video_id);
            match self.store.insert_notification(&id, kind.as_str(), video_id).await {
                Ok(true) => {
                    summary.notifications_inserted += 1;
                    if let Err(e) = self.announcer.announce(kind, video, &self.profile).await {
                        summary.push_soft(SoftFailure {
                            stage: SoftStage::Notification,
                            message: format!("{}: {e}", kind.as_str()),
                        });
                    }
                }
                Ok(false) => {
                    debug!(video_id, kind = kind.as_str(), "Notification already sent");
                }
                Err(e) => summary.push_soft(SoftFailure {
                    stage: SoftStage::Notification,
                    message: format!("{}: {e}", kind.as_str()),
                }),
            }
        }
    }

    /// Link a social post to a video and cache its metrics.
    ///
    /// This is the explicit-request path: an unparseable or non-allow-listed
    /// URL is rejected as `InvalidLinkedUrl` here, unlike the crawl-time
    /// refresh of an already-stored link, which degrades to a soft failure.
    pub async fn link_post(&self, video_id: &str, url: &str) -> CrawlResult<LinkedPostMetrics> {
        let video_id = video_id.trim();
        if video_id.is_empty() {
            return Err(CrawlError::InvalidInput("video id must not be empty".to_string()));
        }

        let parsed = self
            .metrics
            .parse_post_url(url)
            .ok_or_else(|| CrawlError::InvalidLinkedUrl(url.to_string()))?;

        self.store
            .video(video_id)
            .await?
            .ok_or_else(|| CrawlError::NotFound(format!("video {video_id}")))?;

        let m = self.metrics.post_metrics(&parsed.post_id).await?;
        let metrics = LinkedPostMetrics {
            views: m.views,
            likes: m.likes,
            reposts: m.reposts,
            replies: m.replies,
        };
        self.store
            .set_linked_post_metrics(video_id, &parsed.canonical_url, &metrics)
            .await?;

        info!(video_id, post_id = parsed.post_id.as_str(), "Linked social post");
        Ok(metrics)
    }

    /// Discover new videos from the channel feed and crawl each with
    /// notifications enabled. One video's fatal failure never aborts the
    /// batch.
    pub async fn crawl_feed(&self, channel_id: Option<&str>) -> CrawlResult<FeedSummary> {
        let channel = channel_id.unwrap_or(&self.profile.channel_id);
        info!(channel, "Starting feed crawl");

        let ids = self.feed.video_ids(channel).await?;

        let mut summary = FeedSummary {
            videos_discovered: ids.len() as u32,
            ..Default::default()
        };

        let outcomes: Vec<(String, CrawlResult<CrawlSummary>)> =
            stream::iter(ids.into_iter().map(|id| async move {
                let result = self.crawl_video(&id, true).await;
                (id, result)
            }))
            .buffer_unordered(CRAWL_CONCURRENCY)
            .collect()
            .await;

        for (id, outcome) in outcomes {
            match outcome {
                Ok(_) => summary.crawled += 1,
                Err(e) => {
                    warn!(video_id = id.as_str(), error = %e, "Video crawl failed");
                    summary.failed += 1;
                    summary.failures.push(VideoFailure {
                        video_id: id,
                        message: e.to_string(),
                    });
                }
            }
        }

        info!("{summary}");
        Ok(summary)
    }
}

/// The persisted shape of a freshly fetched video. Linked-post fields are
/// left empty; the store preserves the stored URL across upserts and metrics
/// are only written by the refresh step.
fn video_from_data(data: &VideoData) -> Video {
    Video {
        id: data.id.clone(),
        channel_id: data.channel_id.clone(),
        title: data.title.clone(),
        description: data.description.clone(),
        thumbnail_url: data.thumbnail_url.clone(),
        published_at: data.published_at,
        view_count: data.view_count,
        like_count: data.like_count,
        comment_count: data.comment_count,
        linked_post_url: None,
        linked_post_metrics: LinkedPostMetrics::default(),
    }
}
