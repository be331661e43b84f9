//! Seam traits for the crawl pipeline.
//!
//! The orchestrator only sees these; the concrete HTTP clients and the
//! Postgres store are bound in `sources.rs` / `persist.rs`, and tests swap in
//! scripted stubs and the in-memory store. Every method returns `CrawlError`
//! so the kind (missing credentials / not found / transient / validation)
//! survives the seam.

use async_trait::async_trait;

use channelpulse_common::{
    ChannelProfile, Checkpoint, Comment, CommentFlags, CrawlResult, LinkedPostMetrics, Sponsor,
    Video,
};
use channelpulse_enrich::SponsorVerdict;
use tubedata_client::{CommentBatch, PlaylistPage, VideoData};
use xpost_client::{ParsedPost, PostMetrics};

/// The upstream content API: video metadata, comment threads, channel
/// history pagination.
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// `Ok(None)` when the API answered but knows no such video.
    async fn video_by_id(&self, video_id: &str) -> CrawlResult<Option<VideoData>>;

    /// Up to `cap` top-level comments; the batch records whether the cap
    /// truncated pagination.
    async fn top_level_comments(&self, video_id: &str, cap: usize) -> CrawlResult<CommentBatch>;

    async fn uploads_playlist_id(&self, channel_id: &str) -> CrawlResult<String>;

    async fn playlist_page(
        &self,
        playlist_id: &str,
        cursor: Option<&str>,
    ) -> CrawlResult<PlaylistPage>;
}

/// New-video discovery via the channel's syndication feed.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Video ids, deduplicated, in first-seen order.
    async fn video_ids(&self, channel_id: &str) -> CrawlResult<Vec<String>>;
}

/// The linked social platform's public metrics.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// None is "no match" (bad host or shape), not an error.
    fn parse_post_url(&self, url: &str) -> Option<ParsedPost>;

    async fn post_metrics(&self, post_id: &str) -> CrawlResult<PostMetrics>;
}

/// Everything the classifier sees about one comment.
#[derive(Debug, Clone, Copy)]
pub struct CommentContext<'a> {
    pub video_title: &'a str,
    pub video_description: &'a str,
    pub author: &'a str,
    pub text: &'a str,
}

/// AI enrichment: sponsor extraction and comment classification.
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn extract_sponsor(
        &self,
        title: &str,
        description: &str,
        profile: &ChannelProfile,
    ) -> CrawlResult<SponsorVerdict>;

    async fn classify_comment(&self, ctx: &CommentContext<'_>) -> CrawlResult<CommentFlags>;
}

/// The two video-live notification channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Chat,
    Tracker,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 2] = [NotificationKind::Chat, NotificationKind::Tracker];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Chat => "discord",
            NotificationKind::Tracker => "tracker",
        }
    }
}

/// Outbound delivery of a video-live event. Implementations are
/// fire-and-forget; the dedupe-by-key lives in the store, not here.
#[async_trait]
pub trait Announcer: Send + Sync {
    async fn announce(
        &self,
        kind: NotificationKind,
        video: &Video,
        profile: &ChannelProfile,
    ) -> CrawlResult<()>;
}

/// Persistence as the orchestrator sees it: the five entities plus the
/// checkpoint table.
#[async_trait]
pub trait ChannelStore: Send + Sync {
    async fn upsert_video(&self, v: &Video) -> CrawlResult<()>;
    async fn video(&self, id: &str) -> CrawlResult<Option<Video>>;
    async fn set_linked_post_metrics(
        &self,
        video_id: &str,
        url: &str,
        m: &LinkedPostMetrics,
    ) -> CrawlResult<()>;

    async fn comments_for_video(&self, video_id: &str) -> CrawlResult<Vec<Comment>>;
    async fn insert_comment(&self, c: &Comment) -> CrawlResult<()>;
    async fn update_comment_counts(
        &self,
        id: &str,
        like_count: i64,
        reply_count: i64,
    ) -> CrawlResult<()>;
    async fn update_comment_text(
        &self,
        id: &str,
        text: &str,
        like_count: i64,
        reply_count: i64,
    ) -> CrawlResult<()>;
    async fn delete_comments(&self, video_id: &str, ids: &[String]) -> CrawlResult<u64>;
    async fn unprocessed_comments(&self, video_id: &str, limit: usize) -> CrawlResult<Vec<Comment>>;
    async fn set_comment_flags(&self, id: &str, flags: &CommentFlags) -> CrawlResult<()>;

    async fn replace_sponsor_links(
        &self,
        video_id: &str,
        sponsor: Option<&Sponsor>,
    ) -> CrawlResult<()>;

    /// Insert-or-ignore by deterministic id; true when the row was new.
    async fn insert_notification(&self, id: &str, kind: &str, video_id: &str) -> CrawlResult<bool>;

    async fn checkpoint(&self, key: &str) -> CrawlResult<Option<Checkpoint>>;
    async fn save_checkpoint(
        &self,
        key: &str,
        cursor: Option<&str>,
        meta: &serde_json::Value,
    ) -> CrawlResult<()>;
}
