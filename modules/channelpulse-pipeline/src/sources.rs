//! Bindings from the concrete clients to the pipeline's seam traits.
//!
//! Each client keeps its own error enum; the mappings here translate those
//! into `CrawlError` without collapsing the kinds the orchestrator branches
//! on.

use async_trait::async_trait;

use channelpulse_common::{ChannelProfile, CommentFlags, CrawlError, CrawlResult};
use channelpulse_enrich::{EnrichError, EnrichmentService, SponsorVerdict};
use tubedata_client::{CommentBatch, FeedReader, PlaylistPage, TubeClient, TubeError, VideoData};
use xpost_client::{ParsedPost, PostMetrics, XpostClient, XpostError};

use crate::traits::{CommentContext, Enricher, FeedSource, MetricsSource, VideoSource};

fn map_tube(err: TubeError) -> CrawlError {
    match err {
        TubeError::MissingApiKey => {
            CrawlError::MissingCredentials("content API key".to_string())
        }
        TubeError::NotFound(what) => CrawlError::NotFound(what),
        other => CrawlError::Upstream(other.to_string()),
    }
}

fn map_xpost(err: XpostError) -> CrawlError {
    match err {
        XpostError::MissingToken => {
            CrawlError::MissingCredentials("social-metrics bearer token".to_string())
        }
        other => CrawlError::Upstream(other.to_string()),
    }
}

fn map_enrich(err: EnrichError) -> CrawlError {
    match err {
        EnrichError::MissingApiKey => {
            CrawlError::MissingCredentials("AI provider key".to_string())
        }
        EnrichError::Request(msg) => CrawlError::Enrichment(msg),
    }
}

#[async_trait]
impl VideoSource for TubeClient {
    async fn video_by_id(&self, video_id: &str) -> CrawlResult<Option<VideoData>> {
        TubeClient::video_by_id(self, video_id).await.map_err(map_tube)
    }

    async fn top_level_comments(&self, video_id: &str, cap: usize) -> CrawlResult<CommentBatch> {
        TubeClient::top_level_comments(self, video_id, cap)
            .await
            .map_err(map_tube)
    }

    async fn uploads_playlist_id(&self, channel_id: &str) -> CrawlResult<String> {
        TubeClient::uploads_playlist_id(self, channel_id)
            .await
            .map_err(map_tube)
    }

    async fn playlist_page(
        &self,
        playlist_id: &str,
        cursor: Option<&str>,
    ) -> CrawlResult<PlaylistPage> {
        TubeClient::playlist_page(self, playlist_id, cursor)
            .await
            .map_err(map_tube)
    }
}

#[async_trait]
impl FeedSource for FeedReader {
    async fn video_ids(&self, channel_id: &str) -> CrawlResult<Vec<String>> {
        FeedReader::video_ids(self, channel_id).await.map_err(map_tube)
    }
}

#[async_trait]
impl MetricsSource for XpostClient {
    fn parse_post_url(&self, url: &str) -> Option<ParsedPost> {
        XpostClient::parse_post_url(self, url)
    }

    async fn post_metrics(&self, post_id: &str) -> CrawlResult<PostMetrics> {
        XpostClient::post_metrics(self, post_id)
            .await
            .map_err(map_xpost)
    }
}

#[async_trait]
impl Enricher for EnrichmentService {
    async fn extract_sponsor(
        &self,
        title: &str,
        description: &str,
        profile: &ChannelProfile,
    ) -> CrawlResult<SponsorVerdict> {
        EnrichmentService::extract_sponsor(
            self,
            title,
            description,
            &profile.sponsor_prompt,
            &profile.no_sponsor_key,
        )
        .await
        .map_err(map_enrich)
    }

    async fn classify_comment(&self, ctx: &CommentContext<'_>) -> CrawlResult<CommentFlags> {
        let judgment = EnrichmentService::classify_comment(
            self,
            &channelpulse_enrich::CommentContext {
                video_title: ctx.video_title,
                video_description: ctx.video_description,
                author: ctx.author,
                text: ctx.text,
            },
        )
        .await
        .map_err(map_enrich)?;

        Ok(CommentFlags {
            is_editing_mistake: Some(judgment.is_editing_mistake),
            is_sponsor_mention: Some(judgment.is_sponsor_mention),
            is_question: Some(judgment.is_question),
            is_positive: Some(judgment.is_positive_comment),
        })
    }
}
