//! Scripted stubs and a wired-up crawler for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use channelpulse_common::{
    ChannelProfile, CommentFlags, CrawlError, CrawlResult, Video,
};
use channelpulse_enrich::SponsorVerdict;
use channelpulse_pipeline::{
    Announcer, CommentContext, Crawler, Enricher, FeedSource, MemoryStore, MetricsSource,
    NotificationKind, VideoSource,
};
use tubedata_client::{CommentBatch, CommentData, PlaylistPage, VideoData};
use xpost_client::{ParsedPost, PostMetrics};

pub const CHANNEL_ID: &str = "UC123";
pub const UPLOADS_ID: &str = "UU123";

pub fn profile() -> ChannelProfile {
    ChannelProfile {
        channel_id: CHANNEL_ID.to_string(),
        display_name: "Example Channel".to_string(),
        sponsor_prompt: "Sponsor of {{title}}? {{description}}".to_string(),
        no_sponsor_key: "https://x.link/nothing".to_string(),
    }
}

pub fn video_data(id: &str) -> VideoData {
    VideoData {
        id: id.to_string(),
        channel_id: CHANNEL_ID.to_string(),
        title: format!("Video {id}"),
        description: format!("Description for {id}"),
        thumbnail_url: Some(format!("https://img.example/{id}.jpg")),
        published_at: None,
        view_count: 1000,
        like_count: 100,
        comment_count: 10,
    }
}

pub fn comment_data(id: &str, text: &str) -> CommentData {
    CommentData {
        id: id.to_string(),
        text: text.to_string(),
        author: "viewer".to_string(),
        published_at: None,
        like_count: 1,
        reply_count: 0,
    }
}

// ---------------------------------------------------------------------------
// Content API stub
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct StubVideoSource {
    videos: Mutex<HashMap<String, VideoData>>,
    comments: Mutex<HashMap<String, CommentBatch>>,
    pages: Mutex<HashMap<Option<String>, PlaylistPage>>,
    pub video_calls: AtomicU32,
    pub page_calls: AtomicU32,
}

impl StubVideoSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_video(&self, data: VideoData) {
        self.videos.lock().unwrap().insert(data.id.clone(), data);
    }

    pub fn set_comments(&self, video_id: &str, comments: Vec<CommentData>, is_limited: bool) {
        self.comments.lock().unwrap().insert(
            video_id.to_string(),
            CommentBatch {
                comments,
                is_limited,
            },
        );
    }

    /// Script the playlist page returned at a given cursor position.
    pub fn set_page(&self, cursor: Option<&str>, ids: &[&str], next_cursor: Option<&str>) {
        self.pages.lock().unwrap().insert(
            cursor.map(String::from),
            PlaylistPage {
                video_ids: ids.iter().map(|s| s.to_string()).collect(),
                next_cursor: next_cursor.map(String::from),
            },
        );
    }
}

#[async_trait]
impl VideoSource for StubVideoSource {
    async fn video_by_id(&self, video_id: &str) -> CrawlResult<Option<VideoData>> {
        self.video_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.videos.lock().unwrap().get(video_id).cloned())
    }

    async fn top_level_comments(&self, video_id: &str, _cap: usize) -> CrawlResult<CommentBatch> {
        Ok(self
            .comments
            .lock()
            .unwrap()
            .get(video_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn uploads_playlist_id(&self, _channel_id: &str) -> CrawlResult<String> {
        Ok(UPLOADS_ID.to_string())
    }

    async fn playlist_page(
        &self,
        _playlist_id: &str,
        cursor: Option<&str>,
    ) -> CrawlResult<PlaylistPage> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .lock()
            .unwrap()
            .get(&cursor.map(String::from))
            .cloned()
            .ok_or_else(|| CrawlError::Upstream(format!("no page scripted at cursor {cursor:?}")))
    }
}

// ---------------------------------------------------------------------------
// Feed stub
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct StubFeedSource {
    ids: Mutex<Vec<String>>,
}

impl StubFeedSource {
    pub fn new(ids: &[&str]) -> Self {
        Self {
            ids: Mutex::new(ids.iter().map(|s| s.to_string()).collect()),
        }
    }
}

#[async_trait]
impl FeedSource for StubFeedSource {
    async fn video_ids(&self, _channel_id: &str) -> CrawlResult<Vec<String>> {
        Ok(self.ids.lock().unwrap().clone())
    }
}

// ---------------------------------------------------------------------------
// Metrics stub
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct StubMetrics {
    metrics: Mutex<Option<PostMetrics>>,
}

impl StubMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_metrics(&self, m: PostMetrics) {
        *self.metrics.lock().unwrap() = Some(m);
    }
}

#[async_trait]
impl MetricsSource for StubMetrics {
    fn parse_post_url(&self, url: &str) -> Option<ParsedPost> {
        let digits = url.split("/status/").nth(1)?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        Some(ParsedPost {
            post_id: digits.to_string(),
            canonical_url: url.to_string(),
        })
    }

    async fn post_metrics(&self, _post_id: &str) -> CrawlResult<PostMetrics> {
        let scripted = *self.metrics.lock().unwrap();
        scripted.ok_or_else(|| CrawlError::Upstream("metrics API down".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Enricher stub
// ---------------------------------------------------------------------------

pub struct StubEnricher {
    sponsor: Mutex<Option<SponsorVerdict>>,
    classify: Mutex<Option<CommentFlags>>,
    pub classify_calls: AtomicU32,
}

impl Default for StubEnricher {
    fn default() -> Self {
        Self {
            sponsor: Mutex::new(Some(SponsorVerdict::none())),
            classify: Mutex::new(Some(CommentFlags {
                is_editing_mistake: Some(false),
                is_sponsor_mention: Some(false),
                is_question: Some(false),
                is_positive: Some(true),
            })),
            classify_calls: AtomicU32::new(0),
        }
    }
}

impl StubEnricher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_sponsor_verdict(&self, v: SponsorVerdict) {
        *self.sponsor.lock().unwrap() = Some(v);
    }

    /// Make sponsor extraction fail (request error).
    pub fn fail_sponsor(&self) {
        *self.sponsor.lock().unwrap() = None;
    }

    pub fn set_classify_flags(&self, flags: CommentFlags) {
        *self.classify.lock().unwrap() = Some(flags);
    }

    /// Make comment classification fail (request error).
    pub fn fail_classification(&self) {
        *self.classify.lock().unwrap() = None;
    }
}

#[async_trait]
impl Enricher for StubEnricher {
    async fn extract_sponsor(
        &self,
        _title: &str,
        _description: &str,
        _profile: &ChannelProfile,
    ) -> CrawlResult<SponsorVerdict> {
        self.sponsor
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| CrawlError::Enrichment("sponsor extraction failed".to_string()))
    }

    async fn classify_comment(&self, _ctx: &CommentContext<'_>) -> CrawlResult<CommentFlags> {
        self.classify_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = *self.classify.lock().unwrap();
        scripted.ok_or_else(|| CrawlError::Enrichment("classification failed".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Announcer stub
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingAnnouncer {
    pub deliveries: Mutex<Vec<(String, String)>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl Announcer for RecordingAnnouncer {
    async fn announce(
        &self,
        kind: NotificationKind,
        video: &Video,
        _profile: &ChannelProfile,
    ) -> CrawlResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CrawlError::Upstream("webhook down".to_string()));
        }
        self.deliveries
            .lock()
            .unwrap()
            .push((kind.as_str().to_string(), video.id.clone()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Wired-up crawler
// ---------------------------------------------------------------------------

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub videos: Arc<StubVideoSource>,
    pub feed: Arc<StubFeedSource>,
    pub metrics: Arc<StubMetrics>,
    pub enricher: Arc<StubEnricher>,
    pub announcer: Arc<RecordingAnnouncer>,
    pub crawler: Crawler,
}

pub fn harness_with_feed(feed_ids: &[&str]) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let videos = Arc::new(StubVideoSource::new());
    let feed = Arc::new(StubFeedSource::new(feed_ids));
    let metrics = Arc::new(StubMetrics::new());
    let enricher = Arc::new(StubEnricher::new());
    let announcer = Arc::new(RecordingAnnouncer::default());

    let crawler = Crawler::new(
        store.clone(),
        videos.clone(),
        feed.clone(),
        metrics.clone(),
        enricher.clone(),
        announcer.clone(),
        profile(),
    );

    Harness {
        store,
        videos,
        feed,
        metrics,
        enricher,
        announcer,
        crawler,
    }
}

pub fn harness() -> Harness {
    harness_with_feed(&[])
}
