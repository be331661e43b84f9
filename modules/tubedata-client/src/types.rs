use chrono::{DateTime, Utc};
use serde::Deserialize;

// --- Public result types ---

/// Live metadata for one video, flattened from the API's snippet/statistics
/// split into what the pipeline persists.
#[derive(Debug, Clone)]
pub struct VideoData {
    pub id: String,
    pub channel_id: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
}

/// One top-level comment.
#[derive(Debug, Clone)]
pub struct CommentData {
    pub id: String,
    pub text: String,
    pub author: String,
    pub published_at: Option<DateTime<Utc>>,
    pub like_count: i64,
    pub reply_count: i64,
}

/// Result of a capped comment fetch. `is_limited` is true when the cap cut
/// pagination short, i.e. the upstream thread may hold more comments than
/// were returned.
#[derive(Debug, Clone, Default)]
pub struct CommentBatch {
    pub comments: Vec<CommentData>,
    pub is_limited: bool,
}

/// One page of a playlist walk.
#[derive(Debug, Clone)]
pub struct PlaylistPage {
    pub video_ids: Vec<String>,
    pub next_cursor: Option<String>,
}

// --- Wire types ---

#[derive(Debug, Deserialize)]
pub(crate) struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoItem {
    pub id: String,
    pub snippet: VideoSnippet,
    #[serde(default)]
    pub statistics: Option<VideoStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoSnippet {
    pub channel_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thumbnails {
    #[serde(default)]
    pub high: Option<Thumbnail>,
    #[serde(default)]
    pub default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thumbnail {
    pub url: String,
}

/// Counts arrive as decimal strings on the wire.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoStatistics {
    #[serde(default)]
    pub view_count: Option<String>,
    #[serde(default)]
    pub like_count: Option<String>,
    #[serde(default)]
    pub comment_count: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentThreadListResponse {
    #[serde(default)]
    pub items: Vec<CommentThread>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentThread {
    pub snippet: CommentThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentThreadSnippet {
    pub top_level_comment: TopLevelComment,
    #[serde(default)]
    pub total_reply_count: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TopLevelComment {
    pub id: String,
    pub snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentSnippet {
    #[serde(default)]
    pub text_display: String,
    #[serde(default)]
    pub author_display_name: String,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChannelListResponse {
    #[serde(default)]
    pub items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChannelItem {
    pub content_details: Option<ChannelContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChannelContentDetails {
    pub related_playlists: Option<RelatedPlaylists>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RelatedPlaylists {
    pub uploads: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaylistItemListResponse {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaylistItem {
    pub content_details: Option<PlaylistItemContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaylistItemContentDetails {
    pub video_id: String,
}

/// Parse a wire count string ("12345") into an i64, treating absent or
/// malformed values as zero.
pub(crate) fn parse_count(raw: &Option<String>) -> i64 {
    raw.as_deref().and_then(|s| s.parse().ok()).unwrap_or(0)
}

impl VideoItem {
    pub(crate) fn into_video_data(self) -> VideoData {
        let thumbnail_url = self.snippet.thumbnails.and_then(|t| {
            t.high.map(|h| h.url).or_else(|| t.default.map(|d| d.url))
        });
        let stats = self.statistics;
        VideoData {
            id: self.id,
            channel_id: self.snippet.channel_id,
            title: self.snippet.title,
            description: self.snippet.description,
            thumbnail_url,
            published_at: self.snippet.published_at,
            view_count: stats.as_ref().map(|s| parse_count(&s.view_count)).unwrap_or(0),
            like_count: stats.as_ref().map(|s| parse_count(&s.like_count)).unwrap_or(0),
            comment_count: stats.as_ref().map(|s| parse_count(&s.comment_count)).unwrap_or(0),
        }
    }
}

impl CommentThread {
    pub(crate) fn into_comment_data(self) -> CommentData {
        let reply_count = self.snippet.total_reply_count;
        let top = self.snippet.top_level_comment;
        CommentData {
            id: top.id,
            text: top.snippet.text_display,
            author: top.snippet.author_display_name,
            published_at: top.snippet.published_at,
            like_count: top.snippet.like_count,
            reply_count,
        }
    }
}
