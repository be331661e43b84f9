use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// --- Video ---

/// Cached engagement metrics for a video's linked social post. Absent metrics
/// stay None; the upstream metrics API does not guarantee every field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedPostMetrics {
    pub views: Option<i64>,
    pub likes: Option<i64>,
    pub reposts: Option<i64>,
    pub replies: Option<i64>,
}

/// A video row as the pipeline persists it. Identified by the platform-native
/// id, refreshed on every successful crawl, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub channel_id: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub linked_post_url: Option<String>,
    pub linked_post_metrics: LinkedPostMetrics,
}

// --- Comment ---

/// The four AI-derived comment facets. All-None means unclassified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentFlags {
    pub is_editing_mistake: Option<bool>,
    pub is_sponsor_mention: Option<bool>,
    pub is_question: Option<bool>,
    pub is_positive: Option<bool>,
}

/// A stored comment. `processed` flips to true once classification has been
/// persisted; an upstream text edit resets flags and `processed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub video_id: String,
    pub text: String,
    pub author: String,
    pub published_at: Option<DateTime<Utc>>,
    pub like_count: i64,
    pub reply_count: i64,
    pub flags: CommentFlags,
    pub processed: bool,
}

// --- Sponsor ---

/// A detected sponsor. The id is derived from the normalized key so repeated
/// detections of the same sponsor converge on one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sponsor {
    pub id: String,
    pub name: String,
    pub key: String,
}

impl Sponsor {
    /// Build a sponsor record from an already-normalized name/key pair.
    pub fn from_normalized(name: &str, key: &str) -> Self {
        Self {
            id: sponsor_id(key),
            name: name.to_string(),
            key: key.to_string(),
        }
    }
}

// --- Checkpoint ---

/// A durable pagination checkpoint. `meta` is opaque to the store; the
/// backfill walker records diagnostics in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub key: String,
    pub cursor: Option<String>,
    pub meta: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

// --- Deterministic ids ---

fn short_digest(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    hex::encode(&digest[..8])
}

/// Stable sponsor id from a normalized sponsor key.
pub fn sponsor_id(normalized_key: &str) -> String {
    format!("sp_{}", short_digest(normalized_key))
}

/// Stable notification id from (kind, video id). Two inserts for the same
/// pair always collide, which is what makes notification writes idempotent.
pub fn notification_id(kind: &str, video_id: &str) -> String {
    format!("ntf_{}", short_digest(&format!("{kind}:{video_id}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sponsor_id_is_stable() {
        assert_eq!(sponsor_id("https://x.link/convex"), sponsor_id("https://x.link/convex"));
        assert_ne!(sponsor_id("https://x.link/convex"), sponsor_id("https://x.link/other"));
    }

    #[test]
    fn notification_id_distinguishes_kinds() {
        let a = notification_id("discord", "vid123");
        let b = notification_id("tracker", "vid123");
        assert_ne!(a, b);
        assert_eq!(a, notification_id("discord", "vid123"));
    }
}
