//! ChannelStore implementations.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use channelpulse_common::{
    Checkpoint, Comment, CommentFlags, CrawlError, CrawlResult, LinkedPostMetrics, Sponsor, Video,
};
use channelpulse_store::PgStore;

use crate::traits::ChannelStore;

fn map_store(err: channelpulse_store::StoreError) -> CrawlError {
    CrawlError::Database(err.to_string())
}

// ---------------------------------------------------------------------------
// PgStore adapter (production — postgres)
// ---------------------------------------------------------------------------

#[async_trait]
impl ChannelStore for PgStore {
    async fn upsert_video(&self, v: &Video) -> CrawlResult<()> {
        PgStore::upsert_video(self, v).await.map_err(map_store)
    }

    async fn video(&self, id: &str) -> CrawlResult<Option<Video>> {
        PgStore::video(self, id).await.map_err(map_store)
    }

    async fn set_linked_post_metrics(
        &self,
        video_id: &str,
        url: &str,
        m: &LinkedPostMetrics,
    ) -> CrawlResult<()> {
        PgStore::set_linked_post_metrics(self, video_id, url, m)
            .await
            .map_err(map_store)
    }

    async fn comments_for_video(&self, video_id: &str) -> CrawlResult<Vec<Comment>> {
        PgStore::comments_for_video(self, video_id).await.map_err(map_store)
    }

    async fn insert_comment(&self, c: &Comment) -> CrawlResult<()> {
        PgStore::insert_comment(self, c).await.map_err(map_store)
    }

    async fn update_comment_counts(
        &self,
        id: &str,
        like_count: i64,
        reply_count: i64,
    ) -> CrawlResult<()> {
        PgStore::update_comment_counts(self, id, like_count, reply_count)
            .await
            .map_err(map_store)
    }

    async fn update_comment_text(
        &self,
        id: &str,
        text: &str,
        like_count: i64,
        reply_count: i64,
    ) -> CrawlResult<()> {
        PgStore::update_comment_text(self, id, text, like_count, reply_count)
            .await
            .map_err(map_store)
    }

    async fn delete_comments(&self, video_id: &str, ids: &[String]) -> CrawlResult<u64> {
        PgStore::delete_comments(self, video_id, ids).await.map_err(map_store)
    }

    async fn unprocessed_comments(&self, video_id: &str, limit: usize) -> CrawlResult<Vec<Comment>> {
        PgStore::unprocessed_comments(self, video_id, limit as i64)
            .await
            .map_err(map_store)
    }

    async fn set_comment_flags(&self, id: &str, flags: &CommentFlags) -> CrawlResult<()> {
        PgStore::set_comment_flags(self, id, flags).await.map_err(map_store)
    }

    async fn replace_sponsor_links(
        &self,
        video_id: &str,
        sponsor: Option<&Sponsor>,
    ) -> CrawlResult<()> {
        PgStore::replace_sponsor_links(self, video_id, sponsor)
            .await
            .map_err(map_store)
    }

    async fn insert_notification(&self, id: &str, kind: &str, video_id: &str) -> CrawlResult<bool> {
        PgStore::insert_notification(self, id, kind, video_id)
            .await
            .map_err(map_store)
    }

    async fn checkpoint(&self, key: &str) -> CrawlResult<Option<Checkpoint>> {
        PgStore::checkpoint(self, key).await.map_err(map_store)
    }

    async fn save_checkpoint(
        &self,
        key: &str,
        cursor: Option<&str>,
        meta: &serde_json::Value,
    ) -> CrawlResult<()> {
        PgStore::save_checkpoint(self, key, cursor, meta)
            .await
            .map_err(map_store)
    }
}

// ---------------------------------------------------------------------------
// MemoryStore (tests — no database required)
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Inner {
    videos: HashMap<String, Video>,
    comments: HashMap<String, Comment>,
    sponsors: HashMap<String, Sponsor>,
    video_sponsors: HashSet<(String, String)>,
    notifications: Vec<(String, String, String)>, // (id, kind, video_id)
    checkpoints: HashMap<String, Checkpoint>,
}

/// In-memory store mirroring the Postgres semantics the orchestrator relies
/// on (linked-post URL preserved across upserts, insert-or-ignore
/// notifications, last-write-wins checkpoints). Thread-safe.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // --- test accessors ---

    pub fn stored_video(&self, id: &str) -> Option<Video> {
        self.inner.lock().unwrap().videos.get(id).cloned()
    }

    pub fn stored_comments(&self, video_id: &str) -> Vec<Comment> {
        let mut comments: Vec<Comment> = self
            .inner
            .lock()
            .unwrap()
            .comments
            .values()
            .filter(|c| c.video_id == video_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.id.cmp(&b.id));
        comments
    }

    pub fn sponsor_links(&self, video_id: &str) -> Vec<Sponsor> {
        let inner = self.inner.lock().unwrap();
        let mut sponsors: Vec<Sponsor> = inner
            .video_sponsors
            .iter()
            .filter(|(vid, _)| vid == video_id)
            .filter_map(|(_, sid)| inner.sponsors.get(sid).cloned())
            .collect();
        sponsors.sort_by(|a, b| a.id.cmp(&b.id));
        sponsors
    }

    pub fn notifications(&self) -> Vec<(String, String, String)> {
        self.inner.lock().unwrap().notifications.clone()
    }

    pub fn stored_checkpoint(&self, key: &str) -> Option<Checkpoint> {
        self.inner.lock().unwrap().checkpoints.get(key).cloned()
    }

    /// Seed a comment row directly (test setup).
    pub fn seed_comment(&self, c: Comment) {
        self.inner.lock().unwrap().comments.insert(c.id.clone(), c);
    }

    /// Seed a video row directly (test setup).
    pub fn seed_video(&self, v: Video) {
        self.inner.lock().unwrap().videos.insert(v.id.clone(), v);
    }

    /// Seed a checkpoint directly (test setup).
    pub fn seed_checkpoint(&self, key: &str, cursor: Option<&str>) {
        self.inner.lock().unwrap().checkpoints.insert(
            key.to_string(),
            Checkpoint {
                key: key.to_string(),
                cursor: cursor.map(String::from),
                meta: serde_json::json!({}),
                updated_at: Utc::now(),
            },
        );
    }
}

#[async_trait]
impl ChannelStore for MemoryStore {
    async fn upsert_video(&self, v: &Video) -> CrawlResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let merged = match inner.videos.get(&v.id) {
            Some(existing) => {
                let mut updated = v.clone();
                if updated.linked_post_url.is_none() {
                    updated.linked_post_url = existing.linked_post_url.clone();
                }
                updated.linked_post_metrics = existing.linked_post_metrics;
                updated
            }
            None => v.clone(),
        };
        inner.videos.insert(merged.id.clone(), merged);
        Ok(())
    }

    async fn video(&self, id: &str) -> CrawlResult<Option<Video>> {
        Ok(self.inner.lock().unwrap().videos.get(id).cloned())
    }

    async fn set_linked_post_metrics(
        &self,
        video_id: &str,
        url: &str,
        m: &LinkedPostMetrics,
    ) -> CrawlResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(video) = inner.videos.get_mut(video_id) {
            video.linked_post_url = Some(url.to_string());
            video.linked_post_metrics = *m;
        }
        Ok(())
    }

    async fn comments_for_video(&self, video_id: &str) -> CrawlResult<Vec<Comment>> {
        Ok(self.stored_comments(video_id))
    }

    async fn insert_comment(&self, c: &Comment) -> CrawlResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.comments.contains_key(&c.id) {
            return Err(CrawlError::Database(format!("duplicate comment id {}", c.id)));
        }
        let mut fresh = c.clone();
        fresh.flags = CommentFlags::default();
        fresh.processed = false;
        inner.comments.insert(fresh.id.clone(), fresh);
        Ok(())
    }

    async fn update_comment_counts(
        &self,
        id: &str,
        like_count: i64,
        reply_count: i64,
    ) -> CrawlResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(c) = inner.comments.get_mut(id) {
            c.like_count = like_count;
            c.reply_count = reply_count;
        }
        Ok(())
    }

    async fn update_comment_text(
        &self,
        id: &str,
        text: &str,
        like_count: i64,
        reply_count: i64,
    ) -> CrawlResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(c) = inner.comments.get_mut(id) {
            c.text = text.to_string();
            c.like_count = like_count;
            c.reply_count = reply_count;
            c.flags = CommentFlags::default();
            c.processed = false;
        }
        Ok(())
    }

    async fn delete_comments(&self, video_id: &str, ids: &[String]) -> CrawlResult<u64> {
        let mut inner = self.inner.lock().unwrap();
        let mut deleted = 0;
        for id in ids {
            if inner
                .comments
                .get(id)
                .is_some_and(|c| c.video_id == video_id)
            {
                inner.comments.remove(id);
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn unprocessed_comments(&self, video_id: &str, limit: usize) -> CrawlResult<Vec<Comment>> {
        let mut pending: Vec<Comment> = self
            .inner
            .lock()
            .unwrap()
            .comments
            .values()
            .filter(|c| c.video_id == video_id && !c.processed)
            .cloned()
            .collect();
        pending.sort_by(|a, b| (a.published_at, &a.id).cmp(&(b.published_at, &b.id)));
        pending.truncate(limit);
        Ok(pending)
    }

    async fn set_comment_flags(&self, id: &str, flags: &CommentFlags) -> CrawlResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(c) = inner.comments.get_mut(id) {
            c.flags = *flags;
            c.processed = true;
        }
        Ok(())
    }

    async fn replace_sponsor_links(
        &self,
        video_id: &str,
        sponsor: Option<&Sponsor>,
    ) -> CrawlResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.video_sponsors.retain(|(vid, _)| vid != video_id);
        if let Some(s) = sponsor {
            inner.sponsors.insert(s.id.clone(), s.clone());
            inner
                .video_sponsors
                .insert((video_id.to_string(), s.id.clone()));
        }
        Ok(())
    }

    async fn insert_notification(&self, id: &str, kind: &str, video_id: &str) -> CrawlResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        if inner.notifications.iter().any(|(nid, _, _)| nid == id) {
            return Ok(false);
        }
        inner
            .notifications
            .push((id.to_string(), kind.to_string(), video_id.to_string()));
        Ok(true)
    }

    async fn checkpoint(&self, key: &str) -> CrawlResult<Option<Checkpoint>> {
        Ok(self.inner.lock().unwrap().checkpoints.get(key).cloned())
    }

    async fn save_checkpoint(
        &self,
        key: &str,
        cursor: Option<&str>,
        meta: &serde_json::Value,
    ) -> CrawlResult<()> {
        self.inner.lock().unwrap().checkpoints.insert(
            key.to_string(),
            Checkpoint {
                key: key.to_string(),
                cursor: cursor.map(String::from),
                meta: meta.clone(),
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }
}
