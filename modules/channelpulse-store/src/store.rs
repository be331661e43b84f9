// Postgres persistence for the crawl pipeline's five entities plus the
// checkpoint table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use channelpulse_common::{
    Checkpoint, Comment, CommentFlags, LinkedPostMetrics, Sponsor, Video,
};

use crate::error::Result;

pub struct PgStore {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct VideoRow {
    id: String,
    channel_id: String,
    title: String,
    description: String,
    thumbnail_url: Option<String>,
    published_at: Option<DateTime<Utc>>,
    view_count: i64,
    like_count: i64,
    comment_count: i64,
    linked_post_url: Option<String>,
    linked_post_views: Option<i64>,
    linked_post_likes: Option<i64>,
    linked_post_reposts: Option<i64>,
    linked_post_replies: Option<i64>,
}

impl From<VideoRow> for Video {
    fn from(r: VideoRow) -> Self {
        Video {
            id: r.id,
            channel_id: r.channel_id,
            title: r.title,
            description: r.description,
            thumbnail_url: r.thumbnail_url,
            published_at: r.published_at,
            view_count: r.view_count,
            like_count: r.like_count,
            comment_count: r.comment_count,
            linked_post_url: r.linked_post_url,
            linked_post_metrics: LinkedPostMetrics {
                views: r.linked_post_views,
                likes: r.linked_post_likes,
                reposts: r.linked_post_reposts,
                replies: r.linked_post_replies,
            },
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: String,
    video_id: String,
    text: String,
    author: String,
    published_at: Option<DateTime<Utc>>,
    like_count: i64,
    reply_count: i64,
    is_editing_mistake: Option<bool>,
    is_sponsor_mention: Option<bool>,
    is_question: Option<bool>,
    is_positive: Option<bool>,
    processed: bool,
}

impl From<CommentRow> for Comment {
    fn from(r: CommentRow) -> Self {
        Comment {
            id: r.id,
            video_id: r.video_id,
            text: r.text,
            author: r.author,
            published_at: r.published_at,
            like_count: r.like_count,
            reply_count: r.reply_count,
            flags: CommentFlags {
                is_editing_mistake: r.is_editing_mistake,
                is_sponsor_mention: r.is_sponsor_mention,
                is_question: r.is_question,
                is_positive: r.is_positive,
            },
            processed: r.processed,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CheckpointRow {
    key: String,
    cursor: Option<String>,
    meta: serde_json::Value,
    updated_at: DateTime<Utc>,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the embedded SQL migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    // --- Videos ---

    pub async fn upsert_video(&self, v: &Video) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO videos
                (id, channel_id, title, description, thumbnail_url, published_at,
                 view_count, like_count, comment_count, linked_post_url, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, now())
            ON CONFLICT (id) DO UPDATE SET
                channel_id = EXCLUDED.channel_id,
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                thumbnail_url = EXCLUDED.thumbnail_url,
                published_at = EXCLUDED.published_at,
                view_count = EXCLUDED.view_count,
                like_count = EXCLUDED.like_count,
                comment_count = EXCLUDED.comment_count,
                linked_post_url = COALESCE(EXCLUDED.linked_post_url, videos.linked_post_url),
                updated_at = now()
            "#,
        )
        .bind(&v.id)
        .bind(&v.channel_id)
        .bind(&v.title)
        .bind(&v.description)
        .bind(&v.thumbnail_url)
        .bind(v.published_at)
        .bind(v.view_count)
        .bind(v.like_count)
        .bind(v.comment_count)
        .bind(&v.linked_post_url)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn video(&self, id: &str) -> Result<Option<Video>> {
        let row = sqlx::query_as::<_, VideoRow>(
            r#"
            SELECT id, channel_id, title, description, thumbnail_url, published_at,
                   view_count, like_count, comment_count, linked_post_url,
                   linked_post_views, linked_post_likes, linked_post_reposts,
                   linked_post_replies
            FROM videos WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Video::from))
    }

    pub async fn set_linked_post_metrics(
        &self,
        video_id: &str,
        url: &str,
        m: &LinkedPostMetrics,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE videos SET
                linked_post_url = $2,
                linked_post_views = $3,
                linked_post_likes = $4,
                linked_post_reposts = $5,
                linked_post_replies = $6,
                linked_post_refreshed_at = now(),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(video_id)
        .bind(url)
        .bind(m.views)
        .bind(m.likes)
        .bind(m.reposts)
        .bind(m.replies)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // --- Comments ---

    pub async fn comments_for_video(&self, video_id: &str) -> Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, video_id, text, author, published_at, like_count, reply_count,
                   is_editing_mistake, is_sponsor_mention, is_question, is_positive,
                   processed
            FROM comments WHERE video_id = $1
            "#,
        )
        .bind(video_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }

    pub async fn insert_comment(&self, c: &Comment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO comments
                (id, video_id, text, author, published_at, like_count, reply_count,
                 processed, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE, now())
            "#,
        )
        .bind(&c.id)
        .bind(&c.video_id)
        .bind(&c.text)
        .bind(&c.author)
        .bind(c.published_at)
        .bind(c.like_count)
        .bind(c.reply_count)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Refresh mutable counters only; enrichment state is preserved.
    pub async fn update_comment_counts(
        &self,
        id: &str,
        like_count: i64,
        reply_count: i64,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE comments SET like_count = $2, reply_count = $3, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(like_count)
        .bind(reply_count)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// The upstream text changed: replace it and reset enrichment so the
    /// comment is re-classified on a later crawl.
    pub async fn update_comment_text(
        &self,
        id: &str,
        text: &str,
        like_count: i64,
        reply_count: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE comments SET
                text = $2,
                like_count = $3,
                reply_count = $4,
                is_editing_mistake = NULL,
                is_sponsor_mention = NULL,
                is_question = NULL,
                is_positive = NULL,
                processed = FALSE,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(text)
        .bind(like_count)
        .bind(reply_count)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete_comments(&self, video_id: &str, ids: &[String]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM comments WHERE video_id = $1 AND id = ANY($2)")
            .bind(video_id)
            .bind(ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn unprocessed_comments(&self, video_id: &str, limit: i64) -> Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, video_id, text, author, published_at, like_count, reply_count,
                   is_editing_mistake, is_sponsor_mention, is_question, is_positive,
                   processed
            FROM comments
            WHERE video_id = $1 AND NOT processed
            ORDER BY published_at ASC NULLS LAST
            LIMIT $2
            "#,
        )
        .bind(video_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }

    pub async fn set_comment_flags(&self, id: &str, flags: &CommentFlags) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE comments SET
                is_editing_mistake = $2,
                is_sponsor_mention = $3,
                is_question = $4,
                is_positive = $5,
                processed = TRUE,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(flags.is_editing_mistake)
        .bind(flags.is_sponsor_mention)
        .bind(flags.is_question)
        .bind(flags.is_positive)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // --- Sponsors ---

    /// Replace a video's sponsor linkage. `None` clears it (explicit
    /// no-sponsor detection); `Some` upserts the sponsor row and re-links.
    pub async fn replace_sponsor_links(
        &self,
        video_id: &str,
        sponsor: Option<&Sponsor>,
    ) -> Result<()> {
        sqlx::query("DELETE FROM video_sponsors WHERE video_id = $1")
            .bind(video_id)
            .execute(&self.pool)
            .await?;

        if let Some(s) = sponsor {
            sqlx::query(
                r#"
                INSERT INTO sponsors (id, name, key)
                VALUES ($1, $2, $3)
                ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name
                "#,
            )
            .bind(&s.id)
            .bind(&s.name)
            .bind(&s.key)
            .execute(&self.pool)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO video_sponsors (video_id, sponsor_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(video_id)
            .bind(&s.id)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    pub async fn sponsors_for_video(&self, video_id: &str) -> Result<Vec<Sponsor>> {
        let rows = sqlx::query_as::<_, (String, String, String)>(
            r#"
            SELECT s.id, s.name, s.key
            FROM sponsors s
            JOIN video_sponsors vs ON vs.sponsor_id = s.id
            WHERE vs.video_id = $1
            "#,
        )
        .bind(video_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, key)| Sponsor { id, name, key })
            .collect())
    }

    // --- Notifications ---

    /// Insert-or-ignore by deterministic id. Returns whether the row was
    /// genuinely new.
    pub async fn insert_notification(&self, id: &str, kind: &str, video_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO notifications (id, kind, video_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(kind)
        .bind(video_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    // --- Checkpoints ---

    pub async fn checkpoint(&self, key: &str) -> Result<Option<Checkpoint>> {
        let row = sqlx::query_as::<_, CheckpointRow>(
            "SELECT key, cursor, meta, updated_at FROM checkpoints WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Checkpoint {
            key: r.key,
            cursor: r.cursor,
            meta: r.meta,
            updated_at: r.updated_at,
        }))
    }

    /// Upsert, last-write-wins. Called after every backfill page so a crash
    /// loses at most one page of progress.
    pub async fn save_checkpoint(
        &self,
        key: &str,
        cursor: Option<&str>,
        meta: &serde_json::Value,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO checkpoints (key, cursor, meta, updated_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (key) DO UPDATE SET
                cursor = EXCLUDED.cursor,
                meta = EXCLUDED.meta,
                updated_at = now()
            "#,
        )
        .bind(key)
        .bind(cursor)
        .bind(meta)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
