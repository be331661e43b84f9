//! Integration tests for PgStore.
//! Requires a Postgres instance. Set DATABASE_TEST_URL or these tests are skipped.

use channelpulse_store::PgStore;
use sqlx::PgPool;

use channelpulse_common::{
    notification_id, Comment, CommentFlags, LinkedPostMetrics, Sponsor, Video,
};

async fn test_store() -> Option<PgStore> {
    let url = std::env::var("DATABASE_TEST_URL").ok()?;
    let pool = PgPool::connect(&url).await.ok()?;
    let store = PgStore::new(pool);
    store.migrate().await.ok()?;
    Some(store)
}

fn video(id: &str) -> Video {
    Video {
        id: id.to_string(),
        channel_id: "UC-test".to_string(),
        title: format!("Video {id}"),
        description: "desc".to_string(),
        thumbnail_url: None,
        published_at: None,
        view_count: 10,
        like_count: 2,
        comment_count: 1,
        linked_post_url: None,
        linked_post_metrics: LinkedPostMetrics::default(),
    }
}

fn comment(id: &str, video_id: &str, text: &str) -> Comment {
    Comment {
        id: id.to_string(),
        video_id: video_id.to_string(),
        text: text.to_string(),
        author: "viewer".to_string(),
        published_at: None,
        like_count: 0,
        reply_count: 0,
        flags: CommentFlags::default(),
        processed: false,
    }
}

#[tokio::test]
async fn upsert_preserves_linked_post_url() {
    let Some(store) = test_store().await else {
        return;
    };
    let id = "store-test-linked";
    store.upsert_video(&video(id)).await.unwrap();
    store
        .set_linked_post_metrics(
            id,
            "https://x.example/user/status/1",
            &LinkedPostMetrics {
                views: Some(9),
                likes: None,
                reposts: None,
                replies: None,
            },
        )
        .await
        .unwrap();

    // A fresh crawl upsert carries no linked-post URL; the stored one must
    // survive.
    store.upsert_video(&video(id)).await.unwrap();

    let stored = store.video(id).await.unwrap().unwrap();
    assert_eq!(
        stored.linked_post_url.as_deref(),
        Some("https://x.example/user/status/1")
    );
    assert_eq!(stored.linked_post_metrics.views, Some(9));
}

#[tokio::test]
async fn text_update_resets_enrichment_and_flag_write_sets_processed() {
    let Some(store) = test_store().await else {
        return;
    };
    let vid = "store-test-comments";
    let cid = "store-test-comment-a";
    store.upsert_video(&video(vid)).await.unwrap();
    store.delete_comments(vid, &[cid.to_string()]).await.unwrap();
    store.insert_comment(&comment(cid, vid, "original")).await.unwrap();

    let flags = CommentFlags {
        is_editing_mistake: Some(false),
        is_sponsor_mention: Some(false),
        is_question: Some(true),
        is_positive: Some(true),
    };
    store.set_comment_flags(cid, &flags).await.unwrap();

    let stored = store.comments_for_video(vid).await.unwrap();
    let c = stored.iter().find(|c| c.id == cid).unwrap();
    assert!(c.processed);
    assert_eq!(c.flags, flags);

    store.update_comment_text(cid, "edited", 3, 1).await.unwrap();
    let stored = store.comments_for_video(vid).await.unwrap();
    let c = stored.iter().find(|c| c.id == cid).unwrap();
    assert!(!c.processed);
    assert_eq!(c.flags, CommentFlags::default());
    assert_eq!(c.text, "edited");

    let pending = store.unprocessed_comments(vid, 10).await.unwrap();
    assert!(pending.iter().any(|c| c.id == cid));
}

#[tokio::test]
async fn notification_insert_is_idempotent() {
    let Some(store) = test_store().await else {
        return;
    };
    let vid = "store-test-notify";
    let id = notification_id("discord", vid);

    store.insert_notification(&id, "discord", vid).await.unwrap();
    let second = store.insert_notification(&id, "discord", vid).await.unwrap();
    assert!(!second, "duplicate insert must not report a new row");
}

#[tokio::test]
async fn sponsor_linkage_is_replaced_not_merged() {
    let Some(store) = test_store().await else {
        return;
    };
    let vid = "store-test-sponsor";
    store.upsert_video(&video(vid)).await.unwrap();

    let first = Sponsor::from_normalized("convex", "https://x.link/convex");
    store.replace_sponsor_links(vid, Some(&first)).await.unwrap();
    let second = Sponsor::from_normalized("acme", "https://x.link/acme");
    store.replace_sponsor_links(vid, Some(&second)).await.unwrap();

    let sponsors = store.sponsors_for_video(vid).await.unwrap();
    assert_eq!(sponsors.len(), 1);
    assert_eq!(sponsors[0].name, "acme");

    store.replace_sponsor_links(vid, None).await.unwrap();
    assert!(store.sponsors_for_video(vid).await.unwrap().is_empty());
}

#[tokio::test]
async fn checkpoint_upsert_is_last_write_wins() {
    let Some(store) = test_store().await else {
        return;
    };
    let key = "backfill:store-test";

    store
        .save_checkpoint(key, Some("c1"), &serde_json::json!({ "limit": "all" }))
        .await
        .unwrap();
    store
        .save_checkpoint(key, Some("c2"), &serde_json::json!({ "limit": "all" }))
        .await
        .unwrap();

    let checkpoint = store.checkpoint(key).await.unwrap().unwrap();
    assert_eq!(checkpoint.cursor.as_deref(), Some("c2"));

    store.save_checkpoint(key, None, &serde_json::json!({})).await.unwrap();
    assert!(store.checkpoint(key).await.unwrap().unwrap().cursor.is_none());
}
