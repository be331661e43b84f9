//! Pure comment diffing: upstream batch vs stored rows.

use std::collections::HashSet;

use channelpulse_common::Comment;
use tubedata_client::CommentData;

/// What a crawl must do to converge the stored comment set on the upstream
/// one. Deletion candidates are only produced when the fetch was unbounded —
/// a capped fetch proves nothing about comments beyond the cap.
#[derive(Debug, Default)]
pub struct CommentDiff {
    pub to_insert: Vec<CommentData>,
    /// Text unchanged: refresh counters, preserve enrichment.
    pub to_update_counts: Vec<CommentData>,
    /// Text changed: replace it and reset enrichment to unprocessed.
    pub to_update_text: Vec<CommentData>,
    pub to_delete: Vec<String>,
}

pub fn diff_comments(
    existing: &[Comment],
    fetched: &[CommentData],
    is_limited: bool,
) -> CommentDiff {
    let known: std::collections::HashMap<&str, &Comment> =
        existing.iter().map(|c| (c.id.as_str(), c)).collect();
    let fetched_ids: HashSet<&str> = fetched.iter().map(|c| c.id.as_str()).collect();

    let mut diff = CommentDiff::default();

    for comment in fetched {
        match known.get(comment.id.as_str()) {
            None => diff.to_insert.push(comment.clone()),
            Some(stored) if stored.text != comment.text => {
                diff.to_update_text.push(comment.clone())
            }
            Some(_) => diff.to_update_counts.push(comment.clone()),
        }
    }

    if !is_limited {
        diff.to_delete = existing
            .iter()
            .filter(|c| !fetched_ids.contains(c.id.as_str()))
            .map(|c| c.id.clone())
            .collect();
    }

    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use channelpulse_common::CommentFlags;

    fn stored(id: &str, text: &str, processed: bool) -> Comment {
        Comment {
            id: id.to_string(),
            video_id: "vid".to_string(),
            text: text.to_string(),
            author: "someone".to_string(),
            published_at: None,
            like_count: 0,
            reply_count: 0,
            flags: CommentFlags::default(),
            processed,
        }
    }

    fn fetched(id: &str, text: &str) -> CommentData {
        CommentData {
            id: id.to_string(),
            text: text.to_string(),
            author: "someone".to_string(),
            published_at: None,
            like_count: 1,
            reply_count: 0,
        }
    }

    #[test]
    fn new_unchanged_and_missing_split_correctly() {
        let existing = vec![stored("a", "first", false), stored("b", "second", true)];
        let upstream = vec![fetched("a", "first"), fetched("b", "second"), fetched("c", "third")];

        let diff = diff_comments(&existing, &upstream, false);

        assert_eq!(diff.to_insert.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(), vec!["c"]);
        assert_eq!(diff.to_update_counts.len(), 2);
        assert!(diff.to_update_text.is_empty());
        assert!(diff.to_delete.is_empty());
    }

    #[test]
    fn changed_text_goes_to_reset_bucket() {
        let existing = vec![stored("a", "original", true)];
        let upstream = vec![fetched("a", "edited")];

        let diff = diff_comments(&existing, &upstream, false);

        assert!(diff.to_update_counts.is_empty());
        assert_eq!(diff.to_update_text.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn absent_upstream_deletes_when_unbounded() {
        let existing = vec![stored("a", "first", false), stored("b", "second", true)];
        let upstream = vec![fetched("a", "first")];

        let diff = diff_comments(&existing, &upstream, false);

        assert_eq!(diff.to_delete, vec!["b".to_string()]);
    }

    #[test]
    fn capped_fetch_never_deletes() {
        let existing = vec![stored("a", "first", false), stored("b", "second", true)];
        let upstream = vec![fetched("a", "first")];

        let diff = diff_comments(&existing, &upstream, true);

        assert!(diff.to_delete.is_empty());
    }
}
