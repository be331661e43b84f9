//! Compiled-in pipeline limits.

/// Max top-level comments fetched per crawl of a single video. When the
/// upstream thread is longer than this, the crawl records `is_limited` and
/// stale-comment deletion is skipped.
pub const MAX_COMMENTS_PER_VIDEO: usize = 100;

/// Max pending comments sent to the classifier in one crawl. Bounds AI cost
/// and latency per run; the remainder is picked up by a later crawl.
pub const MAX_COMMENT_CLASSIFICATIONS_PER_CRAWL: usize = 100;

/// Max soft-failure records retained in a run summary. Keeps summaries bounded
/// during systemic outages.
pub const MAX_SOFT_FAILURES: usize = 25;

/// Default per-video fan-out for feed crawls and backfills.
pub const CRAWL_CONCURRENCY: usize = 3;
