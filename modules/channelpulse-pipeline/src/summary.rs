//! Run summaries and the backfill limit argument.

use std::str::FromStr;

use channelpulse_common::{CrawlError, SoftFailure, MAX_SOFT_FAILURES};

/// Outcome of one `crawl_video` run.
#[derive(Debug, Default)]
pub struct CrawlSummary {
    pub video_id: String,
    pub comments_fetched: u32,
    pub comments_inserted: u32,
    pub comments_updated: u32,
    pub comments_deleted: u32,
    /// True when the per-crawl comment cap truncated the fetch. Stale-comment
    /// deletion was skipped in that case.
    pub is_limited: bool,
    pub comments_classified: u32,
    pub notifications_inserted: u32,
    /// Non-fatal errors, capped at `MAX_SOFT_FAILURES`.
    pub soft_failures: Vec<SoftFailure>,
    /// Soft failures seen in total, including those dropped by the cap.
    pub soft_failures_total: u32,
}

impl CrawlSummary {
    pub fn new(video_id: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
            ..Default::default()
        }
    }

    /// Record a soft failure, keeping the list bounded.
    pub(crate) fn push_soft(&mut self, failure: SoftFailure) {
        self.soft_failures_total += 1;
        if self.soft_failures.len() < MAX_SOFT_FAILURES {
            self.soft_failures.push(failure);
        }
    }
}

impl std::fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "video {}: comments fetched={} inserted={} updated={} deleted={}{} classified={} notifications={} soft_failures={}",
            self.video_id,
            self.comments_fetched,
            self.comments_inserted,
            self.comments_updated,
            self.comments_deleted,
            if self.is_limited { " (limited)" } else { "" },
            self.comments_classified,
            self.notifications_inserted,
            self.soft_failures_total,
        )
    }
}

/// One failed video in a batch run.
#[derive(Debug, Clone)]
pub struct VideoFailure {
    pub video_id: String,
    pub message: String,
}

/// Outcome of one `crawl_feed` run.
#[derive(Debug, Default)]
pub struct FeedSummary {
    pub videos_discovered: u32,
    pub crawled: u32,
    pub failed: u32,
    pub failures: Vec<VideoFailure>,
}

impl std::fmt::Display for FeedSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Feed Crawl Complete ===")?;
        writeln!(f, "Videos discovered: {}", self.videos_discovered)?;
        writeln!(f, "Crawled:           {}", self.crawled)?;
        writeln!(f, "Failed:            {}", self.failed)?;
        for failure in &self.failures {
            writeln!(f, "  {}: {}", failure.video_id, failure.message)?;
        }
        Ok(())
    }
}

/// Outcome of one `backfill_channel` run.
#[derive(Debug, Default)]
pub struct BackfillSummary {
    pub videos_crawled: u32,
    pub failed: u32,
    pub failures: Vec<VideoFailure>,
    /// Where the walk stopped. None means the channel history is exhausted.
    pub next_cursor: Option<String>,
}

impl std::fmt::Display for BackfillSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Backfill Complete ===")?;
        writeln!(f, "Videos crawled: {}", self.videos_crawled)?;
        writeln!(f, "Failed:         {}", self.failed)?;
        match &self.next_cursor {
            Some(cursor) => writeln!(f, "Next cursor:    {cursor}")?,
            None => writeln!(f, "History exhausted")?,
        }
        Ok(())
    }
}

/// How far a backfill run may walk. Bounded runs are deliberately not
/// resumable; only `All` touches the checkpoint store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackfillLimit {
    All,
    Count(u32),
}

impl BackfillLimit {
    /// Reject zero (and, at the string boundary, negatives) before any
    /// external call is made.
    pub fn validate(&self) -> Result<(), CrawlError> {
        match self {
            BackfillLimit::Count(0) => Err(CrawlError::InvalidInput(
                "backfill limit must be a positive integer or \"all\"".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl FromStr for BackfillLimit {
    type Err = CrawlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(BackfillLimit::All);
        }
        match s.parse::<i64>() {
            Ok(n) if n > 0 && n <= u32::MAX as i64 => Ok(BackfillLimit::Count(n as u32)),
            _ => Err(CrawlError::InvalidInput(format!(
                "backfill limit must be a positive integer or \"all\", got {s:?}"
            ))),
        }
    }
}

impl std::fmt::Display for BackfillLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackfillLimit::All => f.write_str("all"),
            BackfillLimit::Count(n) => write!(f, "{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use channelpulse_common::SoftStage;

    #[test]
    fn limit_parses_all_and_positive() {
        assert_eq!("all".parse::<BackfillLimit>().unwrap(), BackfillLimit::All);
        assert_eq!("ALL".parse::<BackfillLimit>().unwrap(), BackfillLimit::All);
        assert_eq!("25".parse::<BackfillLimit>().unwrap(), BackfillLimit::Count(25));
    }

    #[test]
    fn limit_rejects_zero_negative_garbage() {
        assert!("0".parse::<BackfillLimit>().is_err());
        assert!("-1".parse::<BackfillLimit>().is_err());
        assert!("soon".parse::<BackfillLimit>().is_err());
        assert!(BackfillLimit::Count(0).validate().is_err());
        assert!(BackfillLimit::All.validate().is_ok());
    }

    #[test]
    fn soft_failures_stay_bounded() {
        let mut summary = CrawlSummary::new("vid");
        for i in 0..40 {
            summary.push_soft(SoftFailure {
                stage: SoftStage::Classification,
                message: format!("failure {i}"),
            });
        }
        assert_eq!(summary.soft_failures.len(), channelpulse_common::MAX_SOFT_FAILURES);
        assert_eq!(summary.soft_failures_total, 40);
    }
}
