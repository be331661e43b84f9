//! Typed errors for the crawl pipeline.
//!
//! One explicit error enum is threaded through every layer so callers can
//! branch on the kind (missing credentials vs not-found vs transient) instead
//! of matching on strings.

use thiserror::Error;

/// Errors that abort the current video or page.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Caller-supplied input failed validation before any external call.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The upstream API reports the resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A required credential is absent from the environment. Never retried.
    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    /// An external API call failed after its retry budget was exhausted.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// A linked social-post URL was supplied but could not be parsed into a
    /// post identifier (bad host or shape).
    #[error("invalid linked URL: {0}")]
    InvalidLinkedUrl(String),

    /// Core persistence write failed.
    #[error("database error: {0}")]
    Database(String),

    /// An enrichment (LLM) call failed. Soft at the orchestrator level.
    #[error("enrichment error: {0}")]
    Enrichment(String),
}

pub type CrawlResult<T> = std::result::Result<T, CrawlError>;

/// Pipeline stage a soft failure was recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftStage {
    LinkedPost,
    Sponsor,
    Classification,
    Notification,
}

impl std::fmt::Display for SoftStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SoftStage::LinkedPost => "linked_post",
            SoftStage::Sponsor => "sponsor",
            SoftStage::Classification => "classification",
            SoftStage::Notification => "notification",
        };
        f.write_str(s)
    }
}

/// A non-fatal error recorded in a run summary. The list holding these is
/// capped at `MAX_SOFT_FAILURES`.
#[derive(Debug, Clone)]
pub struct SoftFailure {
    pub stage: SoftStage,
    pub message: String,
}
