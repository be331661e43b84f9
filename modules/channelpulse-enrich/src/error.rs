use thiserror::Error;

pub type Result<T> = std::result::Result<T, EnrichError>;

#[derive(Debug, Error)]
pub enum EnrichError {
    /// No AI-provider key configured. Distinct from a failed request so
    /// callers can skip enrichment instead of retrying it.
    #[error("AI provider key is not configured")]
    MissingApiKey,

    /// The provider call failed: timeout, non-2xx, or a response that did
    /// not match the requested schema.
    #[error("AI request failed: {0}")]
    Request(String),
}
