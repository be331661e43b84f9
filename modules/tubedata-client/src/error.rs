use thiserror::Error;

pub type Result<T> = std::result::Result<T, TubeError>;

#[derive(Debug, Error)]
pub enum TubeError {
    /// No API key configured. Fails fast, never retried.
    #[error("content API key is not configured")]
    MissingApiKey,

    /// The requested resource does not exist upstream.
    #[error("not found: {0}")]
    NotFound(String),

    /// Non-2xx response that is neither not-found nor retryable.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure after the retry budget was exhausted.
    #[error("network error: {0}")]
    Network(String),

    /// Response body did not match the expected shape.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for TubeError {
    fn from(err: reqwest::Error) -> Self {
        TubeError::Network(err.to_string())
    }
}
