use thiserror::Error;

pub type Result<T> = std::result::Result<T, XpostError>;

#[derive(Debug, Error)]
pub enum XpostError {
    /// No bearer token configured. Fails fast, never retried.
    #[error("social-metrics bearer token is not configured")]
    MissingToken,

    /// Non-2xx response after the retry budget.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure after the retry budget.
    #[error("network error: {0}")]
    Network(String),

    /// Response body did not match the expected shape.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for XpostError {
    fn from(err: reqwest::Error) -> Self {
        XpostError::Network(err.to_string())
    }
}
