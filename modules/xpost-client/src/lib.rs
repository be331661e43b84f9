pub mod error;

pub use error::{Result, XpostError};

use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.x.example/2";

/// Hosts accepted as linked-post sources. Anything else is "no match", which
/// callers treat as a signal rather than an error.
const DEFAULT_ALLOWED_HOSTS: &[&str] = &["x.com", "twitter.com", "x.example"];

const MAX_ATTEMPTS: u32 = 3;
const RETRY_BASE: Duration = Duration::from_millis(500);

/// A social-post URL reduced to its canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPost {
    pub post_id: String,
    pub canonical_url: String,
}

/// Public engagement counts for one post. The upstream schema drifts, so
/// every metric is optional; absent fields stay None.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostMetrics {
    pub views: Option<i64>,
    pub likes: Option<i64>,
    pub reposts: Option<i64>,
    pub replies: Option<i64>,
}

pub struct XpostClient {
    http: reqwest::Client,
    token: Option<String>,
    base_url: String,
    allowed_hosts: Vec<String>,
}

impl XpostClient {
    pub fn new(token: Option<&str>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            http,
            token: token.filter(|t| !t.is_empty()).map(String::from),
            base_url: DEFAULT_BASE_URL.to_string(),
            allowed_hosts: DEFAULT_ALLOWED_HOSTS.iter().map(|h| h.to_string()).collect(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_allowed_hosts(mut self, hosts: &[&str]) -> Self {
        self.allowed_hosts = hosts.iter().map(|h| h.to_string()).collect();
        self
    }

    /// Parse a post URL into its numeric id and canonical form. Returns None
    /// for non-allow-listed hosts or URLs without a `/status/<digits>` path —
    /// a "no match" signal, not an error.
    pub fn parse_post_url(&self, raw: &str) -> Option<ParsedPost> {
        let parsed = url::Url::parse(raw.trim()).ok()?;
        let host = parsed.host_str()?.to_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
        if !self.allowed_hosts.iter().any(|h| h == &host) {
            return None;
        }

        let status_re = regex::Regex::new(r"^/([A-Za-z0-9_]+)/status/(\d+)").expect("valid regex");
        let caps = status_re.captures(parsed.path())?;
        let user = caps.get(1)?.as_str();
        let post_id = caps.get(2)?.as_str().to_string();

        Some(ParsedPost {
            canonical_url: format!("https://{host}/{user}/status/{post_id}"),
            post_id,
        })
    }

    fn token(&self) -> Result<&str> {
        self.token.as_deref().ok_or(XpostError::MissingToken)
    }

    /// Fetch public engagement metrics for a post by numeric id.
    pub async fn post_metrics(&self, post_id: &str) -> Result<PostMetrics> {
        let token = self.token()?;
        let url = format!("{}/posts/{}", self.base_url, post_id);

        for attempt in 0..MAX_ATTEMPTS {
            let result = self
                .http
                .get(&url)
                .query(&[("fields", "public_metrics")])
                .bearer_auth(token)
                .send()
                .await;

            let resp = match result {
                Ok(resp) => resp,
                Err(e) => {
                    if attempt + 1 < MAX_ATTEMPTS {
                        let backoff = RETRY_BASE * 2u32.pow(attempt);
                        let jitter = Duration::from_millis(rand::rng().random_range(0..250));
                        warn!(
                            post_id,
                            attempt = attempt + 1,
                            error = %e,
                            "Metrics request failed, backing off"
                        );
                        tokio::time::sleep(backoff + jitter).await;
                        continue;
                    }
                    return Err(e.into());
                }
            };

            let status = resp.status();
            if status.is_server_error() || status.as_u16() == 429 {
                if attempt + 1 < MAX_ATTEMPTS {
                    let backoff = RETRY_BASE * 2u32.pow(attempt);
                    let jitter = Duration::from_millis(rand::rng().random_range(0..250));
                    warn!(
                        post_id,
                        status = status.as_u16(),
                        attempt = attempt + 1,
                        "Retryable metrics status, backing off"
                    );
                    tokio::time::sleep(backoff + jitter).await;
                    continue;
                }
            }
            if !status.is_success() {
                let message = resp.text().await.unwrap_or_default();
                return Err(XpostError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body: serde_json::Value = resp
                .json()
                .await
                .map_err(|e| XpostError::Parse(e.to_string()))?;

            let metrics = extract_metrics(&body);
            debug!(post_id, ?metrics, "Fetched post metrics");
            return Ok(metrics);
        }

        unreachable!("retry loop always returns")
    }
}

/// Pull counts out of the response, tolerating field renames across API
/// versions: each metric is probed under every alias it has shipped as.
fn extract_metrics(body: &serde_json::Value) -> PostMetrics {
    let nested = body
        .get("data")
        .and_then(|d| d.get("public_metrics").or_else(|| d.get("metrics")))
        .or_else(|| body.get("public_metrics"))
        .unwrap_or(body);

    PostMetrics {
        views: first_count(nested, &["impression_count", "view_count", "views"]),
        likes: first_count(nested, &["like_count", "favorite_count", "likes"]),
        reposts: first_count(nested, &["retweet_count", "repost_count", "reposts"]),
        replies: first_count(nested, &["reply_count", "replies"]),
    }
}

fn first_count(obj: &serde_json::Value, aliases: &[&str]) -> Option<i64> {
    aliases.iter().find_map(|alias| obj.get(*alias).and_then(|v| v.as_i64()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> XpostClient {
        XpostClient::new(None)
    }

    #[test]
    fn parses_allow_listed_status_url() {
        let parsed = client()
            .parse_post_url("https://x.example/user/status/12345")
            .unwrap();
        assert_eq!(parsed.post_id, "12345");
        assert_eq!(parsed.canonical_url, "https://x.example/user/status/12345");
    }

    #[test]
    fn strips_www_and_query_params() {
        let parsed = client()
            .parse_post_url("https://www.x.com/someone/status/987?s=20")
            .unwrap();
        assert_eq!(parsed.post_id, "987");
        assert_eq!(parsed.canonical_url, "https://x.com/someone/status/987");
    }

    #[test]
    fn rejects_unknown_host() {
        assert!(client().parse_post_url("https://evil.example/user/status/12345").is_none());
    }

    #[test]
    fn rejects_non_status_path() {
        assert!(client().parse_post_url("https://x.com/user/likes").is_none());
        assert!(client().parse_post_url("https://x.com/user/status/not-digits").is_none());
    }

    #[test]
    fn rejects_garbage() {
        assert!(client().parse_post_url("not a url").is_none());
    }

    #[test]
    fn custom_allow_list_overrides_default() {
        let c = XpostClient::new(None).with_allowed_hosts(&["social.test"]);
        assert!(c.parse_post_url("https://social.test/u/status/1").is_some());
        assert!(c.parse_post_url("https://x.com/u/status/1").is_none());
    }

    #[test]
    fn metrics_prefer_first_alias_and_default_none() {
        let body = serde_json::json!({
            "data": {
                "public_metrics": {
                    "impression_count": 100,
                    "view_count": 999,
                    "like_count": 5,
                    "reply_count": 2
                }
            }
        });
        let m = extract_metrics(&body);
        assert_eq!(m.views, Some(100));
        assert_eq!(m.likes, Some(5));
        assert_eq!(m.reposts, None);
        assert_eq!(m.replies, Some(2));
    }

    #[test]
    fn metrics_fall_back_to_later_aliases() {
        let body = serde_json::json!({
            "data": { "metrics": { "views": 7, "reposts": 3 } }
        });
        let m = extract_metrics(&body);
        assert_eq!(m.views, Some(7));
        assert_eq!(m.reposts, Some(3));
        assert_eq!(m.likes, None);
    }
}
