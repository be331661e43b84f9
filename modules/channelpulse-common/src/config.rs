use anyhow::Result;

/// Application configuration loaded from environment variables.
/// Contains only secrets and env-specific values; channel identity and
/// prompts live in the TOML profile file.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Database
    pub database_url: String,

    // Upstream content API
    pub tube_api_key: String,

    // Social-metrics API
    pub xpost_bearer_token: Option<String>,

    // AI / LLM
    pub openai_api_key: Option<String>,

    // Notification channels
    pub chat_webhook_url: Option<String>,
    pub tracker_webhook_url: Option<String>,

    // Target channel
    pub channel_id: String,

    // Channel profile file
    pub profiles_path: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DATABASE_URL")?,
            tube_api_key: std::env::var("TUBE_API_KEY")?,
            xpost_bearer_token: std::env::var("XPOST_BEARER_TOKEN").ok(),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            chat_webhook_url: std::env::var("CHAT_WEBHOOK_URL").ok(),
            tracker_webhook_url: std::env::var("TRACKER_WEBHOOK_URL").ok(),
            channel_id: std::env::var("CHANNEL_ID")?,
            profiles_path: std::env::var("CHANNEL_PROFILES")
                .unwrap_or_else(|_| "channels.toml".to_string()),
        };

        config.log_keys();
        Ok(config)
    }

    fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let n = val.len().min(5);
            format!("{}...({} chars)", &val[..n], val.len())
        }
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) if !v.is_empty() => preview(v),
                _ => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  TUBE_API_KEY: {}", preview(&self.tube_api_key));
        tracing::info!("  XPOST_BEARER_TOKEN: {}", preview_opt(&self.xpost_bearer_token));
        tracing::info!("  OPENAI_API_KEY: {}", preview_opt(&self.openai_api_key));
        tracing::info!("  CHAT_WEBHOOK_URL: {}", preview_opt(&self.chat_webhook_url));
        tracing::info!("  TRACKER_WEBHOOK_URL: {}", preview_opt(&self.tracker_webhook_url));
        tracing::info!("  CHANNEL_ID: {}", self.channel_id);
    }
}
