use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;
use tracing_subscriber::EnvFilter;

use channelpulse_common::{load_profiles, AppConfig, CRAWL_CONCURRENCY};
use channelpulse_enrich::EnrichmentService;
use channelpulse_pipeline::{BackfillLimit, Crawler, WebhookAnnouncer};
use channelpulse_store::PgStore;
use tubedata_client::{FeedReader, TubeClient};
use xpost_client::XpostClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("channelpulse=info".parse()?))
        .init();

    let config = AppConfig::from_env()?;

    let pool = PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    let store = PgStore::new(pool);
    store.migrate().await.context("Migrations failed")?;

    let profiles = load_profiles(Path::new(&config.profiles_path))?;
    let profile = profiles
        .get(&config.channel_id)
        .cloned()
        .with_context(|| format!("No channel profile for {}", config.channel_id))?;

    let crawler = Crawler::new(
        Arc::new(store),
        Arc::new(TubeClient::new(&config.tube_api_key)),
        Arc::new(FeedReader::new()),
        Arc::new(XpostClient::new(config.xpost_bearer_token.as_deref())),
        Arc::new(EnrichmentService::new(config.openai_api_key.as_deref())),
        Arc::new(WebhookAnnouncer::new(
            config.chat_webhook_url.as_deref(),
            config.tracker_webhook_url.as_deref(),
        )),
        profile,
    );

    // The scheduler picks the entry point: feed polling by default, backfill
    // when RUN_MODE=backfill (BACKFILL_LIMIT = "all" or a positive count).
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "feed".to_string());
    match run_mode.as_str() {
        "backfill" => {
            let limit: BackfillLimit = std::env::var("BACKFILL_LIMIT")
                .unwrap_or_else(|_| "all".to_string())
                .parse()?;
            let summary = crawler
                .backfill_channel(None, limit, CRAWL_CONCURRENCY)
                .await?;
            info!("{summary}");
        }
        "feed" => {
            let summary = crawler.crawl_feed(None).await?;
            info!("{summary}");
        }
        other => anyhow::bail!("Unknown RUN_MODE: {other} (expected \"feed\" or \"backfill\")"),
    }

    Ok(())
}
