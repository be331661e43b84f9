pub mod classify;
pub mod error;
mod llm;
pub mod schema;
pub mod sponsor;

pub use classify::{CommentContext, CommentJudgment};
pub use error::{EnrichError, Result};
pub use sponsor::{SponsorJudgment, SponsorVerdict};

use tracing::debug;

use llm::LlmClient;

const SPONSOR_SYSTEM_PROMPT: &str = "You extract sponsorship information from a video's \
title and description. Report the sponsor's display name and its canonical link or \
domain as the sponsor key. If the video carries no sponsorship, say so.";

/// The AI enrichment service: sponsor extraction and comment classification,
/// each a single structured-output request.
pub struct EnrichmentService {
    llm: Option<LlmClient>,
}

impl EnrichmentService {
    /// Build from an optional provider key. With no key, every call returns
    /// `EnrichError::MissingApiKey` without touching the network.
    pub fn new(api_key: Option<&str>) -> Self {
        let llm = api_key
            .filter(|k| !k.is_empty())
            .map(LlmClient::new);
        if llm.is_none() {
            tracing::warn!("OPENAI_API_KEY not set, enrichment disabled");
        }
        Self { llm }
    }

    /// Point the underlying client at a different provider URL (tests, proxies).
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.llm = self.llm.map(|c| c.with_base_url(url));
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.llm = self.llm.map(|c| c.with_model(model));
        self
    }

    fn llm(&self) -> Result<&LlmClient> {
        self.llm.as_ref().ok_or(EnrichError::MissingApiKey)
    }

    /// Detect the sponsor (if any) in a video's title + description, using
    /// the channel's prompt template, and sanitize the verdict against the
    /// channel's no-sponsor placeholder.
    pub async fn extract_sponsor(
        &self,
        title: &str,
        description: &str,
        sponsor_prompt: &str,
        no_sponsor_key: &str,
    ) -> Result<SponsorVerdict> {
        let llm = self.llm()?;
        let user = sponsor::render_prompt(sponsor_prompt, title, description);

        let raw: SponsorJudgment = llm
            .structured("sponsor_judgment", SPONSOR_SYSTEM_PROMPT, &user)
            .await?;

        let verdict = sponsor::sanitize(&raw, no_sponsor_key);
        debug!(
            has_sponsor = verdict.has_sponsor,
            key = verdict.key.as_deref().unwrap_or(""),
            "Sponsor extraction complete"
        );
        Ok(verdict)
    }

    /// Classify one comment into the four boolean facets.
    pub async fn classify_comment(&self, ctx: &CommentContext<'_>) -> Result<CommentJudgment> {
        let llm = self.llm()?;
        let user = classify::classification_prompt(ctx);

        llm.structured("comment_judgment", classify::CLASSIFY_SYSTEM_PROMPT, &user)
            .await
    }
}
