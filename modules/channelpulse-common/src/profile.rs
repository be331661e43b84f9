use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Per-channel parameters for one pipeline instance. The source system ran
/// three copy-pasted crawl stacks, one per channel; a single generic pipeline
/// parameterized by this profile replaces them.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelProfile {
    /// Platform-native channel identifier.
    pub channel_id: String,
    /// Human-readable channel name, used in notification embeds.
    pub display_name: String,
    /// Prompt template handed to the sponsor extractor. `{{title}}` and
    /// `{{description}}` are substituted per video.
    pub sponsor_prompt: String,
    /// Placeholder value the channel uses to mean "no sponsor". A sponsor key
    /// matching this (exactly, or by bare host) normalizes to no-sponsor.
    pub no_sponsor_key: String,
}

/// TOML-backed channel profile file. Secrets stay as env vars.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelProfiles {
    #[serde(rename = "channel")]
    pub channels: Vec<ChannelProfile>,
}

impl ChannelProfiles {
    /// Look up a profile by channel id.
    pub fn get(&self, channel_id: &str) -> Option<&ChannelProfile> {
        self.channels.iter().find(|c| c.channel_id == channel_id)
    }
}

/// Load and parse the channel profile file.
pub fn load_profiles(path: &Path) -> Result<ChannelProfiles> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile file: {}", path.display()))?;
    let profiles: ChannelProfiles = toml::from_str(&content)
        .with_context(|| format!("Failed to parse profile file: {}", path.display()))?;
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_profile_toml() {
        let raw = r#"
            [[channel]]
            channel_id = "UC123"
            display_name = "Example Channel"
            sponsor_prompt = "Find the sponsor in {{title}} / {{description}}"
            no_sponsor_key = "https://x.link/nothing"
        "#;
        let profiles: ChannelProfiles = toml::from_str(raw).unwrap();
        assert_eq!(profiles.channels.len(), 1);
        assert!(profiles.get("UC123").is_some());
        assert!(profiles.get("UC999").is_none());
    }

    #[test]
    fn rejects_unknown_fields() {
        let raw = r#"
            [[channel]]
            channel_id = "UC123"
            display_name = "Example"
            sponsor_prompt = "p"
            no_sponsor_key = "k"
            surprise = true
        "#;
        assert!(toml::from_str::<ChannelProfiles>(raw).is_err());
    }
}
