//! Sponsor extraction: prompt rendering and verdict sanitization.

use schemars::JsonSchema;
use serde::Deserialize;

/// Raw model output for sponsor extraction, before sanitization.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SponsorJudgment {
    pub has_sponsor: bool,
    pub sponsor_name: String,
    pub sponsor_key: String,
}

/// A sanitized sponsor verdict. Name and key are lower-cased, trimmed, and
/// only present when a real sponsor was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SponsorVerdict {
    pub has_sponsor: bool,
    pub name: Option<String>,
    pub key: Option<String>,
}

impl SponsorVerdict {
    /// The canonical "no sponsor" verdict.
    pub fn none() -> Self {
        Self {
            has_sponsor: false,
            name: None,
            key: None,
        }
    }
}

/// Substitute `{{title}}` and `{{description}}` into a channel's sponsor
/// prompt template.
pub fn render_prompt(template: &str, title: &str, description: &str) -> String {
    template
        .replace("{{title}}", title)
        .replace("{{description}}", description)
}

/// Normalize a raw judgment. The model is untrusted here: a "yes" with an
/// empty name/key, or a key that is really the channel's no-sponsor
/// placeholder, both collapse to the canonical no-sponsor verdict.
pub fn sanitize(raw: &SponsorJudgment, no_sponsor_key: &str) -> SponsorVerdict {
    let name = raw.sponsor_name.trim().to_lowercase();
    let key = raw.sponsor_key.trim().to_lowercase();
    let placeholder = no_sponsor_key.trim().to_lowercase();

    if !raw.has_sponsor || name.is_empty() || key.is_empty() {
        return SponsorVerdict::none();
    }
    if matches_placeholder(&key, &placeholder) {
        return SponsorVerdict::none();
    }

    SponsorVerdict {
        has_sponsor: true,
        name: Some(name),
        key: Some(key),
    }
}

/// A key matches the placeholder exactly, or by bare host in either
/// direction: the key being just the placeholder's host, or the key's host
/// being the whole placeholder.
fn matches_placeholder(key: &str, placeholder: &str) -> bool {
    if key == placeholder {
        return true;
    }
    if let Some(host) = bare_host(placeholder) {
        if key == host {
            return true;
        }
    }
    if let Some(host) = bare_host(key) {
        if host == placeholder {
            return true;
        }
    }
    false
}

/// Host portion of a URL-ish string; bare hosts parse too.
fn bare_host(s: &str) -> Option<String> {
    let candidate = if s.contains("://") {
        s.to_string()
    } else {
        format!("https://{s}")
    };
    let parsed = url::Url::parse(&candidate).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    Some(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_SPONSOR: &str = "https://x.link/nothing";

    fn judgment(has: bool, name: &str, key: &str) -> SponsorJudgment {
        SponsorJudgment {
            has_sponsor: has,
            sponsor_name: name.to_string(),
            sponsor_key: key.to_string(),
        }
    }

    #[test]
    fn lowercases_and_trims() {
        let v = sanitize(&judgment(true, "  ConVex  ", "  HTTPS://X.LINK/CONVEX  "), NO_SPONSOR);
        assert_eq!(v.name.as_deref(), Some("convex"));
        assert_eq!(v.key.as_deref(), Some("https://x.link/convex"));
        assert!(v.has_sponsor);
    }

    #[test]
    fn no_sponsor_flag_wins() {
        let v = sanitize(&judgment(false, "convex", "https://x.link/convex"), NO_SPONSOR);
        assert_eq!(v, SponsorVerdict::none());
    }

    #[test]
    fn empty_name_or_key_is_no_sponsor() {
        assert_eq!(sanitize(&judgment(true, "", "https://x.link/convex"), NO_SPONSOR), SponsorVerdict::none());
        assert_eq!(sanitize(&judgment(true, "convex", "   "), NO_SPONSOR), SponsorVerdict::none());
    }

    #[test]
    fn placeholder_match_is_no_sponsor_despite_flag() {
        let v = sanitize(&judgment(true, "nothing", "  HTTPS://X.LINK/NOTHING "), NO_SPONSOR);
        assert_eq!(v, SponsorVerdict::none());
    }

    #[test]
    fn bare_host_of_placeholder_is_no_sponsor() {
        let v = sanitize(&judgment(true, "nothing", "x.link"), NO_SPONSOR);
        assert_eq!(v, SponsorVerdict::none());
    }

    #[test]
    fn host_form_placeholder_catches_full_url_key() {
        // Channel configured with a bare-host placeholder.
        let v = sanitize(&judgment(true, "nothing", "https://x.link/anything"), "x.link");
        assert_eq!(v, SponsorVerdict::none());
    }

    #[test]
    fn real_sponsor_on_placeholder_host_survives() {
        // Full-URL placeholder must not swallow other keys on the same host.
        let v = sanitize(&judgment(true, "convex", "https://x.link/convex"), NO_SPONSOR);
        assert!(v.has_sponsor);
    }

    #[test]
    fn renders_prompt_template() {
        let out = render_prompt("T={{title}} D={{description}}", "My Video", "Great stuff");
        assert_eq!(out, "T=My Video D=Great stuff");
    }
}
