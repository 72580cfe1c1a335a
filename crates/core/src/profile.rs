//! Funnel profiles — one controller, many funnel variants. A profile names
//! the catalogs a visitor picks from, which contact fields are mandatory,
//! how strictly the challenges step is gated, and the theme tokens the
//! host renders with.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FunnelError, FunnelResult};
use crate::types::{Campaign, Challenge, ContactField};

/// How the challenges step decides whether the visitor may move on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeGate {
    /// At least one challenge selected or a non-blank free-text challenge.
    #[default]
    Strict,
    /// Never blocks; an empty selection only hides the "Next" control.
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeOption {
    pub tag: Challenge,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignOption {
    pub tag: Campaign,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeTokens {
    pub primary: String,
    pub accent: String,
}

impl Default for ThemeTokens {
    fn default() -> Self {
        Self {
            primary: "#6602CA".to_string(),
            accent: "#22C55E".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelProfile {
    pub name: String,
    pub brand: String,
    pub challenges: Vec<ChallengeOption>,
    pub campaigns: Vec<CampaignOption>,
    #[serde(default = "default_required_fields")]
    pub required_fields: Vec<ContactField>,
    #[serde(default)]
    pub challenge_gate: ChallengeGate,
    #[serde(default)]
    pub theme: ThemeTokens,
    #[serde(default = "default_signals_per_campaign")]
    pub signals_per_campaign: u32,
    #[serde(default)]
    pub demo_url: Option<String>,
}

fn default_required_fields() -> Vec<ContactField> {
    vec![
        ContactField::Email,
        ContactField::FirstName,
        ContactField::CompanyName,
        ContactField::TeamSize,
    ]
}
fn default_signals_per_campaign() -> u32 {
    12
}

fn challenge(tag: Challenge, title: &str) -> ChallengeOption {
    ChallengeOption {
        tag,
        title: title.to_string(),
    }
}

fn campaign(tag: Campaign, title: &str, description: &str) -> CampaignOption {
    CampaignOption {
        tag,
        title: title.to_string(),
        description: description.to_string(),
    }
}

fn full_campaign_catalog() -> Vec<CampaignOption> {
    vec![
        campaign(
            Campaign::Icp,
            "ICP Discovery",
            "Find your perfect customers using signal clusters",
        ),
        campaign(
            Campaign::Outreach,
            "Hyper-Personalized Outreach",
            "Turn cold lists into warm conversations",
        ),
        campaign(
            Campaign::Account,
            "Account-Based Campaign",
            "Expand into strategic accounts with insights",
        ),
        campaign(
            Campaign::Engagement,
            "Engagement Campaign",
            "Join live conversations on Reddit, LinkedIn, Slack",
        ),
        campaign(
            Campaign::Intelligence,
            "Market Intelligence",
            "Track competitors and sentiment shifts",
        ),
        campaign(Campaign::Search, "AI Search Optimization", "Win in AI-native search (GEO/AEO)"),
        campaign(
            Campaign::Content,
            "Content Campaign",
            "Generate and distribute thought leadership",
        ),
        campaign(Campaign::Event, "Event & Launch", "Amplify your launches and announcements"),
        campaign(Campaign::Custom, "Custom Motion", "Let Scout design your custom GTM motion"),
    ]
}

impl FunnelProfile {
    /// The full Scout funnel: strict challenge gate, team size mandatory.
    pub fn scout() -> Self {
        Self {
            name: "scout".to_string(),
            brand: "ScaleAgentic".to_string(),
            challenges: vec![
                challenge(Challenge::Prospects, "Finding the right prospects at the right time"),
                challenge(
                    Challenge::Personalization,
                    "Breaking through the noise with personalization",
                ),
                challenge(Challenge::Competitors, "Tracking what competitors are doing"),
                challenge(Challenge::Pipeline, "Building pipeline from multiple channels"),
                challenge(
                    Challenge::Velocity,
                    "Accelerating deal velocity and shortening sales cycles",
                ),
                challenge(Challenge::Attribution, "Track and measure ROI across channels"),
            ],
            campaigns: full_campaign_catalog(),
            required_fields: default_required_fields(),
            challenge_gate: ChallengeGate::Strict,
            theme: ThemeTokens::default(),
            signals_per_campaign: default_signals_per_campaign(),
            demo_url: Some("https://calendly.com/scaleagentic/agent-scout".to_string()),
        }
    }

    /// Shorter variant: lenient challenge gate, team size optional.
    pub fn scout_lite() -> Self {
        Self {
            name: "scout-lite".to_string(),
            brand: "ScaleAgentic".to_string(),
            challenges: vec![
                challenge(Challenge::Prospects, "Finding the right prospects at the right time"),
                challenge(Challenge::Pipeline, "Building pipeline from multiple channels"),
                challenge(Challenge::Events, "Getting more out of events and launches"),
                challenge(Challenge::Other, "Something else"),
            ],
            campaigns: full_campaign_catalog(),
            required_fields: vec![
                ContactField::Email,
                ContactField::FirstName,
                ContactField::CompanyName,
            ],
            challenge_gate: ChallengeGate::Lenient,
            theme: ThemeTokens {
                primary: "#0F172A".to_string(),
                accent: "#38BDF8".to_string(),
            },
            signals_per_campaign: default_signals_per_campaign(),
            demo_url: None,
        }
    }

    /// Looks up a built-in profile by name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "scout" => Some(Self::scout()),
            "scout-lite" | "scout_lite" => Some(Self::scout_lite()),
            _ => None,
        }
    }

    /// Loads and validates a profile from a TOML/JSON/YAML file.
    pub fn from_file(path: &str) -> FunnelResult<Self> {
        let profile: FunnelProfile = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?
            .try_deserialize()?;
        profile.validate()?;
        debug!(profile = %profile.name, path, "Loaded funnel profile from file");
        Ok(profile)
    }

    pub fn validate(&self) -> FunnelResult<()> {
        if self.challenges.is_empty() {
            return Err(FunnelError::Profile(format!(
                "profile '{}' has an empty challenge catalog",
                self.name
            )));
        }
        if self.campaigns.is_empty() {
            return Err(FunnelError::Profile(format!(
                "profile '{}' has an empty campaign catalog",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = self.challenges.iter().find(|c| !seen.insert(c.tag)) {
            return Err(FunnelError::Profile(format!(
                "challenge '{}' listed twice in profile '{}'",
                dup.tag, self.name
            )));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.campaigns.iter().find(|c| !seen.insert(c.tag)) {
            return Err(FunnelError::Profile(format!(
                "campaign '{}' listed twice in profile '{}'",
                dup.tag, self.name
            )));
        }

        if !self.requires(ContactField::Email) {
            return Err(FunnelError::Profile(format!(
                "profile '{}' must require an email address",
                self.name
            )));
        }
        Ok(())
    }

    pub fn requires(&self, field: ContactField) -> bool {
        self.required_fields.contains(&field)
    }

    pub fn campaign_catalog_size(&self) -> usize {
        self.campaigns.len()
    }

    pub fn offers_challenge(&self, tag: Challenge) -> bool {
        self.challenges.iter().any(|c| c.tag == tag)
    }

    pub fn offers_campaign(&self, tag: Campaign) -> bool {
        self.campaigns.iter().any(|c| c.tag == tag)
    }
}

impl Default for FunnelProfile {
    fn default() -> Self {
        Self::scout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles_validate() {
        for name in ["scout", "scout-lite"] {
            let profile = FunnelProfile::builtin(name).unwrap();
            profile.validate().unwrap();
            assert_eq!(profile.campaign_catalog_size(), 9);
        }
        assert!(FunnelProfile::builtin("unknown").is_none());
    }

    #[test]
    fn test_variant_differences() {
        let scout = FunnelProfile::scout();
        let lite = FunnelProfile::scout_lite();

        assert_eq!(scout.challenge_gate, ChallengeGate::Strict);
        assert_eq!(lite.challenge_gate, ChallengeGate::Lenient);
        assert!(scout.requires(ContactField::TeamSize));
        assert!(!lite.requires(ContactField::TeamSize));
        assert!(scout.offers_challenge(Challenge::Velocity));
        assert!(!lite.offers_challenge(Challenge::Velocity));
    }

    #[test]
    fn test_duplicate_campaign_rejected() {
        let mut profile = FunnelProfile::scout();
        profile.campaigns.push(campaign(Campaign::Icp, "Again", ""));
        let err = profile.validate().unwrap_err();
        assert!(err.to_string().contains("listed twice"));
    }

    #[test]
    fn test_email_must_be_required() {
        let mut profile = FunnelProfile::scout_lite();
        profile.required_fields.retain(|f| *f != ContactField::Email);
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_profile_from_file() {
        let path = std::env::temp_dir().join(format!("funnel-profile-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
name = "partner"
brand = "Partner Co"
challenge_gate = "lenient"
required_fields = ["email", "first_name", "company_name"]

[[challenges]]
tag = "pipeline"
title = "Pipeline"

[[campaigns]]
tag = "icp"
title = "ICP Discovery"

[[campaigns]]
tag = "custom"
title = "Custom Motion"
"#,
        )
        .unwrap();

        let profile = FunnelProfile::from_file(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(profile.name, "partner");
        assert_eq!(profile.challenge_gate, ChallengeGate::Lenient);
        assert_eq!(profile.campaign_catalog_size(), 2);
        assert_eq!(profile.signals_per_campaign, 12);
        assert_eq!(profile.theme, ThemeTokens::default());
    }
}
