use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FunnelError;

/// Go-to-market challenge a visitor can report on the challenges step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Challenge {
    Prospects,
    Personalization,
    Competitors,
    Pipeline,
    Velocity,
    Attribution,
    Events,
    Other,
}

impl Challenge {
    pub const ALL: [Challenge; 8] = [
        Challenge::Prospects,
        Challenge::Personalization,
        Challenge::Competitors,
        Challenge::Pipeline,
        Challenge::Velocity,
        Challenge::Attribution,
        Challenge::Events,
        Challenge::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Challenge::Prospects => "prospects",
            Challenge::Personalization => "personalization",
            Challenge::Competitors => "competitors",
            Challenge::Pipeline => "pipeline",
            Challenge::Velocity => "velocity",
            Challenge::Attribution => "attribution",
            Challenge::Events => "events",
            Challenge::Other => "other",
        }
    }
}

impl fmt::Display for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Challenge {
    type Err = FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Challenge::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| FunnelError::Validation(format!("unknown challenge tag '{s}'")))
    }
}

/// Campaign type a visitor wants run for them. The catalog has nine kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Campaign {
    Engagement,
    Icp,
    Outreach,
    Account,
    Event,
    Search,
    Content,
    Intelligence,
    Custom,
}

impl Campaign {
    pub const ALL: [Campaign; 9] = [
        Campaign::Engagement,
        Campaign::Icp,
        Campaign::Outreach,
        Campaign::Account,
        Campaign::Event,
        Campaign::Search,
        Campaign::Content,
        Campaign::Intelligence,
        Campaign::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Campaign::Engagement => "engagement",
            Campaign::Icp => "icp",
            Campaign::Outreach => "outreach",
            Campaign::Account => "account",
            Campaign::Event => "event",
            Campaign::Search => "search",
            Campaign::Content => "content",
            Campaign::Intelligence => "intelligence",
            Campaign::Custom => "custom",
        }
    }
}

impl fmt::Display for Campaign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Campaign {
    type Err = FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Campaign::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| FunnelError::Validation(format!("unknown campaign tag '{s}'")))
    }
}

/// Company size bracket, ordered smallest to largest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TeamSize {
    #[serde(rename = "1-5")]
    UpTo5,
    #[serde(rename = "6-20")]
    UpTo20,
    #[serde(rename = "21-50")]
    UpTo50,
    #[serde(rename = "51-200")]
    UpTo200,
    #[serde(rename = "201-500")]
    UpTo500,
    #[serde(rename = "501-1000")]
    UpTo1000,
    #[serde(rename = "1000+")]
    Over1000,
}

impl TeamSize {
    pub const ALL: [TeamSize; 7] = [
        TeamSize::UpTo5,
        TeamSize::UpTo20,
        TeamSize::UpTo50,
        TeamSize::UpTo200,
        TeamSize::UpTo500,
        TeamSize::UpTo1000,
        TeamSize::Over1000,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TeamSize::UpTo5 => "1-5",
            TeamSize::UpTo20 => "6-20",
            TeamSize::UpTo50 => "21-50",
            TeamSize::UpTo200 => "51-200",
            TeamSize::UpTo500 => "201-500",
            TeamSize::UpTo1000 => "501-1000",
            TeamSize::Over1000 => "1000+",
        }
    }
}

impl fmt::Display for TeamSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TeamSize {
    type Err = FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TeamSize::ALL
            .into_iter()
            .find(|t| t.label() == s.trim())
            .ok_or_else(|| FunnelError::Validation(format!("unknown team size '{s}'")))
    }
}

/// Scalar contact fields collected on the contact step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Email,
    FirstName,
    CompanyName,
    TeamSize,
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContactField::Email => "email",
            ContactField::FirstName => "first name",
            ContactField::CompanyName => "company name",
            ContactField::TeamSize => "team size",
        };
        f.write_str(name)
    }
}

/// Normalized lead snapshot handed to the lead store. Field names match the
/// `submissions` table columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub email: String,
    pub first_name: String,
    pub company_name: String,
    pub team_size: Option<TeamSize>,
    pub challenges: Vec<Challenge>,
    pub campaigns: Vec<Campaign>,
    pub challenge_custom: Option<String>,
    pub campaign_custom: Option<String>,
}
