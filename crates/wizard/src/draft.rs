//! The visitor's answers, accumulated step by step until submission.

use std::collections::BTreeSet;

use funnel_core::profile::FunnelProfile;
use funnel_core::types::{Campaign, Challenge, ContactField, LeadRecord, TeamSize};
use serde::{Deserialize, Serialize};

/// Assignment of a single scalar field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Email(String),
    FirstName(String),
    CompanyName(String),
    TeamSize(Option<TeamSize>),
    ChallengeCustom(String),
    CampaignCustom(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadDraft {
    pub challenges: BTreeSet<Challenge>,
    pub campaigns: BTreeSet<Campaign>,
    pub challenge_custom: String,
    pub campaign_custom: String,
    pub email: String,
    pub first_name: String,
    pub company_name: String,
    pub team_size: Option<TeamSize>,
}

fn present(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl LeadDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the tag if absent, removes it if present. Returns whether the tag
    /// is selected afterwards.
    pub fn toggle_challenge(&mut self, tag: Challenge) -> bool {
        if !self.challenges.remove(&tag) {
            self.challenges.insert(tag);
            return true;
        }
        false
    }

    pub fn toggle_campaign(&mut self, tag: Campaign) -> bool {
        if !self.campaigns.remove(&tag) {
            self.campaigns.insert(tag);
            return true;
        }
        false
    }

    pub fn apply(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::Email(v) => self.email = v,
            FieldUpdate::FirstName(v) => self.first_name = v,
            FieldUpdate::CompanyName(v) => self.company_name = v,
            FieldUpdate::TeamSize(v) => self.team_size = v,
            FieldUpdate::ChallengeCustom(v) => self.challenge_custom = v,
            FieldUpdate::CampaignCustom(v) => self.campaign_custom = v,
        }
    }

    pub fn has_challenge_custom(&self) -> bool {
        present(&self.challenge_custom).is_some()
    }

    pub fn has_campaign_custom(&self) -> bool {
        present(&self.campaign_custom).is_some()
    }

    /// Selected campaigns plus one for a non-blank free-text campaign.
    pub fn campaign_total(&self) -> usize {
        self.campaigns.len() + usize::from(self.has_campaign_custom())
    }

    /// Required contact fields that are still blank, in form order.
    pub fn missing_contact_fields(&self, profile: &FunnelProfile) -> Vec<ContactField> {
        [
            ContactField::Email,
            ContactField::FirstName,
            ContactField::CompanyName,
            ContactField::TeamSize,
        ]
        .into_iter()
        .filter(|field| profile.requires(*field))
        .filter(|field| match field {
            ContactField::Email => self.email.trim().is_empty(),
            ContactField::FirstName => self.first_name.trim().is_empty(),
            ContactField::CompanyName => self.company_name.trim().is_empty(),
            ContactField::TeamSize => self.team_size.is_none(),
        })
        .collect()
    }

    /// Normalized snapshot for the lead store: trimmed strings, blank free
    /// text dropped, tags in catalog order.
    pub fn to_record(&self) -> LeadRecord {
        LeadRecord {
            email: self.email.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            company_name: self.company_name.trim().to_string(),
            team_size: self.team_size,
            challenges: self.challenges.iter().copied().collect(),
            campaigns: self.campaigns.iter().copied().collect(),
            challenge_custom: present(&self.challenge_custom),
            campaign_custom: present(&self.campaign_custom),
        }
    }
}
