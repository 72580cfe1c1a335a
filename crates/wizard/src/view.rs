//! Derived display values. Nothing here is persisted or sent to the store.

use funnel_core::profile::FunnelProfile;
use serde::Serialize;

use crate::draft::LeadDraft;
use crate::step::Step;

/// `(selected campaigns + custom) / catalog size`, clamped to `[0, 1]`.
pub fn campaign_power(campaign_total: usize, catalog_size: usize) -> f64 {
    if catalog_size == 0 {
        return 0.0;
    }
    (campaign_total as f64 / catalog_size as f64).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressDot {
    pub step: Step,
    pub current: bool,
}

pub fn progress_dots(current: Step) -> Vec<ProgressDot> {
    Step::SEQUENCE
        .into_iter()
        .map(|step| ProgressDot {
            step,
            current: step == current,
        })
        .collect()
}

/// Landing headline around the live opportunity count.
pub fn landing_headline(opportunity_count: u64) -> String {
    format!("Scout found {opportunity_count} GTM opportunities for companies like yours this week")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub signals_tracked: u64,
    pub headline: String,
    pub message: String,
    pub demo_url: Option<String>,
}

impl Confirmation {
    pub fn build(draft: &LeadDraft, profile: &FunnelProfile) -> Self {
        let signals_tracked =
            draft.campaign_total() as u64 * u64::from(profile.signals_per_campaign);
        Self {
            signals_tracked,
            headline: format!("Scout is now tracking {signals_tracked} signals for you!"),
            message: format!(
                "Welcome to {}, {}! Your personalized GTM opportunities are being generated \
                 and will be in your inbox within 5 minutes.",
                profile.brand,
                draft.first_name.trim()
            ),
            demo_url: profile.demo_url.clone(),
        }
    }
}

/// Everything a host needs to render the current step.
#[derive(Debug, Clone, Serialize)]
pub struct FunnelView {
    pub step: Step,
    pub progress: Vec<ProgressDot>,
    pub opportunity_count: u64,
    pub campaign_total: usize,
    pub campaign_power: f64,
    pub next_visible: bool,
    pub loading: bool,
    pub notice: Option<String>,
    pub confirmation: Option<Confirmation>,
}
