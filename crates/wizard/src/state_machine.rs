use std::fmt;

use funnel_core::profile::{ChallengeGate, FunnelProfile};
use funnel_core::types::ContactField;
use serde::{Deserialize, Serialize};

use crate::draft::LeadDraft;
use crate::step::Step;

/// Describes the single forward transition out of a step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepTransition {
    pub from: Step,
    pub to: Step,
    pub trigger: String,
}

/// Why the "Next" action is not available on the current step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    NoChallengeSelected,
    NoCampaignSelected,
    MissingContactFields(Vec<ContactField>),
    SubmissionInFlight,
    /// The contact step only moves on through a successful submission.
    SubmitRequired,
    Terminal,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::NoChallengeSelected => {
                f.write_str("pick at least one challenge or describe your own")
            }
            BlockReason::NoCampaignSelected => {
                f.write_str("pick at least one campaign or describe your own")
            }
            BlockReason::MissingContactFields(fields) => {
                let names: Vec<String> = fields.iter().map(ToString::to_string).collect();
                write!(f, "missing required fields: {}", names.join(", "))
            }
            BlockReason::SubmissionInFlight => f.write_str("a submission is already in progress"),
            BlockReason::SubmitRequired => f.write_str("submit the contact form to continue"),
            BlockReason::Terminal => f.write_str("the funnel is complete"),
        }
    }
}

/// Linear wizard with one forward transition per step and a gate in front
/// of each.
#[derive(Debug, Clone)]
pub struct FunnelStateMachine {
    pub transitions: Vec<StepTransition>,
}

impl FunnelStateMachine {
    pub fn new() -> Self {
        let transitions = Step::SEQUENCE
            .into_iter()
            .filter_map(|from| {
                let to = from.following()?;
                Some(StepTransition {
                    from,
                    to,
                    trigger: trigger_name(from).to_string(),
                })
            })
            .collect();
        Self { transitions }
    }

    pub fn transition_from(&self, step: Step) -> Option<&StepTransition> {
        self.transitions.iter().find(|t| t.from == step)
    }

    /// Applies the gate for `step`. Returns the target of the forward
    /// transition when it is open.
    pub fn evaluate(
        &self,
        step: Step,
        draft: &LeadDraft,
        profile: &FunnelProfile,
        submitting: bool,
    ) -> Result<Step, BlockReason> {
        let transition = self.transition_from(step).ok_or(BlockReason::Terminal)?;

        match step {
            Step::Landing => {}
            Step::Challenges => {
                if profile.challenge_gate == ChallengeGate::Strict
                    && draft.challenges.is_empty()
                    && !draft.has_challenge_custom()
                {
                    return Err(BlockReason::NoChallengeSelected);
                }
            }
            Step::Campaigns => {
                if draft.campaigns.is_empty() && !draft.has_campaign_custom() {
                    return Err(BlockReason::NoCampaignSelected);
                }
            }
            Step::Contact => {
                let missing = draft.missing_contact_fields(profile);
                if !missing.is_empty() {
                    return Err(BlockReason::MissingContactFields(missing));
                }
                if submitting {
                    return Err(BlockReason::SubmissionInFlight);
                }
            }
            Step::Confirmation => return Err(BlockReason::Terminal),
        }

        Ok(transition.to)
    }

    /// Whether the host should render the "Next" control. Only differs from
    /// the gate on a lenient challenges step, where the control stays hidden
    /// until a challenge is picked.
    pub fn next_visible(
        &self,
        step: Step,
        draft: &LeadDraft,
        profile: &FunnelProfile,
        submitting: bool,
    ) -> bool {
        if step == Step::Challenges && profile.challenge_gate == ChallengeGate::Lenient {
            return !draft.challenges.is_empty();
        }
        self.evaluate(step, draft, profile, submitting).is_ok()
    }
}

fn trigger_name(from: Step) -> &'static str {
    match from {
        Step::Landing => "start",
        Step::Challenges => "challenges_chosen",
        Step::Campaigns => "campaigns_chosen",
        Step::Contact | Step::Confirmation => "lead_submitted",
    }
}

impl Default for FunnelStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
