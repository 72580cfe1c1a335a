use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use funnel_core::profile::FunnelProfile;
use funnel_core::types::{Campaign, Challenge, ContactField};
use funnel_store::LeadStore;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::counter::OpportunityCounter;
use crate::draft::{FieldUpdate, LeadDraft};
use crate::navigation::{self, Navigator};
use crate::state_machine::{BlockReason, FunnelStateMachine};
use crate::step::Step;
use crate::view::{self, Confirmation, FunnelView};

/// Notice shown when the lead store rejects or cannot be reached.
pub const SUBMISSION_FAILED_NOTICE: &str = "Something went wrong, please try again.";

/// Result of a call to [`FunnelController::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The lead was stored and the wizard moved to the confirmation step.
    Submitted,
    /// Another submission is still running; nothing was sent.
    AlreadyInFlight,
    /// The lead was already stored in this session; nothing was sent.
    AlreadySubmitted,
    /// Required contact fields are blank; nothing was sent.
    Incomplete(Vec<ContactField>),
    /// The store rejected the write. The notice is also kept on the
    /// controller until dismissed.
    Failed(String),
}

#[derive(Debug, Default)]
struct WizardState {
    step: Step,
    draft: LeadDraft,
    submitted: bool,
    notice: Option<String>,
}

/// Clears the loading flag when dropped, whichever way the submission ends.
struct LoadingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> LoadingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Owns the wizard position, the lead draft and the loading flag for one
/// visitor session, and performs the single lead-store write.
pub struct FunnelController {
    session_id: Uuid,
    profile: Arc<FunnelProfile>,
    store: Arc<dyn LeadStore>,
    navigator: Arc<dyn Navigator>,
    machine: FunnelStateMachine,
    counter: Arc<OpportunityCounter>,
    state: parking_lot::Mutex<WizardState>,
    loading: AtomicBool,
}

impl std::fmt::Debug for FunnelController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunnelController")
            .field("session_id", &self.session_id)
            .field("profile", &self.profile.name)
            .field("store", &self.store.name())
            .field("step", &self.step())
            .finish()
    }
}

impl FunnelController {
    pub fn new(
        profile: Arc<FunnelProfile>,
        store: Arc<dyn LeadStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            profile,
            store,
            navigator,
            machine: FunnelStateMachine::new(),
            counter: Arc::new(OpportunityCounter::default()),
            state: parking_lot::Mutex::new(WizardState::default()),
            loading: AtomicBool::new(false),
        }
    }

    /// Replace the default opportunity counter.
    pub fn with_counter(mut self, counter: Arc<OpportunityCounter>) -> Self {
        self.counter = counter;
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn profile(&self) -> &FunnelProfile {
        &self.profile
    }

    pub fn counter(&self) -> &Arc<OpportunityCounter> {
        &self.counter
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub fn step(&self) -> Step {
        self.state.lock().step
    }

    pub fn draft(&self) -> LeadDraft {
        self.state.lock().draft.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn is_submitted(&self) -> bool {
        self.state.lock().submitted
    }

    pub fn notice(&self) -> Option<String> {
        self.state.lock().notice.clone()
    }

    /// Dismisses the blocking notice, returning it.
    pub fn dismiss_notice(&self) -> Option<String> {
        self.state.lock().notice.take()
    }

    /// Moves to `target` and records it in the history. Does not check any
    /// gate; callers decide when this is allowed.
    pub fn advance(&self, target: Step) {
        let previous = {
            let mut state = self.state.lock();
            std::mem::replace(&mut state.step, target)
        };
        let url = navigation::with_step(&self.navigator.location(), target);
        self.navigator.push_state(url);
        info!(
            session_id = %self.session_id,
            from = %previous,
            to = %target,
            "Funnel step advanced"
        );
    }

    /// Whether the gate on the current step is open.
    pub fn can_advance(&self) -> Result<Step, BlockReason> {
        let state = self.state.lock();
        self.machine
            .evaluate(state.step, &state.draft, &self.profile, self.is_loading())
    }

    /// Advances past the current step if its gate is open. The contact step
    /// only moves forward through [`submit`](Self::submit).
    pub fn next(&self) -> Result<Step, BlockReason> {
        let (from, target) = {
            let state = self.state.lock();
            let target = self.machine.evaluate(
                state.step,
                &state.draft,
                &self.profile,
                self.is_loading(),
            )?;
            (state.step, target)
        };
        if target == Step::Confirmation {
            return Err(BlockReason::SubmitRequired);
        }
        if let Some(transition) = self.machine.transition_from(from) {
            debug!(
                session_id = %self.session_id,
                trigger = %transition.trigger,
                "Funnel transition fired"
            );
        }
        self.advance(target);
        Ok(target)
    }

    pub fn toggle_challenge(&self, tag: Challenge) {
        let mut state = self.state.lock();
        if state.submitted {
            debug!(%tag, "Ignoring challenge toggle after submission");
            return;
        }
        let selected = state.draft.toggle_challenge(tag);
        debug!(session_id = %self.session_id, %tag, selected, "Challenge toggled");
    }

    pub fn toggle_campaign(&self, tag: Campaign) {
        let mut state = self.state.lock();
        if state.submitted {
            debug!(%tag, "Ignoring campaign toggle after submission");
            return;
        }
        let selected = state.draft.toggle_campaign(tag);
        debug!(session_id = %self.session_id, %tag, selected, "Campaign toggled");
    }

    pub fn set_field(&self, update: FieldUpdate) {
        let mut state = self.state.lock();
        if state.submitted {
            debug!("Ignoring field update after submission");
            return;
        }
        state.draft.apply(update);
    }

    /// Sends the normalized draft to the lead store. At most one write is in
    /// flight at a time; failures leave the step and the draft untouched.
    pub async fn submit(&self) -> SubmitOutcome {
        let Some(_guard) = LoadingGuard::acquire(&self.loading) else {
            debug!(session_id = %self.session_id, "Submission already in flight");
            return SubmitOutcome::AlreadyInFlight;
        };

        let record = {
            let state = self.state.lock();
            if state.submitted {
                return SubmitOutcome::AlreadySubmitted;
            }
            let missing = state.draft.missing_contact_fields(&self.profile);
            if !missing.is_empty() {
                return SubmitOutcome::Incomplete(missing);
            }
            state.draft.to_record()
        };

        info!(
            session_id = %self.session_id,
            store = self.store.name(),
            challenges = record.challenges.len(),
            campaigns = record.campaigns.len(),
            "Submitting lead"
        );

        match self.store.insert_lead(&record).await {
            Ok(()) => {
                {
                    let mut state = self.state.lock();
                    state.submitted = true;
                    state.notice = None;
                }
                self.advance(Step::Confirmation);
                SubmitOutcome::Submitted
            }
            Err(e) => {
                error!(session_id = %self.session_id, error = %e, "Lead submission failed");
                self.state.lock().notice = Some(SUBMISSION_FAILED_NOTICE.to_string());
                SubmitOutcome::Failed(SUBMISSION_FAILED_NOTICE.to_string())
            }
        }
    }

    /// Re-derives the step from the navigator's current location. Called
    /// on every back/forward navigation.
    pub fn sync_from_location(&self) -> Step {
        let location = self.navigator.location();
        let step = navigation::step_from_location(&location);
        let previous = {
            let mut state = self.state.lock();
            std::mem::replace(&mut state.step, step)
        };
        if previous != step {
            info!(
                session_id = %self.session_id,
                from = %previous,
                to = %step,
                "Funnel step restored from history"
            );
        }
        step
    }

    pub fn campaign_power(&self) -> f64 {
        let total = self.state.lock().draft.campaign_total();
        view::campaign_power(total, self.profile.campaign_catalog_size())
    }

    pub fn view(&self) -> FunnelView {
        let loading = self.is_loading();
        let state = self.state.lock();
        let campaign_total = state.draft.campaign_total();
        FunnelView {
            step: state.step,
            progress: view::progress_dots(state.step),
            opportunity_count: self.counter.get(),
            campaign_total,
            campaign_power: view::campaign_power(
                campaign_total,
                self.profile.campaign_catalog_size(),
            ),
            next_visible: self
                .machine
                .next_visible(state.step, &state.draft, &self.profile, loading),
            loading,
            notice: state.notice.clone(),
            confirmation: (state.step == Step::Confirmation && state.submitted)
                .then(|| Confirmation::build(&state.draft, &self.profile)),
        }
    }
}
