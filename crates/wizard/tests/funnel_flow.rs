//! End-to-end funnel flows against in-process stores.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use funnel_core::profile::FunnelProfile;
use funnel_core::types::{Campaign, Challenge, ContactField, LeadRecord, TeamSize};
use funnel_store::{LeadStore, MemoryLeadStore, StoreError};
use funnel_wizard::controller::SUBMISSION_FAILED_NOTICE;
use funnel_wizard::navigation::step_from_location;
use funnel_wizard::{
    BlockReason, FieldUpdate, FunnelController, Navigator, SessionHistory, Step, SubmitOutcome,
};
use tokio::sync::Notify;
use url::Url;

fn history() -> Arc<SessionHistory> {
    Arc::new(SessionHistory::new(
        Url::parse("https://scout.example.com/?ref=newsletter").unwrap(),
    ))
}

fn fill_contact(controller: &FunnelController) {
    controller.set_field(FieldUpdate::Email("ada@example.com".into()));
    controller.set_field(FieldUpdate::FirstName("Ada".into()));
    controller.set_field(FieldUpdate::CompanyName("Analytical Engines".into()));
    controller.set_field(FieldUpdate::TeamSize(Some(TeamSize::UpTo20)));
}

/// Store whose insert parks until released.
#[derive(Default)]
struct GatedStore {
    entered: Notify,
    release: Notify,
    calls: AtomicU64,
}

#[async_trait]
impl LeadStore for GatedStore {
    async fn insert_lead(&self, _lead: &LeadRecord) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.release.notified().await;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "gated"
    }
}

#[tokio::test]
async fn test_happy_path_scenario() {
    let store = Arc::new(MemoryLeadStore::new());
    let history = history();
    let controller = FunnelController::new(
        Arc::new(FunnelProfile::scout()),
        store.clone(),
        history.clone(),
    );
    assert_eq!(controller.step(), Step::Landing);

    controller.advance(Step::Challenges);
    controller.toggle_challenge(Challenge::Prospects);
    assert_eq!(controller.next(), Ok(Step::Campaigns));
    controller.toggle_campaign(Campaign::Icp);
    controller.toggle_campaign(Campaign::Outreach);
    controller.advance(Step::Contact);
    assert_eq!(controller.view().campaign_total, 2);

    fill_contact(&controller);
    assert_eq!(controller.submit().await, SubmitOutcome::Submitted);

    assert_eq!(controller.step(), Step::Confirmation);
    assert!(!controller.is_loading());
    assert_eq!(step_from_location(&history.location()), Step::Confirmation);
    assert_eq!(
        history.location().as_str(),
        "https://scout.example.com/?ref=newsletter&step=6"
    );

    let view = controller.view();
    let confirmation = view.confirmation.expect("confirmation after submit");
    assert_eq!(confirmation.signals_tracked, 24);
    assert!(confirmation.message.contains("Ada"));
    assert_eq!(controller.draft().first_name, "Ada");

    let leads = store.leads();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].record.challenges, vec![Challenge::Prospects]);
    assert_eq!(leads[0].record.campaigns, vec![Campaign::Icp, Campaign::Outreach]);
    assert_eq!(leads[0].record.team_size, Some(TeamSize::UpTo20));
}

#[tokio::test]
async fn test_failed_submission_keeps_step_and_draft() {
    let store = Arc::new(MemoryLeadStore::new());
    store.set_failing(true);
    let controller =
        FunnelController::new(Arc::new(FunnelProfile::scout()), store.clone(), history());

    controller.advance(Step::Contact);
    controller.toggle_campaign(Campaign::Search);
    fill_contact(&controller);

    let outcome = controller.submit().await;
    assert_eq!(outcome, SubmitOutcome::Failed(SUBMISSION_FAILED_NOTICE.to_string()));
    assert_eq!(controller.step(), Step::Contact);
    assert!(!controller.is_loading());
    assert_eq!(controller.notice().as_deref(), Some(SUBMISSION_FAILED_NOTICE));
    assert_eq!(controller.draft().email, "ada@example.com");
    assert_eq!(store.attempts(), 1);

    // Manual retry after the store recovers.
    assert!(controller.dismiss_notice().is_some());
    store.set_failing(false);
    assert_eq!(controller.submit().await, SubmitOutcome::Submitted);
    assert_eq!(controller.step(), Step::Confirmation);
    assert_eq!(store.attempts(), 2);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_submit_while_in_flight_is_noop() {
    let store = Arc::new(GatedStore::default());
    let controller = Arc::new(FunnelController::new(
        Arc::new(FunnelProfile::scout()),
        store.clone(),
        history(),
    ));
    controller.advance(Step::Contact);
    fill_contact(&controller);

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.submit().await })
    };

    store.entered.notified().await;
    assert!(controller.is_loading());
    assert_eq!(controller.can_advance(), Err(BlockReason::SubmissionInFlight));
    assert_eq!(controller.submit().await, SubmitOutcome::AlreadyInFlight);

    store.release.notify_one();
    assert_eq!(first.await.unwrap(), SubmitOutcome::Submitted);
    assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    assert!(!controller.is_loading());
}

#[tokio::test]
async fn test_incomplete_contact_is_not_sent() {
    let store = Arc::new(MemoryLeadStore::new());
    let controller =
        FunnelController::new(Arc::new(FunnelProfile::scout()), store.clone(), history());
    controller.advance(Step::Contact);
    controller.set_field(FieldUpdate::Email("ada@example.com".into()));

    let outcome = controller.submit().await;
    assert_eq!(
        outcome,
        SubmitOutcome::Incomplete(vec![
            ContactField::FirstName,
            ContactField::CompanyName,
            ContactField::TeamSize,
        ])
    );
    assert_eq!(store.attempts(), 0);
    assert!(!controller.is_loading());
}

#[tokio::test]
async fn test_draft_frozen_after_submission() {
    let store = Arc::new(MemoryLeadStore::new());
    let controller =
        FunnelController::new(Arc::new(FunnelProfile::scout_lite()), store.clone(), history());
    controller.toggle_challenge(Challenge::Events);
    controller.toggle_campaign(Campaign::Event);
    controller.advance(Step::Contact);
    controller.set_field(FieldUpdate::Email("ada@example.com".into()));
    controller.set_field(FieldUpdate::FirstName("Ada".into()));
    controller.set_field(FieldUpdate::CompanyName("Engines".into()));

    assert_eq!(controller.submit().await, SubmitOutcome::Submitted);
    assert_eq!(store.leads()[0].record.team_size, None);

    controller.toggle_campaign(Campaign::Content);
    controller.set_field(FieldUpdate::FirstName("Someone else".into()));
    let draft = controller.draft();
    assert_eq!(draft.first_name, "Ada");
    assert_eq!(draft.campaigns.len(), 1);

    assert_eq!(controller.submit().await, SubmitOutcome::AlreadySubmitted);
    assert_eq!(store.attempts(), 1);
    assert_eq!(controller.next(), Err(BlockReason::Terminal));
}

#[tokio::test]
async fn test_gated_next_walkthrough() {
    let controller = FunnelController::new(
        Arc::new(FunnelProfile::scout()),
        Arc::new(MemoryLeadStore::new()),
        history(),
    );

    assert_eq!(controller.next(), Ok(Step::Challenges));
    assert_eq!(controller.next(), Err(BlockReason::NoChallengeSelected));
    controller.set_field(FieldUpdate::ChallengeCustom("long sales cycles".into()));
    assert_eq!(controller.next(), Ok(Step::Campaigns));
    assert_eq!(controller.next(), Err(BlockReason::NoCampaignSelected));
    controller.set_field(FieldUpdate::CampaignCustom("partner co-marketing".into()));
    assert!((controller.campaign_power() - 1.0 / 9.0).abs() < 1e-9);
    assert_eq!(controller.next(), Ok(Step::Contact));

    fill_contact(&controller);
    assert_eq!(controller.next(), Err(BlockReason::SubmitRequired));
    assert_eq!(controller.step(), Step::Contact);
}
