//! Lead funnel wizard — the step state machine, the accumulating lead draft,
//! history synchronisation, and the controller that ties them to a lead
//! store.
//!
//! # Modules
//!
//! - [`step`]: the fixed step sequence `1, 2, 3, 5, 6`
//! - [`draft`]: the visitor's answers and their normalisation into a lead record
//! - [`state_machine`]: per-step gating rules
//! - [`navigation`]: navigable location and session history
//! - [`counter`]: cosmetic opportunity counter
//! - [`view`]: derived display values
//! - [`controller`]: the funnel controller
//! - [`session`]: lifecycle of the background tasks around a controller

pub mod controller;
pub mod counter;
pub mod draft;
pub mod navigation;
pub mod session;
pub mod state_machine;
pub mod step;
pub mod view;

pub use controller::{FunnelController, SubmitOutcome};
pub use counter::OpportunityCounter;
pub use draft::{FieldUpdate, LeadDraft};
pub use navigation::{Navigator, PopState, SessionHistory};
pub use session::FunnelSession;
pub use state_machine::{BlockReason, FunnelStateMachine};
pub use step::Step;
pub use view::FunnelView;
