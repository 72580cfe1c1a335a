pub mod config;
pub mod error;
pub mod profile;
pub mod types;

pub use config::AppConfig;
pub use error::{FunnelError, FunnelResult};
pub use profile::{ChallengeGate, FunnelProfile};
