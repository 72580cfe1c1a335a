use async_trait::async_trait;
use funnel_core::types::LeadRecord;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Lead store rejected the insert (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Lead store unreachable: {0}")]
    Transport(String),

    #[error("Lead store unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Transport(err.to_string())
    }
}

/// External persistence collaborator. A single atomic insert; leads are
/// never read back through this interface.
#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn insert_lead(&self, lead: &LeadRecord) -> Result<(), StoreError>;

    /// Short label used in logs.
    fn name(&self) -> &'static str;
}
