use thiserror::Error;

pub type FunnelResult<T> = Result<T, FunnelError>;

#[derive(Error, Debug)]
pub enum FunnelError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Profile error: {0}")]
    Profile(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Lead store error: {0}")]
    Store(String),
}

impl From<config::ConfigError> for FunnelError {
    fn from(err: config::ConfigError) -> Self {
        FunnelError::Config(err.to_string())
    }
}
