//! Lead persistence — the single outbound write of the funnel.
//!
//! # Modules
//!
//! - [`store`]: the `LeadStore` trait and its error type
//! - [`memory`]: in-process store for development and tests
//! - [`rest`]: hosted database store speaking the PostgREST insert protocol

pub mod memory;
pub mod rest;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use funnel_core::config::{StoreBackend, StoreConfig};
use funnel_core::{FunnelError, FunnelResult};
use tracing::info;

pub use memory::MemoryLeadStore;
pub use rest::RestLeadStore;
pub use store::{LeadStore, StoreError};

/// Builds the store selected by configuration.
pub fn build_store(config: &StoreConfig) -> FunnelResult<Arc<dyn LeadStore>> {
    match config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory lead store");
            Ok(Arc::new(MemoryLeadStore::new()))
        }
        StoreBackend::Rest => {
            let url = config.url.as_deref().ok_or_else(|| {
                FunnelError::Config("store.url is required for the rest backend".into())
            })?;
            let api_key = config.api_key.as_deref().ok_or_else(|| {
                FunnelError::Config("store.api_key is required for the rest backend".into())
            })?;
            let store = RestLeadStore::new(
                url,
                api_key,
                &config.table,
                Duration::from_millis(config.timeout_ms),
            )
            .map_err(|e| FunnelError::Store(e.to_string()))?;
            info!(endpoint = %store.endpoint(), "Using REST lead store");
            Ok(Arc::new(store))
        }
    }
}
