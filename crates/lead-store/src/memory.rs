//! In-memory lead store. Keeps every accepted lead in insertion order and can
//! be told to reject writes.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use funnel_core::types::LeadRecord;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::store::{LeadStore, StoreError};

#[derive(Debug, Clone)]
pub struct StoredLead {
    pub id: Uuid,
    pub record: LeadRecord,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct MemoryLeadStore {
    leads: parking_lot::Mutex<Vec<StoredLead>>,
    attempts: AtomicU64,
    failing: AtomicBool,
}

impl MemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every insert is rejected.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of insert calls received, accepted or not.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.leads.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.lock().is_empty()
    }

    pub fn leads(&self) -> Vec<StoredLead> {
        self.leads.lock().clone()
    }
}

#[async_trait]
impl LeadStore for MemoryLeadStore {
    async fn insert_lead(&self, lead: &LeadRecord) -> Result<(), StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            warn!(email = %lead.email, "Memory store rejecting insert");
            return Err(StoreError::Unavailable("memory store is set to fail".into()));
        }

        let stored = StoredLead {
            id: Uuid::new_v4(),
            record: lead.clone(),
            received_at: Utc::now(),
        };
        debug!(lead_id = %stored.id, email = %lead.email, "Lead stored in memory");
        self.leads.lock().push(stored);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
