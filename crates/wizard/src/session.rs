//! Session lifecycle — the counter ticker and the history observer live as
//! long as the wizard is displayed and are aborted with the session.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::controller::FunnelController;
use crate::navigation::Navigator;

pub struct FunnelSession {
    controller: Arc<FunnelController>,
    started_at: DateTime<Utc>,
    handles: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for FunnelSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunnelSession")
            .field("session_id", &self.controller.session_id())
            .field("started_at", &self.started_at)
            .field("tasks", &self.handles.len())
            .finish()
    }
}

impl FunnelSession {
    /// Spawns the background tasks for `controller`. Must be called from
    /// within a tokio runtime.
    pub fn start(controller: Arc<FunnelController>, counter_period: Duration) -> Self {
        let ticker = controller.counter().clone().spawn_ticker(counter_period);
        let observer = spawn_history_observer(controller.clone());

        info!(
            session_id = %controller.session_id(),
            profile = %controller.profile().name,
            "Funnel session started"
        );

        Self {
            controller,
            started_at: Utc::now(),
            handles: vec![ticker, observer],
        }
    }

    pub fn controller(&self) -> &Arc<FunnelController> {
        &self.controller
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Number of background tasks still running.
    pub fn active_tasks(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }

    /// Stops the background tasks and waits for them to wind down.
    pub async fn close(mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "Funnel session task panicked");
                }
            }
        }
        info!(session_id = %self.controller.session_id(), "Funnel session closed");
    }
}

impl Drop for FunnelSession {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

fn spawn_history_observer(controller: Arc<FunnelController>) -> JoinHandle<()> {
    let mut events = controller.navigator().subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(pop) => {
                    debug!(location = %pop.location, "History navigation observed");
                    controller.sync_from_location();
                }
                // Only the latest location matters.
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "History observer lagged");
                    controller.sync_from_location();
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
