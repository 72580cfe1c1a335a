//! Navigable location. The wizard position lives in a single `step` query
//! parameter; back/forward navigation is reported as [`PopState`] events.

use tokio::sync::broadcast;
use tracing::debug;
use url::Url;

use crate::step::Step;

const STEP_PARAM: &str = "step";

/// A back/forward navigation that landed on `location`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopState {
    pub location: Url,
}

/// The hosting environment's history, as seen by the controller.
pub trait Navigator: Send + Sync {
    /// Current address shown to the visitor.
    fn location(&self) -> Url;

    /// Adds a history entry without emitting a [`PopState`].
    fn push_state(&self, url: Url);

    /// Stream of back/forward navigations.
    fn subscribe(&self) -> broadcast::Receiver<PopState>;
}

/// Step encoded in `location`. Missing, malformed or unknown markers fall
/// back to the landing step.
pub fn step_from_location(location: &Url) -> Step {
    location
        .query_pairs()
        .find(|(key, _)| key == STEP_PARAM)
        .and_then(|(_, value)| value.trim().parse::<u32>().ok())
        .and_then(Step::from_number)
        .unwrap_or_default()
}

/// `location` with its `step` parameter set to `step`; other parameters are
/// kept in order.
pub fn with_step(location: &Url, step: Step) -> Url {
    let others: Vec<(String, String)> = location
        .query_pairs()
        .filter(|(key, _)| key != STEP_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut next = location.clone();
    next.query_pairs_mut()
        .clear()
        .extend_pairs(others)
        .append_pair(STEP_PARAM, &step.number().to_string());
    next
}

#[derive(Debug)]
struct HistoryStack {
    entries: Vec<Url>,
    cursor: usize,
}

/// In-process browsing history with a cursor, like a browser tab's.
pub struct SessionHistory {
    stack: parking_lot::Mutex<HistoryStack>,
    events: broadcast::Sender<PopState>,
}

impl std::fmt::Debug for SessionHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stack = self.stack.lock();
        f.debug_struct("SessionHistory")
            .field("entries", &stack.entries.len())
            .field("cursor", &stack.cursor)
            .finish()
    }
}

impl SessionHistory {
    pub fn new(initial: Url) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            stack: parking_lot::Mutex::new(HistoryStack {
                entries: vec![initial],
                cursor: 0,
            }),
            events,
        }
    }

    pub fn len(&self) -> usize {
        self.stack.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.lock().entries.is_empty()
    }

    pub fn back(&self) -> Option<Url> {
        self.go(-1)
    }

    pub fn forward(&self) -> Option<Url> {
        self.go(1)
    }

    /// Moves the cursor by `delta` entries. Out-of-range moves are ignored.
    pub fn go(&self, delta: isize) -> Option<Url> {
        let location = {
            let mut stack = self.stack.lock();
            let target = stack.cursor.checked_add_signed(delta)?;
            if target >= stack.entries.len() || delta == 0 {
                return None;
            }
            stack.cursor = target;
            stack.entries[target].clone()
        };

        debug!(location = %location, "History pop");
        // Nobody listening is fine; the location is still updated.
        let _ = self.events.send(PopState {
            location: location.clone(),
        });
        Some(location)
    }
}

impl Navigator for SessionHistory {
    fn location(&self) -> Url {
        let stack = self.stack.lock();
        stack.entries[stack.cursor].clone()
    }

    fn push_state(&self, url: Url) {
        let mut stack = self.stack.lock();
        let keep = stack.cursor + 1;
        stack.entries.truncate(keep);
        stack.entries.push(url);
        stack.cursor = stack.entries.len() - 1;
    }

    fn subscribe(&self) -> broadcast::Receiver<PopState> {
        self.events.subscribe()
    }
}
