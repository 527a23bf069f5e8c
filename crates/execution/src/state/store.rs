//! Single dispatch entry point over the dashboard state.

use super::{Action, AppState, orphaned_positions, reduce};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Owns the [`AppState`]; cheap to clone, every clone shares the same state.
///
/// Actions are applied one at a time in dispatch order. Readers either take a
/// snapshot or subscribe to changes.
#[derive(Clone)]
pub struct Store {
    sender: Arc<watch::Sender<AppState>>,
}

impl Store {
    /// Creates a store holding the default state.
    #[must_use]
    pub fn new() -> Self {
        Self::with_state(AppState::default())
    }

    #[must_use]
    pub fn with_state(state: AppState) -> Self {
        let (sender, _) = watch::channel(state);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Applies `action` through the reducer.
    pub fn dispatch(&self, action: Action) {
        let name = action.name();
        let tracks_tokens = matches!(action, Action::SetTokenAddress(..));
        debug!(action = name, "Dispatching action");

        self.sender.send_modify(|state| {
            let current = std::mem::take(state);
            *state = reduce(current, action);
        });

        if tracks_tokens {
            let orphaned = self.select(|s| orphaned_positions(s).len());
            if orphaned > 0 {
                warn!(
                    orphaned,
                    "Pending positions reference tokens no longer selected; their reservations are not shown"
                );
            }
        }
    }

    pub fn dispatch_all(&self, actions: impl IntoIterator<Item = Action>) {
        for action in actions {
            self.dispatch(action);
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AppState {
        self.sender.borrow().clone()
    }

    /// Reads through `f` without cloning the state.
    pub fn select<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.sender.borrow())
    }

    /// Receiver notified after every dispatch.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.sender.subscribe()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
