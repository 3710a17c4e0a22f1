//! Reactive live-state store
//!
//! The popup view and the persistence layer both talk to live state through
//! [`LiveStore`]: take a snapshot, dispatch a mutation, or subscribe to be
//! told after every mutation.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::action::Action;
use crate::tab::LiveState;

/// Callback invoked with the new state after every successful dispatch
pub type Listener = Arc<dyn Fn(&LiveState) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub trait LiveStore: Send + Sync {
    /// Synchronous snapshot of the current state
    fn get_state(&self) -> LiveState;

    /// Apply a mutation and notify subscribers
    fn dispatch(&self, action: Action);

    fn subscribe(&self, listener: Listener) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

/// In-process [`LiveStore`] holding the state behind a lock.
pub struct TabStore {
    state: Arc<RwLock<LiveState>>,
    listeners: Arc<RwLock<Vec<(SubscriptionId, Listener)>>>,
    next_id: Arc<AtomicU64>,
}

impl TabStore {
    pub fn new() -> Self {
        Self::with_state(LiveState::default())
    }

    pub fn with_state(state: LiveState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
            listeners: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl Default for TabStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveStore for TabStore {
    fn get_state(&self) -> LiveState {
        self.state.read().clone()
    }

    fn dispatch(&self, action: Action) {
        let kind = action.kind();
        let tab_id = action.tab_id();

        let snapshot = {
            let mut state = self.state.write();
            if let Err(e) = state.apply(action) {
                tracing::warn!(action = kind, tab_id, error = %e, "Dropped action");
                return;
            }
            state.clone()
        };

        tracing::debug!(action = kind, tab_id, "Dispatched action");

        // Listeners may read the store again, so no lock is held while they run
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(&snapshot);
        }
    }

    fn subscribe(&self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.write().retain(|(sub_id, _)| *sub_id != id);
    }
}

impl Clone for TabStore {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            listeners: Arc::clone(&self.listeners),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_subscribers_see_every_change() {
        let store = TabStore::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        store.subscribe(Arc::new(move |_state: &LiveState| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        store.dispatch(Action::InitialiseDefaults {
            tab_id: 1,
            url: "https://example.com".to_string(),
        });
        store.dispatch(Action::UpdateRequest {
            tab_id: 1,
            request: Request::new("a", "https://x", "GET", "xmlhttprequest"),
        });

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.get_state().tab(1).unwrap().requests.len(), 1);
    }

    #[test]
    fn test_failed_action_does_not_notify() {
        let store = TabStore::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        store.subscribe(Arc::new(move |_state: &LiveState| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        store.dispatch(Action::ClearFields { tab_id: 42 });

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.get_state(), LiveState::default());
    }

    #[test]
    fn test_unsubscribe() {
        let store = TabStore::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let id = store.subscribe(Arc::new(move |_state: &LiveState| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        store.unsubscribe(id);

        store.dispatch(Action::InitialiseDefaults {
            tab_id: 1,
            url: "https://example.com".to_string(),
        });

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_listener_can_read_store() {
        let store = TabStore::new();
        let seen = Arc::new(RwLock::new(None));

        let reader = store.clone();
        let slot = Arc::clone(&seen);
        store.subscribe(Arc::new(move |_state: &LiveState| {
            *slot.write() = reader.get_state().current_tab;
        }));

        store.dispatch(Action::InitialiseDefaults {
            tab_id: 5,
            url: "https://example.com".to_string(),
        });

        assert_eq!(*seen.read(), Some(5));
    }
}
