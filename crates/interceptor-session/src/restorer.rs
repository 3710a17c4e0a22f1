//! Session restorer
//!
//! Replays a stored origin into a freshly opened tab through the live
//! store's ordinary actions, so the view sees restoration as normal edits.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use interceptor_tabs::{Action, LiveStore, RestoreState, TabId};

use crate::origin::hostname_of;
use crate::repository::IndexRepository;
use crate::Result;

pub struct SessionRestorer {
    repo: IndexRepository,
    store: Arc<dyn LiveStore>,
    /// Restoration progress per tab; a tab is only ever restored once
    states: Arc<RwLock<HashMap<TabId, RestoreState>>>,
}

struct Replayed {
    hostname: String,
    requests: usize,
    enabled: usize,
    responses: usize,
}

impl SessionRestorer {
    pub fn new(repo: IndexRepository, store: Arc<dyn LiveStore>) -> Self {
        Self {
            repo,
            store,
            states: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn state_of(&self, tab_id: TabId) -> RestoreState {
        self.states
            .read()
            .get(&tab_id)
            .copied()
            .unwrap_or(RestoreState::Uninitialized)
    }

    /// Load defaults for the tab, then replay whatever is stored for the
    /// origin's hostname. Never fails; anything that goes wrong leaves the
    /// defaults in place.
    pub fn restore(&self, tab_id: TabId, origin_url: &str) -> RestoreState {
        let current = self.state_of(tab_id);
        if current != RestoreState::Uninitialized {
            tracing::debug!(tab_id, state = %current, "Tab already restored");
            return current;
        }

        self.store.dispatch(Action::InitialiseDefaults {
            tab_id,
            url: origin_url.to_string(),
        });
        self.transition(tab_id, RestoreState::DefaultsLoaded);

        let outcome = match self.replay(tab_id, origin_url) {
            Ok(Some(replayed)) => {
                self.repo.metrics().record_restore();
                tracing::info!(
                    tab_id,
                    hostname = %replayed.hostname,
                    request_count = replayed.requests,
                    enabled_count = replayed.enabled,
                    response_count = replayed.responses,
                    "Restored session from storage"
                );
                RestoreState::RestoredFromStorage
            }
            Ok(None) => {
                self.repo.metrics().record_restore_miss();
                RestoreState::EmptyNoMatch
            }
            Err(e) => {
                self.repo.metrics().record_failure(&e);
                self.repo.metrics().record_restore_miss();
                tracing::warn!(tab_id, error = %e, "Failed to restore session");
                RestoreState::EmptyNoMatch
            }
        };

        self.transition(tab_id, outcome);
        outcome
    }

    fn replay(&self, tab_id: TabId, origin_url: &str) -> Result<Option<Replayed>> {
        let index = self.repo.load();
        let hostname = hostname_of(origin_url)?;

        let Some(origin) = index.find(&hostname) else {
            tracing::debug!(tab_id, hostname = %hostname, "No stored session for origin");
            return Ok(None);
        };

        self.store.dispatch(Action::ClearFields { tab_id });

        for request in &origin.requests {
            self.store.dispatch(Action::UpdateRequest {
                tab_id,
                request: request.to_live(tab_id),
            });

            if request.enabled {
                self.store.dispatch(Action::HandleCheckToggle {
                    tab_id,
                    request_id: request.request_id.clone(),
                    checked: true,
                });
            }
        }

        let mut responses = 0;
        for (request_id, record) in &origin.request_records {
            if !record.has_response_text() {
                continue;
            }
            self.store.dispatch(Action::HandleRespTextChange {
                response_text: record.response_text.clone(),
                request_id: request_id.clone(),
                tab_id,
            });
            responses += 1;
        }

        Ok(Some(Replayed {
            hostname,
            requests: origin.requests.len(),
            enabled: origin.enabled_count(),
            responses,
        }))
    }

    fn transition(&self, tab_id: TabId, next: RestoreState) {
        let mut states = self.states.write();
        let current = states
            .get(&tab_id)
            .copied()
            .unwrap_or(RestoreState::Uninitialized);

        if !current.can_transition_to(next) {
            tracing::warn!(tab_id, from = %current, to = %next, "Invalid restore transition");
            return;
        }

        states.insert(tab_id, next);
    }
}

impl Clone for SessionRestorer {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            store: Arc::clone(&self.store),
            states: Arc::clone(&self.states),
        }
    }
}
