//! Popup lifecycle
//!
//! On startup the active tab's origin is restored once, then every live
//! change is persisted, either directly or through the coalescing queue.

use parking_lot::Mutex;
use std::sync::Arc;

use interceptor_session::{
    CoalescingWriter, IndexRepository, MetricsSnapshot, PersistenceMetrics, SaveOutcome,
    SessionRestorer, SnapshotWriter, StorageIndex,
};
use interceptor_storage::{Database, KeyValueStore};
use interceptor_tabs::{Listener, LiveState, LiveStore, RestoreState, SubscriptionId};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::flusher::spawn_flush_loop;
use crate::host::ActiveTabQuery;
use crate::Result;

pub struct Interceptor {
    config: Config,
    repo: IndexRepository,
    live: Arc<dyn LiveStore>,
    writer: SnapshotWriter,
    /// Present when the config asks for coalesced writes
    queue: Option<Arc<CoalescingWriter>>,
    restorer: SessionRestorer,
    subscription: Mutex<Option<SubscriptionId>>,
}

impl Interceptor {
    pub fn new(config: Config, storage: Arc<dyn KeyValueStore>, live: Arc<dyn LiveStore>) -> Self {
        let metrics = Arc::new(PersistenceMetrics::new());
        let repo = IndexRepository::with_key(storage, config.storage_key.clone(), metrics);
        let writer = SnapshotWriter::new(repo.clone());
        let queue = (config.coalesce_window_ms > 0).then(|| {
            Arc::new(CoalescingWriter::new(
                writer.clone(),
                config.coalesce_window(),
            ))
        });
        let restorer = SessionRestorer::new(repo.clone(), Arc::clone(&live));

        Self {
            config,
            repo,
            live,
            writer,
            queue,
            restorer,
            subscription: Mutex::new(None),
        }
    }

    /// Open the SQLite store named in the config and build on top of it
    pub fn open(config: Config, live: Arc<dyn LiveStore>) -> Result<Self> {
        config.validate()?;

        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&config.database_path)?;

        tracing::info!(path = %config.database_path.display(), "Opened session storage");

        Ok(Self::new(config, Arc::new(db), live))
    }

    /// Restore the active tab and start persisting changes.
    ///
    /// Returns `None` without touching any state when the host reports no
    /// active tab, or a tab without an id or URL.
    pub fn start(&self, host: &dyn ActiveTabQuery) -> Option<RestoreState> {
        let Some(tab) = host.active_tab() else {
            tracing::debug!("No active tab, skipping startup");
            return None;
        };

        let (Some(tab_id), Some(url)) = (tab.id, tab.url) else {
            tracing::debug!("Active tab has no id or URL, skipping startup");
            return None;
        };

        let state = self.restorer.restore(tab_id, &url);
        self.subscribe();

        tracing::info!(tab_id, restore_state = %state, "Interceptor started");

        Some(state)
    }

    fn subscribe(&self) {
        let mut subscription = self.subscription.lock();
        if subscription.is_some() {
            return;
        }

        let listener: Listener = match &self.queue {
            Some(queue) => {
                let queue = Arc::clone(queue);
                Arc::new(move |state: &LiveState| {
                    queue.notify(state);
                })
            }
            None => {
                let writer = self.writer.clone();
                Arc::new(move |state: &LiveState| {
                    writer.save(state);
                })
            }
        };

        *subscription = Some(self.live.subscribe(listener));
    }

    /// Stop persisting changes and write anything still queued
    pub fn stop(&self) -> Option<SaveOutcome> {
        if let Some(id) = self.subscription.lock().take() {
            self.live.unsubscribe(id);
        }
        self.flush()
    }

    pub fn is_running(&self) -> bool {
        self.subscription.lock().is_some()
    }

    /// Spawn the background flush loop; `None` when writes are not coalesced
    pub fn spawn_flusher(&self) -> Option<JoinHandle<()>> {
        self.queue.as_ref().map(|queue| spawn_flush_loop(Arc::clone(queue)))
    }

    pub fn flush(&self) -> Option<SaveOutcome> {
        self.queue.as_ref().and_then(|queue| queue.flush())
    }

    pub fn restore_state(&self, tab_id: interceptor_tabs::TabId) -> RestoreState {
        self.restorer.state_of(tab_id)
    }

    /// Current durable index, empty if nothing readable is stored
    pub fn stored_index(&self) -> StorageIndex {
        self.repo.load()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.repo.metrics().snapshot()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for Interceptor {
    fn drop(&mut self) {
        self.stop();
    }
}
