//! Coalescing write queue
//!
//! Bursts of live-state changes collapse into one durable write per window.
//! The first change after a quiet period is written immediately; changes
//! inside the window only replace the pending snapshot, which is written
//! once the window has elapsed. A pending snapshot is only ever replaced by
//! one for the same tab and hostname; a change that targets anything else
//! writes the pending snapshot first.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

use interceptor_tabs::{LiveState, TabId};

use crate::origin::hostname_of;
use crate::writer::{SaveOutcome, SnapshotWriter};

pub struct CoalescingWriter {
    writer: SnapshotWriter,
    window: Duration,
    queue: Mutex<QueueState>,
}

#[derive(Default)]
struct QueueState {
    pending: Option<LiveState>,
    last_flush: Option<Instant>,
}

impl CoalescingWriter {
    pub fn new(writer: SnapshotWriter, window: Duration) -> Self {
        Self {
            writer,
            window,
            queue: Mutex::new(QueueState::default()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn has_pending(&self) -> bool {
        self.queue.lock().pending.is_some()
    }

    pub fn notify(&self, state: &LiveState) -> Option<SaveOutcome> {
        self.notify_at(state, Instant::now())
    }

    /// Accept a change notification. Returns the outcome when it was written
    /// straight away, `None` when it was queued.
    pub fn notify_at(&self, state: &LiveState, now: Instant) -> Option<SaveOutcome> {
        let mut queue = self.queue.lock();

        if let Some(pending) = queue.pending.take() {
            if save_target(&pending) == save_target(state) {
                self.writer.metrics().record_coalesced();
            } else {
                tracing::debug!("Writing pending snapshot before switching target");
                self.writer.save(&pending);
            }
        }

        if self.window_elapsed(&queue, now) {
            queue.last_flush = Some(now);
            return Some(self.writer.save(state));
        }

        queue.pending = Some(state.clone());
        None
    }

    /// Write the pending snapshot if the window since the last write has elapsed
    pub fn flush_due(&self, now: Instant) -> Option<SaveOutcome> {
        let mut queue = self.queue.lock();
        if queue.pending.is_none() || !self.window_elapsed(&queue, now) {
            return None;
        }

        let state = queue.pending.take()?;
        queue.last_flush = Some(now);
        Some(self.writer.save(&state))
    }

    /// Write the pending snapshot regardless of the window
    pub fn flush(&self) -> Option<SaveOutcome> {
        let mut queue = self.queue.lock();
        let state = queue.pending.take()?;
        queue.last_flush = Some(Instant::now());
        Some(self.writer.save(&state))
    }

    fn window_elapsed(&self, queue: &QueueState, now: Instant) -> bool {
        queue
            .last_flush
            .map_or(true, |last| now.saturating_duration_since(last) >= self.window)
    }
}

/// Tab and hostname a snapshot would be saved under
fn save_target(state: &LiveState) -> (Option<TabId>, Option<String>) {
    let origin = state
        .current_url
        .as_deref()
        .map(|url| hostname_of(url).unwrap_or_else(|_| url.to_string()));
    (state.current_tab, origin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::StorageIndex;
    use crate::metrics::PersistenceMetrics;
    use crate::repository::{IndexRepository, DEFAULT_STORAGE_KEY};
    use interceptor_storage::{KeyValueStore, MemoryStore};
    use interceptor_tabs::{Request, TabRecord};
    use std::sync::Arc;

    fn live(request_ids: &[&str]) -> LiveState {
        live_on("https://example.com", 1, request_ids)
    }

    fn live_on(url: &str, tab_id: TabId, request_ids: &[&str]) -> LiveState {
        let mut tab = TabRecord::new(url.to_string());
        for id in request_ids {
            tab.requests
                .push(Request::new(*id, "https://x", "GET", "xmlhttprequest").with_tab(tab_id));
        }

        let mut state = LiveState::new();
        state.current_url = Some(url.to_string());
        state.current_tab = Some(tab_id);
        state.tab_record.insert(tab_id, tab);
        state
    }

    fn stored_ids(store: &MemoryStore) -> Vec<String> {
        stored_ids_for(store, "example.com")
    }

    fn stored_ids_for(store: &MemoryStore, hostname: &str) -> Vec<String> {
        let json = store.get(DEFAULT_STORAGE_KEY).unwrap().unwrap();
        StorageIndex::from_json(&json)
            .unwrap()
            .find(hostname)
            .unwrap()
            .requests
            .iter()
            .map(|r| r.request_id.clone())
            .collect()
    }

    fn queue(store: &MemoryStore, metrics: &Arc<PersistenceMetrics>) -> CoalescingWriter {
        let repo = IndexRepository::new(Arc::new(store.clone()), Arc::clone(metrics));
        CoalescingWriter::new(SnapshotWriter::new(repo), Duration::from_millis(100))
    }

    #[test]
    fn test_burst_produces_one_trailing_write() {
        let store = MemoryStore::new();
        let metrics = Arc::new(PersistenceMetrics::new());
        let queue = queue(&store, &metrics);
        let start = Instant::now();

        assert!(queue.notify_at(&live(&["a"]), start).is_some());
        assert!(queue
            .notify_at(&live(&["a", "b"]), start + Duration::from_millis(10))
            .is_none());
        assert!(queue
            .notify_at(&live(&["a", "b", "c"]), start + Duration::from_millis(20))
            .is_none());

        assert_eq!(metrics.snapshot().writes, 1);
        assert_eq!(stored_ids(&store), vec!["a"]);

        // Window not over yet
        assert!(queue.flush_due(start + Duration::from_millis(50)).is_none());

        let outcome = queue.flush_due(start + Duration::from_millis(100));
        assert!(matches!(outcome, Some(SaveOutcome::Written { .. })));
        assert_eq!(stored_ids(&store), vec!["a", "b", "c"]);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.writes, 2);
        assert_eq!(snapshot.coalesced_saves, 1);
        assert!(!queue.has_pending());
    }

    #[test]
    fn test_tab_switch_writes_pending_origin_first() {
        let store = MemoryStore::new();
        let metrics = Arc::new(PersistenceMetrics::new());
        let queue = queue(&store, &metrics);
        let start = Instant::now();

        queue.notify_at(&live_on("https://a.com", 1, &["a1"]), start);
        queue.notify_at(
            &live_on("https://a.com", 1, &["a1", "a2"]),
            start + Duration::from_millis(10),
        );
        queue.notify_at(
            &live_on("https://b.com", 2, &["b1"]),
            start + Duration::from_millis(20),
        );

        assert_eq!(stored_ids_for(&store, "a.com"), vec!["a1", "a2"]);
        assert!(queue.has_pending());

        queue.flush();
        assert_eq!(stored_ids_for(&store, "a.com"), vec!["a1", "a2"]);
        assert_eq!(stored_ids_for(&store, "b.com"), vec!["b1"]);
        assert_eq!(metrics.snapshot().coalesced_saves, 0);
    }

    #[test]
    fn test_same_origin_on_another_path_still_coalesces() {
        let store = MemoryStore::new();
        let metrics = Arc::new(PersistenceMetrics::new());
        let queue = queue(&store, &metrics);
        let start = Instant::now();

        queue.notify_at(&live_on("https://a.com/one", 1, &["a1"]), start);
        queue.notify_at(
            &live_on("https://a.com/two", 1, &["a2"]),
            start + Duration::from_millis(10),
        );
        queue.notify_at(
            &live_on("https://a.com/three", 1, &["a3"]),
            start + Duration::from_millis(20),
        );

        assert_eq!(metrics.snapshot().writes, 1);
        assert_eq!(metrics.snapshot().coalesced_saves, 1);

        queue.flush();
        assert_eq!(stored_ids_for(&store, "a.com"), vec!["a3"]);
    }

    #[test]
    fn test_pending_origin_written_when_window_elapses_on_switch() {
        let store = MemoryStore::new();
        let metrics = Arc::new(PersistenceMetrics::new());
        let queue = queue(&store, &metrics);
        let start = Instant::now();

        queue.notify_at(&live_on("https://a.com", 1, &["a1"]), start);
        queue.notify_at(
            &live_on("https://a.com", 1, &["a1", "a2"]),
            start + Duration::from_millis(10),
        );
        let outcome = queue.notify_at(
            &live_on("https://b.com", 2, &["b1"]),
            start + Duration::from_millis(500),
        );

        assert!(outcome.is_some());
        assert!(!queue.has_pending());
        assert_eq!(stored_ids_for(&store, "a.com"), vec!["a1", "a2"]);
        assert_eq!(stored_ids_for(&store, "b.com"), vec!["b1"]);
    }

    #[test]
    fn test_change_after_quiet_period_is_immediate() {
        let store = MemoryStore::new();
        let metrics = Arc::new(PersistenceMetrics::new());
        let queue = queue(&store, &metrics);
        let start = Instant::now();

        queue.notify_at(&live(&["a"]), start);
        let outcome = queue.notify_at(&live(&["b"]), start + Duration::from_millis(250));

        assert!(outcome.is_some());
        assert_eq!(stored_ids(&store), vec!["b"]);
        assert!(queue.flush_due(start + Duration::from_millis(500)).is_none());
    }

    #[test]
    fn test_flush_writes_pending_immediately() {
        let store = MemoryStore::new();
        let metrics = Arc::new(PersistenceMetrics::new());
        let queue = queue(&store, &metrics);
        let start = Instant::now();

        queue.notify_at(&live(&["a"]), start);
        queue.notify_at(&live(&["z"]), start + Duration::from_millis(1));
        assert!(queue.has_pending());

        assert!(queue.flush().is_some());
        assert_eq!(stored_ids(&store), vec!["z"]);
        assert!(queue.flush().is_none());
    }

    #[test]
    fn test_zero_window_writes_every_change() {
        let store = MemoryStore::new();
        let metrics = Arc::new(PersistenceMetrics::new());
        let repo = IndexRepository::new(Arc::new(store.clone()), Arc::clone(&metrics));
        let queue = CoalescingWriter::new(SnapshotWriter::new(repo), Duration::ZERO);
        let now = Instant::now();

        for ids in [&["a"][..], &["a", "b"][..], &["c"][..]] {
            assert!(queue.notify_at(&live(ids), now).is_some());
        }
        assert_eq!(metrics.snapshot().writes, 3);
    }
}
