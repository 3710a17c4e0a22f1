//! Snapshot writer
//!
//! Turns the current tab's live session into a durable per-origin record
//! and merges it into the stored index.

use std::sync::Arc;

use interceptor_tabs::LiveState;

use crate::index::{MergeOutcome, StoredOrigin};
use crate::metrics::PersistenceMetrics;
use crate::origin::hostname_of;
use crate::repository::IndexRepository;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Index was rewritten; `created` is true when the hostname was new
    Written { hostname: String, created: bool },
    Skipped(SkipReason),
    /// An error was absorbed; see logs and metrics
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoCurrentUrl,
    NoCurrentTab,
    /// Nothing to store and nothing stored yet for the hostname
    EmptyNewOrigin,
}

pub struct SnapshotWriter {
    repo: IndexRepository,
}

impl SnapshotWriter {
    pub fn new(repo: IndexRepository) -> Self {
        Self { repo }
    }

    pub fn metrics(&self) -> &Arc<PersistenceMetrics> {
        self.repo.metrics()
    }

    /// Persist the current tab's session. Never fails; errors are logged and counted.
    pub fn save(&self, state: &LiveState) -> SaveOutcome {
        match self.try_save(state) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.repo.metrics().record_failure(&e);
                tracing::warn!(error = %e, "Failed to persist session");
                SaveOutcome::Failed
            }
        }
    }

    pub fn try_save(&self, state: &LiveState) -> Result<SaveOutcome> {
        let mut index = self.repo.load();

        let Some(current_url) = state.current_url.as_deref() else {
            return Ok(self.skip(SkipReason::NoCurrentUrl));
        };
        let hostname = hostname_of(current_url)?;

        let Some(tab) = state.current_tab_record() else {
            return Ok(self.skip(SkipReason::NoCurrentTab));
        };

        let snapshot = StoredOrigin::from_tab(hostname.clone(), tab);
        let request_count = snapshot.requests.len();

        let created = match index.merge(snapshot) {
            MergeOutcome::Skipped => return Ok(self.skip(SkipReason::EmptyNewOrigin)),
            MergeOutcome::Updated => false,
            MergeOutcome::Created => true,
        };

        self.repo.save(&index)?;
        self.repo.metrics().record_write();

        if created {
            tracing::info!(hostname = %hostname, request_count, "Stored new origin");
        } else {
            tracing::debug!(hostname = %hostname, request_count, "Updated stored origin");
        }

        Ok(SaveOutcome::Written { hostname, created })
    }

    fn skip(&self, reason: SkipReason) -> SaveOutcome {
        self.repo.metrics().record_skip();
        tracing::trace!(?reason, "Skipped session save");
        SaveOutcome::Skipped(reason)
    }
}

impl Clone for SnapshotWriter {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
        }
    }
}
