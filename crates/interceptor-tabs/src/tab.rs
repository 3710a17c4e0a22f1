//! Per-tab session records and the live state that owns them

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::action::Action;
use crate::error::TabError;
use crate::request::{Request, RequestRecord};
use crate::{Result, TabId};

/// Everything the popup knows about one browser tab.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabRecord {
    /// URL the tab was showing when its defaults were loaded
    pub url: String,
    /// Intercepted requests, in the order they were added
    pub requests: Vec<Request>,
    /// Request ids the user has explicitly enabled
    pub checked_reqs: HashMap<String, bool>,
    /// Captured/edited responses keyed by request id
    pub request_records: IndexMap<String, RequestRecord>,
}

impl TabRecord {
    pub fn new(url: String) -> Self {
        Self {
            url,
            ..Self::default()
        }
    }

    /// Whether `request_id` is in the checked set
    pub fn is_checked(&self, request_id: &str) -> bool {
        self.checked_reqs.get(request_id).copied() == Some(true)
    }

    pub fn find_request(&self, request_id: &str) -> Option<&Request> {
        self.requests.iter().find(|r| r.request_id == request_id)
    }

    fn upsert_request(&mut self, request: Request) {
        match self
            .requests
            .iter_mut()
            .find(|r| r.request_id == request.request_id)
        {
            Some(existing) => *existing = request,
            None => self.requests.push(request),
        }
    }

    fn clear(&mut self) {
        self.requests.clear();
        self.checked_reqs.clear();
        self.request_records.clear();
    }
}

/// Snapshot of the whole live session, across all tabs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveState {
    pub current_url: Option<String>,
    pub current_tab: Option<TabId>,
    pub tab_record: HashMap<TabId, TabRecord>,
}

impl LiveState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session entry for the current tab, if there is one
    pub fn current_tab_record(&self) -> Option<&TabRecord> {
        self.current_tab.and_then(|id| self.tab_record.get(&id))
    }

    pub fn tab(&self, tab_id: TabId) -> Result<&TabRecord> {
        self.tab_record
            .get(&tab_id)
            .ok_or(TabError::NotFound(tab_id))
    }

    fn tab_mut(&mut self, tab_id: TabId) -> Result<&mut TabRecord> {
        self.tab_record
            .get_mut(&tab_id)
            .ok_or(TabError::NotFound(tab_id))
    }

    /// Apply one mutation.
    ///
    /// Every action except `InitialiseDefaults` requires the tab's session
    /// entry to exist already.
    pub fn apply(&mut self, action: Action) -> Result<()> {
        match action {
            Action::InitialiseDefaults { tab_id, url } => {
                self.current_tab = Some(tab_id);
                self.current_url = Some(url.clone());
                self.tab_record
                    .entry(tab_id)
                    .or_insert_with(|| TabRecord::new(url));
            }
            Action::UpdateRequest { tab_id, request } => {
                self.tab_mut(tab_id)?.upsert_request(request);
            }
            Action::ClearFields { tab_id } => {
                self.tab_mut(tab_id)?.clear();
            }
            Action::HandleCheckToggle {
                tab_id,
                request_id,
                checked,
            } => {
                self.tab_mut(tab_id)?.checked_reqs.insert(request_id, checked);
            }
            Action::HandleRespTextChange {
                response_text,
                request_id,
                tab_id,
            } => {
                self.tab_mut(tab_id)?
                    .request_records
                    .entry(request_id)
                    .or_default()
                    .response_text = response_text;
            }
        }

        Ok(())
    }
}
