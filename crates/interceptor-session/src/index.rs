//! Durable per-origin records and the index that holds them

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use interceptor_tabs::{Request, RequestRecord, TabId, TabRecord};

use crate::Result;

/// A request rule in durable form. Carries no tab id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRequest {
    pub request_id: String,
    pub url: String,
    pub method: String,
    #[serde(rename = "type")]
    pub request_type: String,
    /// Whether the request was in the tab's checked set when saved
    #[serde(default)]
    pub enabled: bool,
}

impl StoredRequest {
    /// Durable copy of a live request. `enabled` comes from the checked set,
    /// never from the live request's own flag.
    pub fn from_live(request: &Request, checked: bool) -> Self {
        Self {
            request_id: request.request_id.clone(),
            url: request.url.clone(),
            method: request.method.clone(),
            request_type: request.request_type.clone(),
            enabled: checked,
        }
    }

    /// Re-attach the request to a live tab
    pub fn to_live(&self, tab_id: TabId) -> Request {
        Request {
            request_id: self.request_id.clone(),
            url: self.url.clone(),
            method: self.method.clone(),
            request_type: self.request_type.clone(),
            enabled: self.enabled,
            tab_id: Some(tab_id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredOrigin {
    pub hostname: String,
    #[serde(default)]
    pub requests: Vec<StoredRequest>,
    #[serde(default)]
    pub request_records: IndexMap<String, RequestRecord>,
}

impl StoredOrigin {
    /// Snapshot one tab's session under `hostname`
    pub fn from_tab(hostname: String, tab: &TabRecord) -> Self {
        let requests = tab
            .requests
            .iter()
            .map(|request| {
                StoredRequest::from_live(request, tab.is_checked(&request.request_id))
            })
            .collect();

        Self {
            hostname,
            requests,
            request_records: tab.request_records.clone(),
        }
    }

    pub fn enabled_count(&self) -> usize {
        self.requests.iter().filter(|r| r.enabled).count()
    }
}

/// What [`StorageIndex::merge`] did with a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Snapshot was empty and its hostname is not stored; index untouched
    Skipped,
    /// Existing entry for the hostname was overwritten in place
    Updated,
    /// New entry appended
    Created,
}

/// The whole durable state, read and written as one value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageIndex {
    #[serde(rename = "storedRequests", alias = "storedOrigins", default)]
    pub stored_origins: Vec<StoredOrigin>,
}

impl StorageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a serialized index, keeping the first entry for any repeated hostname
    pub fn from_json(json: &str) -> Result<Self> {
        let mut index: StorageIndex = serde_json::from_str(json)?;
        let dropped = index.dedupe();
        if dropped > 0 {
            tracing::warn!(dropped, "Dropped duplicate origins from stored index");
        }
        Ok(index)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn find(&self, hostname: &str) -> Option<&StoredOrigin> {
        self.stored_origins.iter().find(|o| o.hostname == hostname)
    }

    pub fn position(&self, hostname: &str) -> Option<usize> {
        self.stored_origins
            .iter()
            .position(|o| o.hostname == hostname)
    }

    pub fn len(&self) -> usize {
        self.stored_origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stored_origins.is_empty()
    }

    /// Merge a snapshot into the index.
    ///
    /// An existing entry has its requests and records replaced wholesale.
    /// An empty snapshot never creates a new entry, and no entry is ever removed.
    pub fn merge(&mut self, snapshot: StoredOrigin) -> MergeOutcome {
        match self.position(&snapshot.hostname) {
            Some(index) => {
                let existing = &mut self.stored_origins[index];
                existing.requests = snapshot.requests;
                existing.request_records = snapshot.request_records;
                MergeOutcome::Updated
            }
            None if snapshot.requests.is_empty() => MergeOutcome::Skipped,
            None => {
                self.stored_origins.push(snapshot);
                MergeOutcome::Created
            }
        }
    }

    fn dedupe(&mut self) -> usize {
        let before = self.stored_origins.len();
        let mut seen = HashSet::new();
        self.stored_origins
            .retain(|origin| seen.insert(origin.hostname.clone()));
        before - self.stored_origins.len()
    }
}
