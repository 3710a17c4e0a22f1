//! Intercepted request rules and their captured responses

use serde::{Deserialize, Serialize};

use crate::TabId;

/// One intercepted network request rule, as held in live state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Unique within a tab session
    pub request_id: String,
    pub url: String,
    pub method: String,
    /// Resource type reported by the interception API (`xmlhttprequest`, `script`, ...)
    #[serde(rename = "type")]
    pub request_type: String,
    /// May be stale; the checked set on the tab is authoritative
    #[serde(default)]
    pub enabled: bool,
    /// Owning tab, only meaningful while the session is live
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<TabId>,
}

impl Request {
    pub fn new(
        request_id: impl Into<String>,
        url: impl Into<String>,
        method: impl Into<String>,
        request_type: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            url: url.into(),
            method: method.into(),
            request_type: request_type.into(),
            enabled: false,
            tab_id: None,
        }
    }

    /// Attach the request to a live tab
    pub fn with_tab(mut self, tab_id: TabId) -> Self {
        self.tab_id = Some(tab_id);
        self
    }
}

/// Captured or edited response data for one request.
///
/// Every field is a string; an empty string means the value is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestRecord {
    pub content_type: String,
    pub status_code: String,
    pub response_text: String,
    pub response_error: String,
    pub server_response: String,
    pub server_error: String,
}

impl RequestRecord {
    /// True when the user has supplied a replacement response body
    pub fn has_response_text(&self) -> bool {
        !self.response_text.is_empty()
    }
}
