//! State mutations accepted by the live store

use crate::request::Request;
use crate::TabId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Make `tab_id` the current tab and ensure it has a session entry
    InitialiseDefaults { tab_id: TabId, url: String },
    /// Insert a request, or replace the one with the same `request_id`
    UpdateRequest { tab_id: TabId, request: Request },
    /// Drop every request, checked flag and record for the tab
    ClearFields { tab_id: TabId },
    HandleCheckToggle {
        tab_id: TabId,
        request_id: String,
        checked: bool,
    },
    HandleRespTextChange {
        response_text: String,
        request_id: String,
        tab_id: TabId,
    },
}

impl Action {
    pub fn tab_id(&self) -> TabId {
        match self {
            Action::InitialiseDefaults { tab_id, .. }
            | Action::UpdateRequest { tab_id, .. }
            | Action::ClearFields { tab_id }
            | Action::HandleCheckToggle { tab_id, .. }
            | Action::HandleRespTextChange { tab_id, .. } => *tab_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Action::InitialiseDefaults { .. } => "initialise_defaults",
            Action::UpdateRequest { .. } => "update_request",
            Action::ClearFields { .. } => "clear_fields",
            Action::HandleCheckToggle { .. } => "handle_check_toggle",
            Action::HandleRespTextChange { .. } => "handle_resp_text_change",
        }
    }
}
