//! Host browser tab query

use crate::TabId;

/// The active tab as reported by the host; either field may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveTab {
    pub id: Option<TabId>,
    pub url: Option<String>,
}

impl ActiveTab {
    pub fn new(id: TabId, url: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            url: Some(url.into()),
        }
    }
}

pub trait ActiveTabQuery {
    /// Active tab of the current window, `None` when there is none
    fn active_tab(&self) -> Option<ActiveTab>;
}

/// Query answered with a fixed tab, for embedders that already know it
#[derive(Debug, Clone, Default)]
pub struct FixedActiveTab(pub Option<ActiveTab>);

impl ActiveTabQuery for FixedActiveTab {
    fn active_tab(&self) -> Option<ActiveTab> {
        self.0.clone()
    }
}
