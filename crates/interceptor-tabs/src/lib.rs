//! Request Interceptor Live Session State
//!
//! The in-memory, per-browser-tab model of intercepted requests and their
//! captured responses. State only changes through [`Action`]s dispatched to a
//! [`LiveStore`], and every change is announced to subscribers.

mod action;
mod error;
mod request;
mod state;
mod store;
mod tab;

pub use action::Action;
pub use error::TabError;
pub use request::{Request, RequestRecord};
pub use state::RestoreState;
pub use store::{Listener, LiveStore, SubscriptionId, TabStore};
pub use tab::{LiveState, TabRecord};

/// Identifier the host browser assigns to a tab.
pub type TabId = i64;

pub type Result<T> = std::result::Result<T, TabError>;
