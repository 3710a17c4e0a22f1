//! Request Interceptor Core
//!
//! Wires the persistence layer into the popup lifecycle: query the active
//! tab, restore its origin's stored session, then persist every live change.

mod config;
mod error;
mod flusher;
mod host;
mod interceptor;

pub use config::Config;
pub use error::CoreError;
pub use flusher::spawn_flush_loop;
pub use host::{ActiveTab, ActiveTabQuery, FixedActiveTab};
pub use interceptor::Interceptor;

// Re-export the layers the interceptor is built from
pub use interceptor_session::{
    hostname_of, CoalescingWriter, IndexRepository, MetricsSnapshot, PersistenceMetrics,
    SaveOutcome, SessionError, SessionRestorer, SkipReason, SnapshotWriter, StorageIndex,
    StoredOrigin, StoredRequest,
};
pub use interceptor_storage::{Database, KeyValueStore, MemoryStore, StorageError};
pub use interceptor_tabs::{
    Action, LiveState, LiveStore, Request, RequestRecord, RestoreState, TabId, TabRecord,
    TabStore,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
