//! Request Interceptor Session Persistence
//!
//! - Live session state is snapshotted per origin (hostname) on every change
//! - Snapshots merge into a single durable index without touching other origins
//! - Revisiting an origin replays its stored requests into the new tab
//! - Persistence is best-effort: failures are logged and counted, never raised

mod coalesce;
mod error;
mod index;
mod metrics;
mod origin;
mod repository;
mod restorer;
mod writer;

pub use coalesce::CoalescingWriter;
pub use error::SessionError;
pub use index::{MergeOutcome, StorageIndex, StoredOrigin, StoredRequest};
pub use metrics::{MetricsSnapshot, PersistenceMetrics};
pub use origin::hostname_of;
pub use repository::{IndexRepository, DEFAULT_STORAGE_KEY};
pub use restorer::SessionRestorer;
pub use writer::{SaveOutcome, SkipReason, SnapshotWriter};

pub type Result<T> = std::result::Result<T, SessionError>;
