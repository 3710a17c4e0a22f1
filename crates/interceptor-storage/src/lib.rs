//! Request Interceptor Storage Layer
//!
//! Durable string key-value storage behind the [`KeyValueStore`] trait.
//! The session layer keeps its whole index under a single reserved key,
//! so backends only need whole-value `get`/`set`.

mod database;
mod error;
mod memory;
mod migrations;

pub use database::Database;
pub use error::StorageError;
pub use memory::MemoryStore;

pub type Result<T> = std::result::Result<T, StorageError>;

/// A string-keyed, string-valued durable store.
///
/// Implementations must make `set` replace the previous value as one unit.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}
