//! Loading and storing the index through an injected backend

use std::sync::Arc;

use interceptor_storage::KeyValueStore;

use crate::index::StorageIndex;
use crate::metrics::PersistenceMetrics;
use crate::Result;

/// Key the extension has always kept its index under
pub const DEFAULT_STORAGE_KEY: &str = "interceptorState";

pub struct IndexRepository {
    store: Arc<dyn KeyValueStore>,
    key: String,
    metrics: Arc<PersistenceMetrics>,
}

impl IndexRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, metrics: Arc<PersistenceMetrics>) -> Self {
        Self::with_key(store, DEFAULT_STORAGE_KEY, metrics)
    }

    pub fn with_key(
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        metrics: Arc<PersistenceMetrics>,
    ) -> Self {
        Self {
            store,
            key: key.into(),
            metrics,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn metrics(&self) -> &Arc<PersistenceMetrics> {
        &self.metrics
    }

    /// Read and parse the stored index; `None` when nothing was ever written
    pub fn try_load(&self) -> Result<Option<StorageIndex>> {
        match self.store.get(&self.key)? {
            Some(json) => Ok(Some(StorageIndex::from_json(&json)?)),
            None => Ok(None),
        }
    }

    /// Load the index, treating missing, unreadable and corrupt data as empty
    pub fn load(&self) -> StorageIndex {
        match self.store.get(&self.key) {
            Ok(Some(json)) => match StorageIndex::from_json(&json) {
                Ok(index) => index,
                Err(e) => {
                    self.metrics.record_corrupt_read();
                    tracing::warn!(
                        key = %self.key,
                        error = %e,
                        "Stored index is corrupt, starting empty"
                    );
                    StorageIndex::default()
                }
            },
            Ok(None) => StorageIndex::default(),
            Err(e) => {
                self.metrics.record_read_failure();
                tracing::warn!(
                    key = %self.key,
                    error = %e,
                    "Failed to read stored index, starting empty"
                );
                StorageIndex::default()
            }
        }
    }

    /// Serialize and write the whole index as one value
    pub fn save(&self, index: &StorageIndex) -> Result<()> {
        let json = index.to_json()?;
        self.store.set(&self.key, &json)?;
        Ok(())
    }
}

impl Clone for IndexRepository {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key.clone(),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interceptor_storage::MemoryStore;

    fn repository(store: &MemoryStore) -> IndexRepository {
        IndexRepository::new(Arc::new(store.clone()), Arc::new(PersistenceMetrics::new()))
    }

    #[test]
    fn test_missing_key_is_empty() {
        let store = MemoryStore::new();
        let repo = repository(&store);

        assert!(repo.try_load().unwrap().is_none());
        assert!(repo.load().is_empty());
        assert_eq!(repo.metrics().snapshot().corrupt_reads, 0);
    }

    #[test]
    fn test_corrupt_blob_is_empty() {
        let store = MemoryStore::new();
        store.set(DEFAULT_STORAGE_KEY, "{not json").unwrap();
        let repo = repository(&store);

        assert!(repo.try_load().is_err());
        assert!(repo.load().is_empty());
        assert_eq!(repo.metrics().snapshot().corrupt_reads, 1);
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        let repo = repository(&store);

        let mut index = StorageIndex::new();
        index.stored_origins.push(crate::index::StoredOrigin {
            hostname: "example.com".to_string(),
            ..Default::default()
        });
        repo.save(&index).unwrap();

        assert_eq!(repo.load(), index);
        assert!(store.get(DEFAULT_STORAGE_KEY).unwrap().is_some());
    }

    #[test]
    fn test_custom_key() {
        let store = MemoryStore::new();
        let repo = IndexRepository::with_key(
            Arc::new(store.clone()),
            "otherKey",
            Arc::new(PersistenceMetrics::new()),
        );
        repo.save(&StorageIndex::new()).unwrap();

        assert!(store.get("otherKey").unwrap().is_some());
        assert!(store.get(DEFAULT_STORAGE_KEY).unwrap().is_none());
    }
}
