//! Interceptor configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the database file backing durable storage
    pub database_path: PathBuf,
    /// Key the stored index lives under
    pub storage_key: String,
    /// Minimum gap between two durable writes; 0 writes on every change
    pub coalesce_window_ms: u64,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("interceptor.db"),
            storage_key: interceptor_session::DEFAULT_STORAGE_KEY.to_string(),
            coalesce_window_ms: 250,
        }
    }

    /// Parse a settings blob. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage_key.trim().is_empty() {
            return Err(CoreError::Config("storage key cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn coalesce_window(&self) -> Duration {
        Duration::from_millis(self.coalesce_window_ms)
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("interceptor"))
            .unwrap_or_else(|| PathBuf::from(".interceptor"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

// Platform data directory lookup
mod dirs {
    use std::path::PathBuf;

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new(PathBuf::from("/tmp/data"));
        assert_eq!(config.database_path, PathBuf::from("/tmp/data/interceptor.db"));
        assert_eq!(config.storage_key, "interceptorState");
        assert_eq!(config.coalesce_window(), Duration::from_millis(250));
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let config = Config::from_json(r#"{"coalesce_window_ms": 0}"#).unwrap();
        assert_eq!(config.coalesce_window_ms, 0);
        assert_eq!(config.storage_key, "interceptorState");
    }

    #[test]
    fn test_empty_storage_key_rejected() {
        let result = Config::from_json(r#"{"storage_key": "  "}"#);
        assert!(matches!(result, Err(CoreError::Config(_))));
    }
}
