mod config;
pub mod database;
pub mod laps;

pub use config::{Config, StorageConfig, TickerConfig, UiConfig};
pub use database::{Database, MemoryStore};
pub use laps::{BackgroundHook, BackgroundWriter, LapStore, DEFAULT_LAPS_KEY};

use std::path::PathBuf;

use crate::error::StorageError;

/// String key-value store holding the stopwatch's durable state.
pub trait KvStore {
    /// Get a value, `None` if the key was never set.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Set a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: KvStore + ?Sized> KvStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

impl<S: KvStore + ?Sized> KvStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

impl<S: KvStore> KvStore for std::sync::Mutex<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
            .get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
            .set(key, value)
    }
}

/// Returns the data directory, creating it if needed.
///
/// `STOPWATCH_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/stopwatch[-dev]/`, where `STOPWATCH_ENV=dev` selects the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("STOPWATCH_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("STOPWATCH_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("stopwatch-dev")
            } else {
                base_dir.join("stopwatch")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| StorageError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
