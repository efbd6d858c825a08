mod config;
pub mod database;
mod memory;

pub use config::{Config, HistoryConfig, NarrationConfig, SessionConfig};
pub use database::{Database, LazyDatabase};
pub use memory::MemoryStore;

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::StoreError;

/// Opaque string-keyed store the history and reminder stores persist into.
///
/// Implementations must be safe for concurrent reads.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: KvStore + ?Sized> KvStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Returns the data directory, creating it if needed.
///
/// `EYEGYM_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/eyegym`, or `~/.config/eyegym-dev` when `EYEGYM_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("EYEGYM_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("EYEGYM_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("eyegym-dev")
            } else {
                base_dir.join("eyegym")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
