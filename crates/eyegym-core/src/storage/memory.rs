use std::collections::HashMap;
use std::sync::RwLock;

use super::KvStore;
use crate::error::StoreError;

/// In-process key-value store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let guard = self
            .data
            .read()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".into()))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".into()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".into()))?;
        guard.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.get("k").unwrap().is_none());
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
    }

    #[test]
    fn remove_missing_key_is_ok() {
        let store = MemoryStore::new();
        assert!(store.remove("nothing").is_ok());
    }
}
