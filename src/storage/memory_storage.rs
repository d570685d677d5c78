use crate::{
    error::{BoardwalkError, Result},
    storage::{Storage, WriteOp},
};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
};

/// In-process key-value store.
///
/// Mirrors a browser-local store: it can be switched off entirely
/// (`set_available(false)`, every read and write fails) or made to reject
/// writes only (`set_read_only(true)`, as when the quota is exhausted).
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    unavailable: AtomicBool,
    read_only: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Raw value under `key`, bypassing the availability switches
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    /// Stores a raw value, bypassing the availability switches
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries().insert(key.to_string(), value.to_string());
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_readable(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(BoardwalkError::StorageUnavailable(
                "local storage is disabled".to_string(),
            ));
        }
        Ok(())
    }

    fn check_writable(&self) -> Result<()> {
        self.check_readable()?;
        if self.read_only.load(Ordering::SeqCst) {
            return Err(BoardwalkError::StorageUnavailable(
                "local storage quota exceeded".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_readable()?;
        Ok(self.entries().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_writable()?;
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check_writable()?;
        self.entries().remove(key);
        Ok(())
    }

    async fn write_batch(&self, ops: &[WriteOp]) -> Result<()> {
        self.check_writable()?;
        let mut entries = self.entries();
        for op in ops {
            match op {
                WriteOp::Set { key, value } => {
                    entries.insert(key.clone(), value.clone());
                }
                WriteOp::Remove { key } => {
                    entries.remove(key);
                }
            }
        }
        Ok(())
    }

    fn atomic_batches(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k").await.unwrap(), None);

        storage.set("k", "v").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), Some("v".to_string()));

        storage.remove("k").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), None);

        // Removing twice is fine
        storage.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_disabled_storage_fails_reads_and_writes() {
        let storage = MemoryStorage::new();
        storage.insert_raw("k", "v");
        storage.set_available(false);

        assert!(storage.get("k").await.is_err());
        assert!(storage.set("k", "w").await.is_err());
        assert_eq!(storage.raw("k"), Some("v".to_string()));

        storage.set_available(true);
        assert_eq!(storage.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_read_only_storage_still_reads() {
        let storage = MemoryStorage::new();
        storage.insert_raw("k", "v");
        storage.set_read_only(true);

        assert_eq!(storage.get("k").await.unwrap(), Some("v".to_string()));
        let err = storage.set("k", "w").await.unwrap_err();
        assert!(err.is_storage_failure());
    }

    #[tokio::test]
    async fn test_batch_applies_everything() {
        let storage = MemoryStorage::new();
        storage.insert_raw("old", "1");

        storage
            .write_batch(&[
                WriteOp::Set {
                    key: "a".to_string(),
                    value: "1".to_string(),
                },
                WriteOp::Remove {
                    key: "old".to_string(),
                },
            ])
            .await
            .unwrap();

        assert_eq!(storage.keys(), vec!["a".to_string()]);
        assert!(storage.atomic_batches());
    }
}
