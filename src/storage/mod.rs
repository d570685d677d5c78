use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[cfg(feature = "file-storage")]
pub mod file_storage;
pub mod memory_storage;
pub mod persistence;

#[cfg(feature = "sqlite-storage")]
pub mod sqlite_storage;

#[cfg(feature = "file-storage")]
pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;
pub use persistence::{CollectionKeys, Persistence};

#[cfg(feature = "sqlite-storage")]
pub use sqlite_storage::SqliteStorage;

/// One write inside a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Set { key: String, value: String },
    Remove { key: String },
}

impl WriteOp {
    pub fn key(&self) -> &str {
        match self {
            Self::Set { key, .. } | Self::Remove { key } => key,
        }
    }
}

/// Durable key-value store holding serialized collections.
///
/// Implementations hold no business logic. Every method is an await point.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Reads the value stored under `key`, `None` when absent
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`; removing an absent key succeeds
    async fn remove(&self, key: &str) -> Result<()>;

    /// Applies several writes in order.
    ///
    /// The default applies them one at a time, so a failure part-way leaves
    /// the earlier writes in place. Backends that can do better override
    /// this and return true from `atomic_batches`.
    async fn write_batch(&self, ops: &[WriteOp]) -> Result<()> {
        for op in ops {
            match op {
                WriteOp::Set { key, value } => self.set(key, value).await?,
                WriteOp::Remove { key } => self.remove(key).await?,
            }
        }
        Ok(())
    }

    /// Whether `write_batch` is all-or-nothing
    fn atomic_batches(&self) -> bool {
        false
    }
}

/// Lets a caller keep a handle on a backend it lends to the store
#[async_trait]
impl<S: Storage + ?Sized> Storage for Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key).await
    }

    async fn write_batch(&self, ops: &[WriteOp]) -> Result<()> {
        (**self).write_batch(ops).await
    }

    fn atomic_batches(&self) -> bool {
        (**self).atomic_batches()
    }
}
