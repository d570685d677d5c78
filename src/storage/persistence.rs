//! Typed access to the three persisted collections.
//!
//! Layout:
//! - `<prefix>:boards` holds `Vec<Board>`
//! - `<prefix>:lists` holds `HashMap<BoardId, Vec<List>>`
//! - `<prefix>:cards` holds `HashMap<ListId, Vec<Card>>`
//!
//! Values are JSON; timestamps are RFC 3339 strings.

use crate::{
    domain::{Board, BoardId, Card, List, ListId},
    error::Result,
    storage::{Storage, WriteOp},
};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;

pub type ListsByBoard = HashMap<BoardId, Vec<List>>;
pub type CardsByList = HashMap<ListId, Vec<Card>>;

/// Serializes `value` into a set operation for `key`
pub fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<WriteOp> {
    Ok(WriteOp::Set {
        key: key.to_string(),
        value: serde_json::to_string(value)?,
    })
}

/// Storage keys of the three collections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionKeys {
    pub boards: String,
    pub lists: String,
    pub cards: String,
}

impl CollectionKeys {
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            boards: format!("{}:boards", prefix),
            lists: format!("{}:lists", prefix),
            cards: format!("{}:cards", prefix),
        }
    }
}

impl Default for CollectionKeys {
    fn default() -> Self {
        Self::with_prefix("boardwalk")
    }
}

/// Serializing adapter over a [`Storage`] backend
pub struct Persistence<S> {
    storage: S,
    keys: CollectionKeys,
}

impl<S: Storage> Persistence<S> {
    pub fn new(storage: S, keys: CollectionKeys) -> Self {
        Self { storage, keys }
    }

    pub fn keys(&self) -> &CollectionKeys {
        &self.keys
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Reads `key`, falling back to `default` on absence or any failure
    pub async fn load<T: DeserializeOwned + Send>(&self, key: &str, default: T) -> T {
        match self.try_load::<Option<T>>(key).await {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                log::warn!(
                    "[boardwalk.persistence.load] Reading {} failed, using default: {}",
                    key,
                    e
                );
                default
            }
        }
    }

    /// Reads `key`, yielding `T::default()` when absent and an error on failure
    pub async fn try_load<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        match self.storage.get(key).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(T::default()),
        }
    }

    pub async fn save<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.storage.set(key, &raw).await
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        self.storage.remove(key).await
    }

    /// Writes several encoded values through the backend's batch path
    pub async fn commit(&self, ops: &[WriteOp]) -> Result<()> {
        if !self.storage.atomic_batches() && ops.len() > 1 {
            log::debug!(
                "[boardwalk.persistence.commit] Backend applies {} writes one at a time",
                ops.len()
            );
        }
        self.storage.write_batch(ops).await
    }

    pub async fn load_boards(&self) -> Vec<Board> {
        self.load(&self.keys.boards, Vec::new()).await
    }

    pub async fn try_load_boards(&self) -> Result<Vec<Board>> {
        self.try_load(&self.keys.boards).await
    }

    pub async fn try_load_lists(&self) -> Result<ListsByBoard> {
        self.try_load(&self.keys.lists).await
    }

    pub async fn try_load_cards(&self) -> Result<CardsByList> {
        self.try_load(&self.keys.cards).await
    }

    pub async fn save_boards(&self, boards: &[Board]) -> Result<()> {
        self.save(&self.keys.boards, &boards).await
    }

    pub async fn save_lists(&self, lists: &ListsByBoard) -> Result<()> {
        self.save(&self.keys.lists, lists).await
    }

    pub async fn save_cards(&self, cards: &CardsByList) -> Result<()> {
        self.save(&self.keys.cards, cards).await
    }
}
