use crate::{
    error::{BoardwalkError, Result},
    storage::{Storage, WriteOp},
};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::{
    path::Path,
    sync::{Mutex, MutexGuard, PoisonError},
};

/// SQLite-backed key-value storage
pub struct SqliteStorage {
    connection: Mutex<Connection>,
}

impl SqliteStorage {
    const SCHEMA: &'static str =
        "CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY NOT NULL, value TEXT NOT NULL);";

    /// Opens (or creates) the database at `database_path`
    pub fn new(database_path: impl AsRef<Path>) -> Result<Self> {
        let connection = Connection::open(database_path).map_err(storage_error)?;
        Self::with_connection(connection)
    }

    pub fn in_memory() -> Result<Self> {
        let connection = Connection::open_in_memory().map_err(storage_error)?;
        Self::with_connection(connection)
    }

    fn with_connection(connection: Connection) -> Result<Self> {
        connection
            .execute_batch(Self::SCHEMA)
            .map_err(storage_error)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn connection(&self) -> MutexGuard<'_, Connection> {
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn storage_error(e: rusqlite::Error) -> BoardwalkError {
    BoardwalkError::StorageUnavailable(e.to_string())
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.connection()
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(storage_error)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.connection()
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(storage_error)?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.connection()
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(storage_error)?;
        Ok(())
    }

    async fn write_batch(&self, ops: &[WriteOp]) -> Result<()> {
        let mut connection = self.connection();
        let tx = connection.transaction().map_err(storage_error)?;
        for op in ops {
            let applied = match op {
                WriteOp::Set { key, value } => tx.execute(
                    "INSERT INTO kv (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                    params![key, value],
                ),
                WriteOp::Remove { key } => {
                    tx.execute("DELETE FROM kv WHERE key = ?1", params![key])
                }
            };
            applied.map_err(storage_error)?;
        }
        tx.commit().map_err(storage_error)
    }

    fn atomic_batches(&self) -> bool {
        true
    }
}
