use crate::{error::Result, storage::Storage};
use async_trait::async_trait;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::fs;

/// File-based storage: one JSON document per collection key
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const DATA_DIR: &'static str = ".boardwalk";

    /// Creates a new FileStorage rooted at `<project_root>/.boardwalk`
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::DATA_DIR),
        }
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Creates the data directory
    pub async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await
    }

    pub async fn is_initialized(&self) -> bool {
        fs::metadata(&self.root_path)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    /// Maps a key onto a file name.
    ///
    /// `[A-Za-z0-9_-]` pass through, `:` becomes `.`, and every other byte
    /// is written as `%XX`, so distinct keys never share a file.
    fn key_file(&self, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len());
        for byte in key.bytes() {
            match byte {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' => name.push(byte as char),
                b':' => name.push('.'),
                _ => name.push_str(&format!("%{:02X}", byte)),
            }
        }
        self.root_path.join(format!("{}.json", name))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if fs::metadata(path).await.is_err() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.key_file(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        // Write aside and rename so readers never see a half-written file
        let file_path = self.key_file(key);
        let tmp_path = file_path.with_extension("json.tmp");
        fs::write(&tmp_path, value).await?;
        if let Err(e) = fs::rename(&tmp_path, &file_path).await {
            log::warn!(
                "[boardwalk.storage.file] Rename of {} failed: {}",
                tmp_path.display(),
                e
            );
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.key_file(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_storage_initialization() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        assert!(!storage.is_initialized().await);
        storage.initialize().await.unwrap();
        assert!(storage.is_initialized().await);
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        storage.set("boardwalk:boards", "[]").await.unwrap();

        assert_eq!(
            storage.get("boardwalk:boards").await.unwrap(),
            Some("[]".to_string())
        );
        assert!(storage.root_path().join("boardwalk.boards.json").exists());
        assert!(!storage.root_path().join("boardwalk.boards.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_similar_keys_use_separate_files() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        let keys = ["a:b", "a_b", "a.b", "a%3Ab"];
        for (n, key) in keys.iter().enumerate() {
            storage.set(key, &n.to_string()).await.unwrap();
        }

        for (n, key) in keys.iter().enumerate() {
            assert_eq!(storage.get(key).await.unwrap(), Some(n.to_string()));
        }
    }

    #[tokio::test]
    async fn test_missing_key_reads_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        assert_eq!(storage.get("nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_overwrite_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        storage.set("k", "1").await.unwrap();
        storage.set("k", "2").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), Some("2".to_string()));

        storage.remove("k").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), None);
        storage.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_batches_are_not_atomic() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        assert!(!storage.atomic_batches());
    }
}
