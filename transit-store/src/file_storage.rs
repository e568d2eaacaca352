//! Directory-backed storage, one JSON file per key.
//!
//! Writes go to `<key>.json.tmp` and are renamed over `<key>.json`, so a
//! crash mid-write leaves the previous value intact.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;
use transit_core::{KeyValueStorage, StorageError};

#[derive(Debug, Clone)]
pub struct FileStorage {
    directory: PathBuf,
}

impl FileStorage {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let acceptable = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !acceptable {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.directory.join(format!("{}.json", key)))
    }
}

fn io_error(key: &str, source: std::io::Error) -> StorageError {
    StorageError::Io { key: key.to_string(), source }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| io_error(key, e))?;

        let mut tmp_path = path.clone();
        tmp_path.set_extension("json.tmp");
        fs::write(&tmp_path, value).await.map_err(|e| io_error(key, e))?;
        fs::rename(&tmp_path, &path).await.map_err(|e| io_error(key, e))?;

        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_round_trip() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::new(tmp.path());

        storage.set_item("busTickets", r#"[{"id":"1"}]"#).await.unwrap();
        assert!(tmp.path().join("busTickets.json").exists());
        assert!(!tmp.path().join("busTickets.json.tmp").exists());

        let value = storage.get_item("busTickets").await.unwrap();
        assert_eq!(value.as_deref(), Some(r#"[{"id":"1"}]"#));
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::new(tmp.path().join("not").join("yet"));

        assert_eq!(storage.get_item("busPasses").await.unwrap(), None);
        storage.remove_item("busPasses").await.unwrap();
    }

    #[tokio::test]
    async fn test_creates_directory_on_write() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested").join("wallet");
        let storage = FileStorage::new(&dir);

        storage.set_item("busPasses", "[]").await.unwrap();
        assert!(dir.join("busPasses.json").exists());
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::new(tmp.path());

        let result = storage.set_item("../escape", "[]").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }
}
