use async_trait::async_trait;

/// Failure reported by a storage backend
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error on key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Key cannot be stored: {0}")]
    InvalidKey(String),
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
}

/// String-keyed persistent storage holding whole string values.
///
/// Writes overwrite the previous value; there are no partial updates
/// and no transactions. The last writer wins.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}
