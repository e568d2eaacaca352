pub mod clock;
pub mod identifier;
pub mod record;
pub mod storage;
pub mod validity;

pub use clock::{Clock, ManualClock, SystemClock};
pub use identifier::RecordStamp;
pub use record::Record;
pub use storage::{KeyValueStorage, StorageError};
pub use validity::ValidityWindow;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
