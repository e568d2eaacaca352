pub mod app_config;
pub mod file_storage;
pub mod memory_storage;
pub mod record_store;

pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;
pub use record_store::{revalidate_at, RecordStore, Revalidated};
pub use transit_core::{CoreError as StoreError, CoreResult as StoreResult};
