use std::sync::Arc;
use tracing::{error, info, warn};
use transit_core::{Clock, CoreResult, KeyValueStorage, Record, ValidityWindow};

/// Result of a revalidation pass
#[derive(Debug, Clone, PartialEq)]
pub struct Revalidated<R> {
    pub records: Vec<R>,
    /// How many VALID records were flipped to INVALID
    pub expired: usize,
}

/// Shared read/revalidate/write access to the persisted ticket and pass
/// collections. Each collection is a JSON array stored under one key,
/// newest record first.
///
/// Reads fail soft: a missing key, a storage error or an unparseable value
/// all read as an empty collection. Writes replace the whole collection.
#[derive(Clone)]
pub struct RecordStore {
    storage: Arc<dyn KeyValueStorage>,
    clock: Arc<dyn Clock>,
    window: ValidityWindow,
}

impl RecordStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            window: ValidityWindow::default(),
        }
    }

    pub fn with_validity_window(mut self, window: ValidityWindow) -> Self {
        self.window = window;
        self
    }

    pub fn validity_window(&self) -> ValidityWindow {
        self.window
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Raw read without revalidation
    pub async fn read<R: Record>(&self, key: &str) -> Vec<R> {
        self.fetch(key).await.unwrap_or_default()
    }

    /// Read, expire anything past its window, write the result back and return it.
    ///
    /// The write-back only happens when the key held a readable collection.
    /// A failed write-back is logged and the revalidated records are still returned.
    pub async fn load<R: Record>(&self, key: &str) -> Vec<R> {
        let Some(records) = self.fetch::<R>(key).await else {
            return Vec::new();
        };

        let revalidated = self.revalidate(records);
        if revalidated.expired > 0 {
            info!("Expired {} record(s) in {}", revalidated.expired, key);
        }

        // save() has already logged the failure
        let _ = self.save(key, &revalidated.records).await;

        revalidated.records
    }

    /// Serialize the whole sequence and overwrite whatever was stored under `key`
    pub async fn save<R: Record>(&self, key: &str, records: &[R]) -> CoreResult<()> {
        let payload = serde_json::to_string(records).map_err(|e| {
            error!("Error serializing {}: {}", key, e);
            e
        })?;

        self.storage.set_item(key, &payload).await.map_err(|e| {
            error!("Error saving {}: {}", key, e);
            e
        })?;

        Ok(())
    }

    /// Place `record` at the front of the collection and persist it.
    ///
    /// Not atomic: a concurrent writer between the read and the write is lost.
    pub async fn append<R: Record>(&self, key: &str, record: R) -> CoreResult<Vec<R>> {
        let mut records = self.read::<R>(key).await;
        records.insert(0, record);
        self.save(key, &records).await?;
        Ok(records)
    }

    /// Flip expired VALID records to INVALID as of the store's clock. Does not persist.
    pub fn revalidate<R: Record>(&self, records: Vec<R>) -> Revalidated<R> {
        revalidate_at(records, self.window, self.clock.now_millis())
    }

    /// `load` for the record type's own collection
    pub async fn load_collection<R: Record>(&self) -> Vec<R> {
        self.load(R::COLLECTION_KEY).await
    }

    /// `append` to the record type's own collection
    pub async fn append_to_collection<R: Record>(&self, record: R) -> CoreResult<Vec<R>> {
        self.append(R::COLLECTION_KEY, record).await
    }

    async fn fetch<R: Record>(&self, key: &str) -> Option<Vec<R>> {
        let raw = match self.storage.get_item(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                error!("Error loading {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str::<Vec<R>>(&raw) {
            Ok(records) => Some(records),
            Err(e) => {
                warn!("Discarding unreadable {} collection: {}", key, e);
                None
            }
        }
    }
}

/// Pure revalidation against an explicit instant
pub fn revalidate_at<R: Record>(
    mut records: Vec<R>,
    window: ValidityWindow,
    now_millis: i64,
) -> Revalidated<R> {
    let expired = records
        .iter_mut()
        .map(|record| record.expire_if_elapsed(window, now_millis))
        .filter(|flipped| *flipped)
        .count();

    Revalidated { records, expired }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStorage;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use transit_core::{ManualClock, StorageError};
    use transit_shared::{BusType, Pass, RecordStatus, Ticket, BUS_PASSES_KEY, BUS_TICKETS_KEY};

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 10, 6, 0, 0).unwrap()))
    }

    fn ticket(id: &str, timestamp: i64, status: RecordStatus) -> Ticket {
        Ticket {
            id: id.to_string(),
            route_number: "539A".to_string(),
            source_stop: "Asian Market".to_string(),
            destination_stop: "Saket Crossing".to_string(),
            bus_type: BusType::NonAc,
            ticket_count: 1,
            total_amount: 15.0,
            date: "6/10/2024".to_string(),
            time: "11:30:00 AM".to_string(),
            status,
            timestamp,
        }
    }

    /// Storage whose every call fails
    struct BrokenStorage;

    #[async_trait]
    impl KeyValueStorage for BrokenStorage {
        async fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disk gone".to_string()))
        }

        async fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk gone".to_string()))
        }

        async fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk gone".to_string()))
        }
    }

    /// Reads from a shared map, refuses every write
    struct ReadOnlyStorage(MemoryStorage);

    #[async_trait]
    impl KeyValueStorage for ReadOnlyStorage {
        async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get_item(key).await
        }

        async fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("read-only".to_string()))
        }

        async fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("read-only".to_string()))
        }
    }

    #[tokio::test]
    async fn test_failed_write_back_still_returns_revalidated() {
        let clock = clock();
        let t0 = clock.now_millis();
        let storage = MemoryStorage::new();
        RecordStore::new(Arc::new(storage.clone()), clock.clone())
            .save(BUS_TICKETS_KEY, &[ticket("1", t0, RecordStatus::Valid)])
            .await
            .unwrap();

        let store = RecordStore::new(Arc::new(ReadOnlyStorage(storage.clone())), clock.clone());
        clock.advance(Duration::minutes(61));

        let loaded: Vec<Ticket> = store.load(BUS_TICKETS_KEY).await;
        assert_eq!(loaded[0].status, RecordStatus::Invalid);

        // The write was dropped, storage still holds the VALID version
        let raw = storage.get_item(BUS_TICKETS_KEY).await.unwrap().unwrap();
        let persisted: Vec<Ticket> = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted[0].status, RecordStatus::Valid);
    }

    #[tokio::test]
    async fn test_load_unset_key_is_empty() {
        let storage = MemoryStorage::new();
        let store = RecordStore::new(Arc::new(storage.clone()), clock());

        let tickets: Vec<Ticket> = store.load(BUS_TICKETS_KEY).await;
        assert!(tickets.is_empty());
        // Nothing was there, nothing is written back
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_save_then_load_preserves_order() {
        let clock = clock();
        let now = clock.now_millis();
        let store = RecordStore::new(Arc::new(MemoryStorage::new()), clock);

        let tickets = vec![
            ticket("3", now - 1_000, RecordStatus::Valid),
            ticket("2", now - 2_000, RecordStatus::Invalid),
            ticket("1", now - 3_000, RecordStatus::Valid),
        ];
        store.save(BUS_TICKETS_KEY, &tickets).await.unwrap();

        let loaded: Vec<Ticket> = store.load(BUS_TICKETS_KEY).await;
        assert_eq!(loaded, tickets);
    }

    #[tokio::test]
    async fn test_append_puts_newest_first() {
        let clock = clock();
        let now = clock.now_millis();
        let store = RecordStore::new(Arc::new(MemoryStorage::new()), clock);

        store.append(BUS_TICKETS_KEY, ticket("first", now, RecordStatus::Valid)).await.unwrap();
        let records = store
            .append(BUS_TICKETS_KEY, ticket("second", now + 1, RecordStatus::Valid))
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "second");

        let stored: Vec<Ticket> = store.read(BUS_TICKETS_KEY).await;
        assert_eq!(stored[0].id, "second");
        assert_eq!(stored[1].id, "first");
    }

    #[tokio::test]
    async fn test_load_expires_and_persists() {
        let clock = clock();
        let t0 = clock.now_millis();
        let store = RecordStore::new(Arc::new(MemoryStorage::new()), clock.clone());

        store
            .append_to_collection(ticket("1", t0, RecordStatus::Valid))
            .await
            .unwrap();

        clock.advance(Duration::minutes(59));
        let loaded: Vec<Ticket> = store.load_collection().await;
        assert_eq!(loaded[0].status, RecordStatus::Valid);

        clock.advance(Duration::minutes(2));
        let loaded: Vec<Ticket> = store.load_collection().await;
        assert_eq!(loaded[0].status, RecordStatus::Invalid);

        let raw: Vec<Ticket> = store.read(BUS_TICKETS_KEY).await;
        assert_eq!(raw[0].status, RecordStatus::Invalid);
    }

    #[tokio::test]
    async fn test_read_does_not_revalidate() {
        let clock = clock();
        let t0 = clock.now_millis();
        let store = RecordStore::new(Arc::new(MemoryStorage::new()), clock.clone());
        store.append(BUS_TICKETS_KEY, ticket("1", t0, RecordStatus::Valid)).await.unwrap();

        clock.advance(Duration::hours(2));
        let raw: Vec<Ticket> = store.read(BUS_TICKETS_KEY).await;
        assert_eq!(raw[0].status, RecordStatus::Valid);
    }

    #[tokio::test]
    async fn test_invalid_records_untouched() {
        let clock = clock();
        let t0 = clock.now_millis();
        let store = RecordStore::new(Arc::new(MemoryStorage::new()), clock.clone());
        let expired = ticket("1", t0, RecordStatus::Invalid);
        store.save(BUS_TICKETS_KEY, &[expired.clone()]).await.unwrap();

        clock.advance(Duration::hours(3));
        let first: Vec<Ticket> = store.load(BUS_TICKETS_KEY).await;
        let second: Vec<Ticket> = store.load(BUS_TICKETS_KEY).await;

        assert_eq!(first, vec![expired.clone()]);
        assert_eq!(second, vec![expired]);
    }

    #[tokio::test]
    async fn test_unparseable_value_reads_as_empty() {
        let storage = MemoryStorage::new();
        storage.set_item(BUS_PASSES_KEY, "{not json").await.unwrap();
        let store = RecordStore::new(Arc::new(storage.clone()), clock());

        let passes: Vec<Pass> = store.load(BUS_PASSES_KEY).await;
        assert!(passes.is_empty());

        // Left as is until the next append overwrites it
        assert_eq!(storage.get_item(BUS_PASSES_KEY).await.unwrap().as_deref(), Some("{not json"));
    }

    #[tokio::test]
    async fn test_broken_storage_fails_soft_on_load() {
        let store = RecordStore::new(Arc::new(BrokenStorage), clock());

        let tickets: Vec<Ticket> = store.load(BUS_TICKETS_KEY).await;
        assert!(tickets.is_empty());

        let result = store.append(BUS_TICKETS_KEY, ticket("1", 0, RecordStatus::Valid)).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_revalidate_at_threshold() {
        let t0 = 1_718_000_000_000;
        let records = vec![
            ticket("fresh", t0 - 3_599_999, RecordStatus::Valid),
            ticket("edge", t0 - 3_600_000, RecordStatus::Valid),
            ticket("old", t0 - 7_200_000, RecordStatus::Invalid),
        ];

        let result = revalidate_at(records, ValidityWindow::ONE_HOUR, t0);

        assert_eq!(result.expired, 1);
        assert_eq!(result.records[0].status, RecordStatus::Valid);
        assert_eq!(result.records[1].status, RecordStatus::Invalid);
        assert_eq!(result.records[2].status, RecordStatus::Invalid);
    }

    #[tokio::test]
    async fn test_custom_window() {
        let clock = clock();
        let t0 = clock.now_millis();
        let store = RecordStore::new(Arc::new(MemoryStorage::new()), clock.clone())
            .with_validity_window(ValidityWindow::from_seconds(60));
        store.append(BUS_TICKETS_KEY, ticket("1", t0, RecordStatus::Valid)).await.unwrap();

        clock.advance(Duration::seconds(60));
        let loaded: Vec<Ticket> = store.load(BUS_TICKETS_KEY).await;
        assert_eq!(loaded[0].status, RecordStatus::Invalid);
    }
}
