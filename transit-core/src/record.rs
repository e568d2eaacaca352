use serde::de::DeserializeOwned;
use serde::Serialize;
use transit_shared::{Pass, RecordStatus, Ticket, BUS_PASSES_KEY, BUS_TICKETS_KEY};

use crate::validity::ValidityWindow;

/// A persisted ticket or pass with a time-based validity window
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Storage key of the collection this record type lives in
    const COLLECTION_KEY: &'static str;
    /// Leading tag of the QR payload
    const KIND: &'static str;

    fn id(&self) -> &str;
    fn route_number(&self) -> &str;
    fn status(&self) -> RecordStatus;
    fn set_status(&mut self, status: RecordStatus);
    fn timestamp(&self) -> i64;

    /// Flip VALID to INVALID once the window has elapsed. Returns true if changed.
    fn expire_if_elapsed(&mut self, window: ValidityWindow, now_millis: i64) -> bool {
        if self.status() == RecordStatus::Valid && window.is_expired(self.timestamp(), now_millis) {
            self.set_status(RecordStatus::Invalid);
            return true;
        }
        false
    }

    /// Live check used by detail views. Does not trust a VALID stored status.
    fn is_live_valid(&self, window: ValidityWindow, now_millis: i64) -> bool {
        self.status() != RecordStatus::Invalid && !window.is_expired(self.timestamp(), now_millis)
    }

    fn transaction_id(&self) -> String {
        format!("T{}", self.timestamp())
    }

    fn qr_payload(&self) -> String {
        format!("{}:{}:{}:{}", Self::KIND, self.id(), self.route_number(), self.timestamp())
    }
}

impl Record for Ticket {
    const COLLECTION_KEY: &'static str = BUS_TICKETS_KEY;
    const KIND: &'static str = "TICKET";

    fn id(&self) -> &str {
        &self.id
    }

    fn route_number(&self) -> &str {
        &self.route_number
    }

    fn status(&self) -> RecordStatus {
        self.status
    }

    fn set_status(&mut self, status: RecordStatus) {
        self.status = status;
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

impl Record for Pass {
    const COLLECTION_KEY: &'static str = BUS_PASSES_KEY;
    const KIND: &'static str = "PASS";

    fn id(&self) -> &str {
        &self.id
    }

    fn route_number(&self) -> &str {
        &self.route_number
    }

    fn status(&self) -> RecordStatus {
        self.status
    }

    fn set_status(&mut self, status: RecordStatus) {
        self.status = status;
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}
