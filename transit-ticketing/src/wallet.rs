use transit_core::{Clock, Record, ValidityWindow};
use transit_shared::{Pass, Ticket};
use transit_store::RecordStore;

/// Tickets and passes as shown on the wallet screen, newest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalletView {
    pub tickets: Vec<Ticket>,
    pub passes: Vec<Pass>,
}

impl WalletView {
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty() && self.passes.is_empty()
    }
}

/// The wallet screen's view of the store.
///
/// Statuses are only as fresh as the last `refresh`. Anything that needs a
/// live answer should go through [`RecordDetail`].
#[derive(Clone)]
pub struct Wallet {
    store: RecordStore,
}

impl Wallet {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Run on screen focus: load and revalidate both collections
    pub async fn refresh(&self) -> WalletView {
        let tickets = self.store.load_collection::<Ticket>().await;
        let passes = self.store.load_collection::<Pass>().await;
        WalletView { tickets, passes }
    }

    /// Build the detail view for a record picked from the list
    pub fn detail<R: Record>(&self, record: R) -> RecordDetail<R> {
        RecordDetail::new(record, self.store.validity_window())
    }
}

/// Detail screen state for one ticket or pass
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDetail<R> {
    record: R,
    window: ValidityWindow,
}

impl<R: Record> RecordDetail<R> {
    pub fn new(record: R, window: ValidityWindow) -> Self {
        Self { record, window }
    }

    pub fn record(&self) -> &R {
        &self.record
    }

    /// Live check that ignores a stale VALID status
    pub fn is_live_valid(&self, clock: &dyn Clock) -> bool {
        self.record.is_live_valid(self.window, clock.now_millis())
    }

    /// Seconds until expiry, derived from the creation timestamp
    pub fn seconds_remaining(&self, clock: &dyn Clock) -> u64 {
        if !self.is_live_valid(clock) {
            return 0;
        }
        self.window.remaining_seconds(self.record.timestamp(), clock.now_millis())
    }

    pub fn transaction_id(&self) -> String {
        self.record.transaction_id()
    }

    pub fn qr_payload(&self) -> String {
        self.record.qr_payload()
    }
}

impl RecordDetail<Ticket> {
    pub fn fare_per_ticket(&self) -> f64 {
        self.record.fare_per_ticket()
    }
}
