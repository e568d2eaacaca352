use std::sync::Arc;
use transit_core::Clock;
use transit_store::app_config::Config;
use transit_store::RecordStore;

use crate::booking::{PassSelection, TicketSelection};
use crate::checkout::{CheckoutError, PassCheckout, TicketCheckout, PAYMENT_WINDOW_SECONDS};
use crate::wallet::Wallet;

/// Store capability handed to every screen handler
#[derive(Clone)]
pub struct Ticketing {
    store: RecordStore,
    payment_window: u64,
}

impl Ticketing {
    pub fn new(store: RecordStore) -> Self {
        Self {
            store,
            payment_window: PAYMENT_WINDOW_SECONDS,
        }
    }

    pub fn from_config(config: &Config, clock: Arc<dyn Clock>) -> Self {
        let store = RecordStore::new(config.open_storage(), clock)
            .with_validity_window(config.validity.window());
        Self {
            store,
            payment_window: config.checkout.payment_window_seconds,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn wallet(&self) -> Wallet {
        Wallet::new(self.store.clone())
    }

    /// Blocks on an incomplete selection; nothing is stored in that case
    pub fn ticket_checkout(
        &self,
        selection: &TicketSelection,
    ) -> Result<TicketCheckout, CheckoutError> {
        let booking = selection.validate()?;
        let checkout = TicketCheckout::begin(self.store.clone(), booking);
        Ok(checkout.with_payment_window(self.payment_window))
    }

    pub fn pass_checkout(&self, selection: &PassSelection) -> Result<PassCheckout, CheckoutError> {
        let booking = selection.validate()?;
        let checkout = PassCheckout::begin(self.store.clone(), booking);
        Ok(checkout.with_payment_window(self.payment_window))
    }
}
