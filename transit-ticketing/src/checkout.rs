use std::future::Future;
use tracing::{error, info};
use transit_core::{Clock, CoreError, RecordStamp};
use transit_shared::{Pass, RecordStatus, Ticket};
use transit_store::RecordStore;

use crate::booking::{BookingError, PassBooking, TicketBooking};
use crate::countdown::CountdownHandle;

/// Seconds the payment screen stays open before the booking lapses
pub const PAYMENT_WINDOW_SECONDS: u64 = 164;

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Your booking time has expired. Please try again.")]
    PaymentWindowExpired,

    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error("Failed to save: {0}")]
    Store(#[from] CoreError),
}

/// Open payment window for a ticket booking
#[derive(Clone)]
pub struct TicketCheckout {
    store: RecordStore,
    booking: TicketBooking,
    opened_at: i64,
    payment_window: u64,
}

impl TicketCheckout {
    pub fn begin(store: RecordStore, booking: TicketBooking) -> Self {
        let opened_at = store.clock().now_millis();
        Self {
            store,
            booking,
            opened_at,
            payment_window: PAYMENT_WINDOW_SECONDS,
        }
    }

    pub fn with_payment_window(mut self, seconds: u64) -> Self {
        self.payment_window = seconds;
        self
    }

    pub fn booking(&self) -> &TicketBooking {
        &self.booking
    }

    /// Simulated payment succeeded: issue a VALID ticket at the front of the wallet
    pub async fn confirm(&self) -> Result<Ticket, CheckoutError> {
        let now = self.store.clock().now();
        if window_elapsed(self.opened_at, now.timestamp_millis(), self.payment_window) {
            return Err(CheckoutError::PaymentWindowExpired);
        }

        let ticket = issue_ticket(&self.booking, &RecordStamp::at(now));
        self.store.append_to_collection(ticket.clone()).await.map_err(|e| {
            error!("Error saving ticket: {}", e);
            e
        })?;

        info!(
            "Ticket {} booked: route {} x{} for {:.1}",
            ticket.id, ticket.route_number, ticket.ticket_count, ticket.total_amount
        );
        Ok(ticket)
    }

    /// Drive the on-screen timer. Nothing is stored when it lapses.
    pub fn countdown<F>(&self, on_expire: F) -> CountdownHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        CountdownHandle::spawn(self.payment_window, on_expire)
    }
}

/// Open window for claiming a free pass
#[derive(Clone)]
pub struct PassCheckout {
    store: RecordStore,
    booking: PassBooking,
    opened_at: i64,
    payment_window: u64,
}

impl PassCheckout {
    pub fn begin(store: RecordStore, booking: PassBooking) -> Self {
        let opened_at = store.clock().now_millis();
        Self {
            store,
            booking,
            opened_at,
            payment_window: PAYMENT_WINDOW_SECONDS,
        }
    }

    pub fn with_payment_window(mut self, seconds: u64) -> Self {
        self.payment_window = seconds;
        self
    }

    pub fn booking(&self) -> &PassBooking {
        &self.booking
    }

    pub async fn confirm(&self) -> Result<Pass, CheckoutError> {
        let now = self.store.clock().now();
        if window_elapsed(self.opened_at, now.timestamp_millis(), self.payment_window) {
            return Err(CheckoutError::PaymentWindowExpired);
        }

        let pass = issue_pass(&self.booking, &RecordStamp::at(now), RecordStatus::Valid);
        self.store.append_to_collection(pass.clone()).await.map_err(|e| {
            error!("Error saving pass: {}", e);
            e
        })?;

        info!("Pass {} issued: route {} x{}", pass.id, pass.route_number, pass.pass_count);
        Ok(pass)
    }

    /// Record the lapsed claim as an INVALID pass
    pub async fn expire(&self) -> Result<Pass, CheckoutError> {
        let pass = issue_pass(
            &self.booking,
            &RecordStamp::at(self.store.clock().now()),
            RecordStatus::Invalid,
        );
        self.store.append_to_collection(pass.clone()).await.map_err(|e| {
            error!("Error saving expired pass: {}", e);
            e
        })?;

        info!("Pass claim {} lapsed on route {}", pass.id, pass.route_number);
        Ok(pass)
    }

    /// Drive the on-screen timer. On lapse the expired pass is stored, then
    /// `on_expire` runs (the host returns to its home screen).
    pub fn countdown<F>(&self, on_expire: F) -> CountdownHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let checkout = self.clone();
        CountdownHandle::spawn(self.payment_window, async move {
            // expire() has logged any failure; the host leaves regardless
            let _ = checkout.expire().await;
            on_expire.await;
        })
    }
}

fn window_elapsed(opened_at: i64, now_millis: i64, window_seconds: u64) -> bool {
    now_millis.saturating_sub(opened_at) >= (window_seconds as i64).saturating_mul(1000)
}

pub(crate) fn issue_ticket(booking: &TicketBooking, stamp: &RecordStamp) -> Ticket {
    Ticket {
        id: stamp.ticket_id(),
        route_number: booking.route_number.clone(),
        source_stop: booking.source_stop.clone(),
        destination_stop: booking.destination_stop.clone(),
        bus_type: booking.bus_type,
        ticket_count: booking.ticket_count,
        total_amount: booking.total_amount,
        date: stamp.date.clone(),
        time: stamp.time.clone(),
        status: RecordStatus::Valid,
        timestamp: stamp.timestamp,
    }
}

pub(crate) fn issue_pass(booking: &PassBooking, stamp: &RecordStamp, status: RecordStatus) -> Pass {
    Pass {
        id: stamp.pass_id(),
        route_number: booking.route_number.clone(),
        source_stop: booking.source_stop.clone(),
        destination_stop: booking.destination_stop.clone(),
        pass_count: booking.pass_count,
        total_amount: 0.0,
        date: stamp.date.clone(),
        time: stamp.time.clone(),
        status,
        timestamp: stamp.timestamp,
    }
}
