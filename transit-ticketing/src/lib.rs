pub mod booking;
pub mod checkout;
pub mod context;
pub mod countdown;
pub mod wallet;

pub use booking::{
    BookingError, Fare, PassBooking, PassSelection, RouteFare, TicketBooking, TicketSelection,
};
pub use checkout::{CheckoutError, PassCheckout, TicketCheckout};
pub use context::Ticketing;
pub use countdown::{Countdown, CountdownHandle, Tick};
pub use wallet::{RecordDetail, Wallet, WalletView};
