pub mod models;

pub use models::records::{BusType, Pass, RecordStatus, Ticket};
pub use models::records::{BUS_PASSES_KEY, BUS_TICKETS_KEY};
