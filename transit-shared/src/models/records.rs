use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage key holding the JSON array of purchased tickets
pub const BUS_TICKETS_KEY: &str = "busTickets";

/// Storage key holding the JSON array of issued passes
pub const BUS_PASSES_KEY: &str = "busPasses";

/// Ticket/pass status as persisted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    Valid,
    Invalid,
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordStatus::Valid => write!(f, "VALID"),
            RecordStatus::Invalid => write!(f, "INVALID"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum BusType {
    #[serde(rename = "AC")]
    Ac,
    #[serde(rename = "Non-AC")]
    #[default]
    NonAc,
}

impl fmt::Display for BusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusType::Ac => write!(f, "AC"),
            BusType::NonAc => write!(f, "Non-AC"),
        }
    }
}

/// A paid single-journey ticket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub route_number: String,
    pub source_stop: String,
    pub destination_stop: String,
    pub bus_type: BusType,
    pub ticket_count: u32,
    pub total_amount: f64,
    pub date: String,
    pub time: String,
    pub status: RecordStatus,
    /// Creation instant in milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl Ticket {
    /// Fare of a single ticket in this purchase
    pub fn fare_per_ticket(&self) -> f64 {
        if self.ticket_count == 0 {
            return self.total_amount;
        }
        self.total_amount / self.ticket_count as f64
    }
}

/// A free pass. Same lifecycle as a ticket, amount is always zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pass {
    pub id: String,
    pub route_number: String,
    pub source_stop: String,
    pub destination_stop: String,
    pub pass_count: u32,
    pub total_amount: f64,
    pub date: String,
    pub time: String,
    pub status: RecordStatus,
    pub timestamp: i64,
}
