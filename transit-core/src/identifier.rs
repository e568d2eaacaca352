use chrono::{DateTime, Local, TimeZone, Utc};
use std::fmt::Display;

/// Prefix of human-readable pass identifiers
pub const PASS_ID_PREFIX: &str = "DL1PD";

/// Identifier and timestamps assigned when a purchase is confirmed.
///
/// Ids are derived from the clock and carry no uniqueness guarantee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordStamp {
    pub timestamp: i64,
    pub date: String,
    pub time: String,
}

impl RecordStamp {
    /// Stamp using the device's local time zone for the display strings
    pub fn at(now: DateTime<Utc>) -> Self {
        Self::in_zone(now, &Local)
    }

    pub fn in_zone<Tz>(now: DateTime<Utc>, zone: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let local = now.with_timezone(zone);
        Self {
            timestamp: now.timestamp_millis(),
            date: local.format("%-m/%-d/%Y").to_string(),
            time: local.format("%-I:%M:%S %p").to_string(),
        }
    }

    /// Ticket ids are the full millisecond timestamp
    pub fn ticket_id(&self) -> String {
        self.timestamp.to_string()
    }

    /// Pass ids are a fixed prefix and the last four digits of the timestamp
    pub fn pass_id(&self) -> String {
        let digits = self.timestamp.to_string();
        let tail = &digits[digits.len().saturating_sub(4)..];
        format!("{}{}", PASS_ID_PREFIX, tail)
    }
}
