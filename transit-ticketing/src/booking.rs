use serde::{Deserialize, Serialize};
use transit_shared::BusType;

/// Placeholder used when a booking reaches confirmation without a route or stop
pub const NOT_AVAILABLE: &str = "N/A";

pub const MAX_TICKETS_PER_BOOKING: u32 = 3;
pub const MAX_PASSES_PER_BOOKING: u32 = 10;

/// Per bus type fares of a route. A zero fare means the bus type does not run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Fare {
    #[serde(rename = "AC", default)]
    pub ac: f64,
    #[serde(rename = "Non-AC", default)]
    pub non_ac: f64,
}

impl Fare {
    pub fn for_bus_type(&self, bus_type: BusType) -> f64 {
        match bus_type {
            BusType::Ac => self.ac,
            BusType::NonAc => self.non_ac,
        }
    }

    pub fn offers(&self, bus_type: BusType) -> bool {
        self.for_bus_type(bus_type) > 0.0
    }
}

/// Route as handed in by the caller's route catalogue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteFare {
    pub route_number: String,
    #[serde(default)]
    pub stops: Vec<String>,
    pub fare: Fare,
}

/// Booking details carried from the selection screen to the payment screen.
///
/// Every field has a fallback so a partially filled hand-off still confirms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TicketBooking {
    pub route_number: String,
    pub source_stop: String,
    pub destination_stop: String,
    pub bus_type: BusType,
    pub ticket_count: u32,
    pub total_amount: f64,
}

impl Default for TicketBooking {
    fn default() -> Self {
        Self {
            route_number: NOT_AVAILABLE.to_string(),
            source_stop: NOT_AVAILABLE.to_string(),
            destination_stop: NOT_AVAILABLE.to_string(),
            bus_type: BusType::NonAc,
            ticket_count: 1,
            total_amount: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PassBooking {
    pub route_number: String,
    pub source_stop: String,
    pub destination_stop: String,
    pub pass_count: u32,
}

impl Default for PassBooking {
    fn default() -> Self {
        Self {
            route_number: NOT_AVAILABLE.to_string(),
            source_stop: NOT_AVAILABLE.to_string(),
            destination_stop: NOT_AVAILABLE.to_string(),
            pass_count: 1,
        }
    }
}

/// In-progress ticket selection
#[derive(Debug, Clone, PartialEq)]
pub struct TicketSelection {
    route: Option<RouteFare>,
    source_stop: Option<String>,
    destination_stop: Option<String>,
    bus_type: BusType,
    ticket_count: u32,
}

impl TicketSelection {
    pub fn new() -> Self {
        Self {
            route: None,
            source_stop: None,
            destination_stop: None,
            bus_type: BusType::NonAc,
            ticket_count: 1,
        }
    }

    /// Picking a route clears both stops
    pub fn select_route(&mut self, route: RouteFare) {
        self.route = Some(route);
        self.source_stop = None;
        self.destination_stop = None;
    }

    pub fn select_source_stop(&mut self, stop: impl Into<String>) -> Result<(), BookingError> {
        self.source_stop = Some(self.stop_on_route(stop.into())?);
        Ok(())
    }

    pub fn select_destination_stop(&mut self, stop: impl Into<String>) -> Result<(), BookingError> {
        self.destination_stop = Some(self.stop_on_route(stop.into())?);
        Ok(())
    }

    pub fn select_bus_type(&mut self, bus_type: BusType) -> Result<(), BookingError> {
        let route = self.route.as_ref().ok_or(BookingError::MissingSelection("route"))?;
        if !route.fare.offers(bus_type) {
            return Err(BookingError::BusTypeUnavailable {
                route: route.route_number.clone(),
                bus_type,
            });
        }
        self.bus_type = bus_type;
        Ok(())
    }

    pub fn select_ticket_count(&mut self, count: u32) -> Result<(), BookingError> {
        if !(1..=MAX_TICKETS_PER_BOOKING).contains(&count) {
            return Err(BookingError::InvalidCount { count, max: MAX_TICKETS_PER_BOOKING });
        }
        self.ticket_count = count;
        Ok(())
    }

    pub fn bus_type(&self) -> BusType {
        self.bus_type
    }

    pub fn ticket_count(&self) -> u32 {
        self.ticket_count
    }

    /// Fare for the selected bus type times the ticket count, zero without a route
    pub fn amount(&self) -> f64 {
        match &self.route {
            Some(route) => route.fare.for_bus_type(self.bus_type) * self.ticket_count as f64,
            None => 0.0,
        }
    }

    /// Check the selection is complete and produce the hand-off for payment
    pub fn validate(&self) -> Result<TicketBooking, BookingError> {
        let (route, source_stop, destination_stop) =
            required_fields(&self.route, &self.source_stop, &self.destination_stop)?;

        // A route change keeps the previous bus type, which the new route may not run
        if !route.fare.offers(self.bus_type) {
            return Err(BookingError::BusTypeUnavailable {
                route: route.route_number.clone(),
                bus_type: self.bus_type,
            });
        }

        Ok(TicketBooking {
            route_number: route.route_number.clone(),
            source_stop: source_stop.to_string(),
            destination_stop: destination_stop.to_string(),
            bus_type: self.bus_type,
            ticket_count: self.ticket_count,
            total_amount: self.amount(),
        })
    }

    fn stop_on_route(&self, stop: String) -> Result<String, BookingError> {
        let route = self.route.as_ref().ok_or(BookingError::MissingSelection("route"))?;
        if !route.stops.is_empty() && !route.stops.contains(&stop) {
            return Err(BookingError::UnknownStop { route: route.route_number.clone(), stop });
        }
        Ok(stop)
    }
}

impl Default for TicketSelection {
    fn default() -> Self {
        Self::new()
    }
}

/// In-progress pass selection. Passes are free.
#[derive(Debug, Clone, PartialEq)]
pub struct PassSelection {
    route: Option<RouteFare>,
    source_stop: Option<String>,
    destination_stop: Option<String>,
    pass_count: u32,
}

impl PassSelection {
    pub fn new() -> Self {
        Self {
            route: None,
            source_stop: None,
            destination_stop: None,
            pass_count: 1,
        }
    }

    pub fn select_route(&mut self, route: RouteFare) {
        self.route = Some(route);
        self.source_stop = None;
        self.destination_stop = None;
    }

    pub fn select_source_stop(&mut self, stop: impl Into<String>) {
        self.source_stop = Some(stop.into());
    }

    pub fn select_destination_stop(&mut self, stop: impl Into<String>) {
        self.destination_stop = Some(stop.into());
    }

    pub fn increment(&mut self) {
        self.pass_count = (self.pass_count + 1).min(MAX_PASSES_PER_BOOKING);
    }

    pub fn decrement(&mut self) {
        self.pass_count = self.pass_count.saturating_sub(1).max(1);
    }

    pub fn pass_count(&self) -> u32 {
        self.pass_count
    }

    pub fn validate(&self) -> Result<PassBooking, BookingError> {
        let (route, source_stop, destination_stop) =
            required_fields(&self.route, &self.source_stop, &self.destination_stop)?;

        Ok(PassBooking {
            route_number: route.route_number.clone(),
            source_stop: source_stop.to_string(),
            destination_stop: destination_stop.to_string(),
            pass_count: self.pass_count,
        })
    }
}

impl Default for PassSelection {
    fn default() -> Self {
        Self::new()
    }
}

fn required_fields<'a>(
    route: &'a Option<RouteFare>,
    source_stop: &'a Option<String>,
    destination_stop: &'a Option<String>,
) -> Result<(&'a RouteFare, &'a str, &'a str), BookingError> {
    let route = route.as_ref().ok_or(BookingError::MissingSelection("route"))?;
    let source_stop = source_stop
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(BookingError::MissingSelection("source stop"))?;
    let destination_stop = destination_stop
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(BookingError::MissingSelection("destination stop"))?;
    Ok((route, source_stop, destination_stop))
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BookingError {
    #[error("Please select a {0}")]
    MissingSelection(&'static str),

    #[error("{bus_type} buses do not run on route {route}")]
    BusTypeUnavailable { route: String, bus_type: BusType },

    #[error("Stop {stop} is not on route {route}")]
    UnknownStop { route: String, stop: String },

    #[error("Cannot book {count} tickets, maximum is {max}")]
    InvalidCount { count: u32, max: u32 },
}
