use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ticket::Ticket;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i32,
    pub traveler_id: i32,
    pub travel_id: i32,
    pub status: BookingStatus,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Booking row as requested, before the database assigns its id.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub traveler_id: i32,
    pub travel_id: i32,
    pub total_price: Decimal,
}

/// A booking together with its tickets, ordered by ascending ticket id.
///
/// The ticket order is what QR payload indexes refer to, so every
/// constructor of this type must preserve it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingWithTickets {
    #[serde(flatten)]
    pub booking: Booking,
    pub tickets: Vec<Ticket>,
}

impl BookingWithTickets {
    pub fn new(booking: Booking, mut tickets: Vec<Ticket>) -> Self {
        tickets.sort_by_key(|ticket| ticket.id);
        Self { booking, tickets }
    }

    /// Ticket at a 1-based position, if any.
    pub fn ticket_at(&self, index: usize) -> Option<&Ticket> {
        index.checked_sub(1).and_then(|i| self.tickets.get(i))
    }
}
