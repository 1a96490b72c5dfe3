use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: i32,
    pub booking_id: i32,
    pub name: String,
    pub age: i32,
    pub badge_number: String,
    pub qr_code_url: String,
    pub checked_in: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub checked_in_by_id: Option<i32>,
}

impl Ticket {
    pub fn summary(&self) -> TicketSummary {
        TicketSummary {
            id: self.id,
            name: self.name.clone(),
            badge_number: self.badge_number.clone(),
            booking_id: self.booking_id,
            checked_in_at: self.checked_in_at,
        }
    }
}

/// Public fields returned to scanning staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketSummary {
    pub id: i32,
    pub name: String,
    pub badge_number: String,
    pub booking_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_in_at: Option<DateTime<Utc>>,
}

/// Traveler named on a booking request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Traveler {
    pub name: String,
    pub age: i32,
}

#[derive(Debug, Clone)]
pub struct NewTicket {
    pub booking_id: i32,
    pub name: String,
    pub age: i32,
    pub badge_number: String,
    pub qr_code_url: String,
}
