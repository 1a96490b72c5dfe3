//! Booking creation and per-traveler ticket issuance.

pub mod badge;
pub mod qr;

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;

use crate::checkin::payload::QrPayload;
use crate::models::{BookingWithTickets, NewBooking, NewTicket, Traveler};
use crate::repository::BookingRepository;

pub use badge::generate_badge_number;
pub use qr::{QrRenderer, SvgQrRenderer};

/// Badge numbers tried per ticket before issuance gives up.
pub const MAX_BADGE_ATTEMPTS: usize = 5;

const MAX_TRAVELER_AGE: i32 = 150;

#[derive(Debug, Error)]
pub enum IssueError {
    #[error("At least one traveler is required")]
    NoTravelers,

    #[error("Invalid traveler: {0}")]
    InvalidTraveler(String),

    #[error("Travel {0} not found")]
    TravelNotFound(i32),

    #[error("Could not allocate a unique badge number")]
    BadgeExhausted,

    #[error("QR code rendering failed: {0}")]
    Render(String),

    #[error("Storage error")]
    Storage(#[from] sqlx::Error),
}

/// Builds the ticket row for one traveler of a booking.
///
/// Called again with the same arguments when the minted badge number turns
/// out to be taken, so each call must produce a fresh badge.
pub trait TicketMinter: Send + Sync {
    fn mint(
        &self,
        booking_id: i32,
        position: usize,
        traveler: &Traveler,
    ) -> Result<NewTicket, IssueError>;
}

pub struct StandardMinter {
    renderer: Arc<dyn QrRenderer>,
}

impl StandardMinter {
    pub fn new(renderer: Arc<dyn QrRenderer>) -> Self {
        Self { renderer }
    }
}

impl TicketMinter for StandardMinter {
    fn mint(
        &self,
        booking_id: i32,
        position: usize,
        traveler: &Traveler,
    ) -> Result<NewTicket, IssueError> {
        let payload = QrPayload::new(booking_id, position, traveler.name.trim());
        let qr_code_url = self.renderer.render(&payload.to_transport())?;

        Ok(NewTicket {
            booking_id,
            name: traveler.name.clone(),
            age: traveler.age,
            badge_number: generate_badge_number(),
            qr_code_url,
        })
    }
}

pub struct TicketIssuer {
    bookings: Arc<dyn BookingRepository>,
    minter: Arc<dyn TicketMinter>,
}

impl TicketIssuer {
    pub fn new(bookings: Arc<dyn BookingRepository>, minter: Arc<dyn TicketMinter>) -> Self {
        Self { bookings, minter }
    }

    /// Creates a pending booking for `traveler_id` with one ticket per
    /// traveler, in the given order.
    pub async fn issue(
        &self,
        traveler_id: i32,
        travel_id: i32,
        travelers: &[Traveler],
    ) -> Result<BookingWithTickets, IssueError> {
        validate_travelers(travelers)?;

        let travel = self
            .bookings
            .find_travel(travel_id)
            .await?
            .ok_or(IssueError::TravelNotFound(travel_id))?;

        let booking = NewBooking {
            traveler_id,
            travel_id,
            total_price: travel.price * Decimal::from(travelers.len()),
        };

        let created = self
            .bookings
            .create_booking_with_tickets(booking, travelers, self.minter.as_ref())
            .await?;

        info!(
            booking_id = created.booking.id,
            travel_id,
            traveler_id,
            tickets = created.tickets.len(),
            "Booking created"
        );

        Ok(created)
    }
}

fn validate_travelers(travelers: &[Traveler]) -> Result<(), IssueError> {
    if travelers.is_empty() {
        return Err(IssueError::NoTravelers);
    }

    for (offset, traveler) in travelers.iter().enumerate() {
        if traveler.name.trim().is_empty() {
            return Err(IssueError::InvalidTraveler(format!(
                "traveler {} has no name",
                offset + 1
            )));
        }
        // The QR payload is a single line of text.
        if traveler.name.chars().any(char::is_control) {
            return Err(IssueError::InvalidTraveler(format!(
                "traveler {} has control characters in their name",
                offset + 1
            )));
        }
        if !(0..=MAX_TRAVELER_AGE).contains(&traveler.age) {
            return Err(IssueError::InvalidTraveler(format!(
                "traveler {} has an invalid age",
                offset + 1
            )));
        }
    }

    Ok(())
}
