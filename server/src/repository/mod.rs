//! Storage ports used by check-in and ticket issuance.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::issuance::{IssueError, TicketMinter};
use crate::models::{BookingWithTickets, NewBooking, Ticket, Travel, Traveler};

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[cfg(test)]
pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Loads a booking with its tickets ordered by ascending ticket id.
    async fn find_booking_with_tickets(
        &self,
        booking_id: i32,
    ) -> Result<Option<BookingWithTickets>, sqlx::Error>;

    /// Marks the ticket checked in only if it is not already.
    ///
    /// Returns the updated ticket, or `None` when the ticket was already
    /// checked in (or does not exist). Implementations must perform the
    /// test and the write as one atomic step.
    async fn compare_and_set_checked_in(
        &self,
        ticket_id: i32,
        operator_id: i32,
        at: DateTime<Utc>,
    ) -> Result<Option<Ticket>, sqlx::Error>;

    async fn find_ticket(&self, ticket_id: i32) -> Result<Option<Ticket>, sqlx::Error>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn find_travel(&self, travel_id: i32) -> Result<Option<Travel>, sqlx::Error>;

    /// Inserts the booking and one ticket per traveler, in input order, as a
    /// single unit: either everything is stored or nothing is.
    ///
    /// A ticket whose badge number is already taken is minted again, up to
    /// [`crate::issuance::MAX_BADGE_ATTEMPTS`] times.
    async fn create_booking_with_tickets(
        &self,
        booking: NewBooking,
        travelers: &[Traveler],
        minter: &dyn TicketMinter,
    ) -> Result<BookingWithTickets, IssueError>;
}
