use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::warn;

use super::{BookingRepository, TicketRepository};
use crate::issuance::{IssueError, TicketMinter, MAX_BADGE_ATTEMPTS};
use crate::models::{Booking, BookingWithTickets, NewBooking, Ticket, Travel, Traveler};

const BOOKING_COLUMNS: &str = "id, traveler_id, travel_id, status, total_price, created_at";
const TICKET_COLUMNS: &str = "id, booking_id, name, age, badge_number, qr_code_url, \
     checked_in, checked_in_at, checked_in_by_id";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_ticket(
        tx: &mut Transaction<'_, Postgres>,
        minter: &dyn TicketMinter,
        booking_id: i32,
        position: usize,
        traveler: &Traveler,
    ) -> Result<Ticket, IssueError> {
        let sql = format!(
            "INSERT INTO tickets (booking_id, name, age, badge_number, qr_code_url) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (badge_number) DO NOTHING \
             RETURNING {TICKET_COLUMNS}"
        );

        for attempt in 1..=MAX_BADGE_ATTEMPTS {
            let new_ticket = minter.mint(booking_id, position, traveler)?;

            let inserted: Option<Ticket> = sqlx::query_as(&sql)
                .bind(new_ticket.booking_id)
                .bind(&new_ticket.name)
                .bind(new_ticket.age)
                .bind(&new_ticket.badge_number)
                .bind(&new_ticket.qr_code_url)
                .fetch_optional(&mut **tx)
                .await?;

            match inserted {
                Some(ticket) => return Ok(ticket),
                None => warn!(
                    booking_id,
                    attempt,
                    badge_number = %new_ticket.badge_number,
                    "Badge number already taken"
                ),
            }
        }

        Err(IssueError::BadgeExhausted)
    }
}

#[async_trait]
impl TicketRepository for PgStore {
    async fn find_booking_with_tickets(
        &self,
        booking_id: i32,
    ) -> Result<Option<BookingWithTickets>, sqlx::Error> {
        let booking: Option<Booking> =
            sqlx::query_as(&format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"))
                .bind(booking_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(booking) = booking else {
            return Ok(None);
        };

        let tickets: Vec<Ticket> = sqlx::query_as(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE booking_id = $1 ORDER BY id ASC"
        ))
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(BookingWithTickets::new(booking, tickets)))
    }

    async fn compare_and_set_checked_in(
        &self,
        ticket_id: i32,
        operator_id: i32,
        at: DateTime<Utc>,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        sqlx::query_as(&format!(
            "UPDATE tickets \
             SET checked_in = TRUE, checked_in_at = $2, checked_in_by_id = $3 \
             WHERE id = $1 AND checked_in = FALSE \
             RETURNING {TICKET_COLUMNS}"
        ))
        .bind(ticket_id)
        .bind(at)
        .bind(operator_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_ticket(&self, ticket_id: i32) -> Result<Option<Ticket>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1"))
            .bind(ticket_id)
            .fetch_optional(&self.pool)
            .await
    }
}

#[async_trait]
impl BookingRepository for PgStore {
    async fn find_travel(&self, travel_id: i32) -> Result<Option<Travel>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, title, destination, price, departure_at, created_at, updated_at \
             FROM travels WHERE id = $1",
        )
        .bind(travel_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_booking_with_tickets(
        &self,
        booking: NewBooking,
        travelers: &[Traveler],
        minter: &dyn TicketMinter,
    ) -> Result<BookingWithTickets, IssueError> {
        // Dropping `tx` on any early return rolls the booking back.
        let mut tx = self.pool.begin().await?;

        let created: Booking = sqlx::query_as(&format!(
            "INSERT INTO bookings (traveler_id, travel_id, total_price) \
             VALUES ($1, $2, $3) \
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(booking.traveler_id)
        .bind(booking.travel_id)
        .bind(booking.total_price)
        .fetch_one(&mut *tx)
        .await?;

        let mut tickets = Vec::with_capacity(travelers.len());
        for (offset, traveler) in travelers.iter().enumerate() {
            let ticket = Self::insert_ticket(&mut tx, minter, created.id, offset + 1, traveler).await?;
            tickets.push(ticket);
        }

        tx.commit().await?;

        Ok(BookingWithTickets::new(created, tickets))
    }
}
