//! In-memory repository for tests, with the same atomicity guarantees as the
//! Postgres adapter.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Barrier, Mutex};

use super::{BookingRepository, TicketRepository};
use crate::issuance::{IssueError, TicketMinter, MAX_BADGE_ATTEMPTS};
use crate::models::{
    Booking, BookingStatus, BookingWithTickets, NewBooking, Ticket, Travel, Traveler,
};

#[derive(Default)]
struct Tables {
    travels: HashMap<i32, Travel>,
    bookings: HashMap<i32, Booking>,
    tickets: BTreeMap<i32, Ticket>,
    next_booking_id: i32,
    next_ticket_id: i32,
    check_in_writes: usize,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    read_barrier: Option<Arc<Barrier>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every booking lookup wait until `readers` lookups are in flight,
    /// so concurrent scans all observe the same pre-update state.
    pub fn with_read_barrier(mut self, readers: usize) -> Self {
        self.read_barrier = Some(Arc::new(Barrier::new(readers)));
        self
    }

    pub async fn insert_travel(&self, travel: Travel) {
        self.tables.lock().await.travels.insert(travel.id, travel);
    }

    pub async fn insert_booking(&self, booking: Booking, tickets: Vec<Ticket>) {
        let mut tables = self.tables.lock().await;
        tables.next_booking_id = tables.next_booking_id.max(booking.id);
        tables.bookings.insert(booking.id, booking);
        for ticket in tickets {
            tables.next_ticket_id = tables.next_ticket_id.max(ticket.id);
            tables.tickets.insert(ticket.id, ticket);
        }
    }

    pub async fn booking_count(&self) -> usize {
        self.tables.lock().await.bookings.len()
    }

    pub async fn ticket_count(&self) -> usize {
        self.tables.lock().await.tickets.len()
    }

    /// Number of successful check-in updates performed so far.
    pub async fn check_in_writes(&self) -> usize {
        self.tables.lock().await.check_in_writes
    }
}

#[async_trait]
impl TicketRepository for MemoryStore {
    async fn find_booking_with_tickets(
        &self,
        booking_id: i32,
    ) -> Result<Option<BookingWithTickets>, sqlx::Error> {
        let found = {
            let tables = self.tables.lock().await;
            tables.bookings.get(&booking_id).cloned().map(|booking| {
                let tickets = tables
                    .tickets
                    .values()
                    .filter(|ticket| ticket.booking_id == booking_id)
                    .cloned()
                    .collect();
                BookingWithTickets::new(booking, tickets)
            })
        };

        if let Some(barrier) = &self.read_barrier {
            barrier.wait().await;
        }

        Ok(found)
    }

    async fn compare_and_set_checked_in(
        &self,
        ticket_id: i32,
        operator_id: i32,
        at: DateTime<Utc>,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let mut tables = self.tables.lock().await;

        let updated = match tables.tickets.get_mut(&ticket_id) {
            Some(ticket) if !ticket.checked_in => {
                ticket.checked_in = true;
                ticket.checked_in_at = Some(at);
                ticket.checked_in_by_id = Some(operator_id);
                Some(ticket.clone())
            }
            _ => None,
        };

        if updated.is_some() {
            tables.check_in_writes += 1;
        }

        Ok(updated)
    }

    async fn find_ticket(&self, ticket_id: i32) -> Result<Option<Ticket>, sqlx::Error> {
        Ok(self.tables.lock().await.tickets.get(&ticket_id).cloned())
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn find_travel(&self, travel_id: i32) -> Result<Option<Travel>, sqlx::Error> {
        Ok(self.tables.lock().await.travels.get(&travel_id).cloned())
    }

    async fn create_booking_with_tickets(
        &self,
        booking: NewBooking,
        travelers: &[Traveler],
        minter: &dyn TicketMinter,
    ) -> Result<BookingWithTickets, IssueError> {
        let mut tables = self.tables.lock().await;

        // Staged ids and rows are only written back once every ticket is minted.
        let booking_id = tables.next_booking_id + 1;
        let mut next_ticket_id = tables.next_ticket_id;
        let mut taken: HashSet<String> = tables
            .tickets
            .values()
            .map(|ticket| ticket.badge_number.clone())
            .collect();

        let mut tickets = Vec::with_capacity(travelers.len());
        for (offset, traveler) in travelers.iter().enumerate() {
            let mut minted = None;
            for _ in 0..MAX_BADGE_ATTEMPTS {
                let candidate = minter.mint(booking_id, offset + 1, traveler)?;
                if taken.insert(candidate.badge_number.clone()) {
                    minted = Some(candidate);
                    break;
                }
            }
            let new_ticket = minted.ok_or(IssueError::BadgeExhausted)?;

            next_ticket_id += 1;
            tickets.push(Ticket {
                id: next_ticket_id,
                booking_id,
                name: new_ticket.name,
                age: new_ticket.age,
                badge_number: new_ticket.badge_number,
                qr_code_url: new_ticket.qr_code_url,
                checked_in: false,
                checked_in_at: None,
                checked_in_by_id: None,
            });
        }

        let created = Booking {
            id: booking_id,
            traveler_id: booking.traveler_id,
            travel_id: booking.travel_id,
            status: BookingStatus::Pending,
            total_price: booking.total_price,
            created_at: Utc::now(),
        };

        tables.next_booking_id = booking_id;
        tables.next_ticket_id = next_ticket_id;
        tables.bookings.insert(booking_id, created.clone());
        for ticket in &tickets {
            tables.tickets.insert(ticket.id, ticket.clone());
        }

        Ok(BookingWithTickets::new(created, tickets))
    }
}
