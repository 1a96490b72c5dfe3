//! Ticket check-in at the gate.
//!
//! A scan resolves the QR payload to exactly one ticket and moves it from
//! "not checked in" to "checked in". The transition happens once; scanning
//! an already checked-in ticket is a successful no-op that reports the
//! original check-in time.

pub mod payload;
pub mod policy;

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::auth::AuthUser;
use crate::models::TicketSummary;
use crate::repository::TicketRepository;

pub use payload::{MalformedPayload, QrPayload};
pub use policy::{CheckInPolicy, RolePolicy};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("QR code is required")]
    MissingPayload,

    #[error("Invalid QR code format")]
    MalformedPayload,

    #[error("Booking {0} not found")]
    BookingNotFound(i32),

    #[error("Booking {0} has no tickets")]
    NoTicketsForBooking(i32),

    #[error("Traveler index {index} is out of range for {count} ticket(s)")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("Traveler name does not match this ticket")]
    NameMismatch,

    #[error("Operator is not allowed to check tickets in")]
    Forbidden,

    #[error("Storage error")]
    Storage(#[from] sqlx::Error),
}

impl From<MalformedPayload> for ScanError {
    fn from(_: MalformedPayload) -> Self {
        ScanError::MalformedPayload
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    /// `true` when the ticket had been checked in before this scan.
    pub already_scanned: bool,
    pub ticket: TicketSummary,
}

pub struct CheckInVerifier {
    tickets: Arc<dyn TicketRepository>,
    policy: Arc<dyn CheckInPolicy>,
}

impl CheckInVerifier {
    pub fn new(tickets: Arc<dyn TicketRepository>, policy: Arc<dyn CheckInPolicy>) -> Self {
        Self { tickets, policy }
    }

    /// Checks in the ticket identified by the scanned `code`.
    ///
    /// `code` is `None` when the request carried no usable text.
    pub async fn scan(
        &self,
        code: Option<&str>,
        operator: &AuthUser,
    ) -> Result<ScanOutcome, ScanError> {
        if !self.policy.can_check_in(operator) {
            warn!(operator_id = operator.id, role = ?operator.role, "Check-in refused for role");
            return Err(ScanError::Forbidden);
        }

        let code = code
            .filter(|code| !code.trim().is_empty())
            .ok_or(ScanError::MissingPayload)?;
        let payload = QrPayload::decode(code)?;

        let booking = self
            .tickets
            .find_booking_with_tickets(payload.booking_id)
            .await?
            .ok_or(ScanError::BookingNotFound(payload.booking_id))?;

        let count = booking.tickets.len();
        if count == 0 {
            return Err(ScanError::NoTicketsForBooking(payload.booking_id));
        }

        let ticket = booking
            .ticket_at(payload.index)
            .ok_or(ScanError::IndexOutOfRange {
                index: payload.index,
                count,
            })?;

        if !names_match(&ticket.name, &payload.name) {
            warn!(
                booking_id = payload.booking_id,
                ticket_id = ticket.id,
                index = payload.index,
                "Scanned name does not match ticket"
            );
            return Err(ScanError::NameMismatch);
        }

        if ticket.checked_in {
            debug!(ticket_id = ticket.id, operator_id = operator.id, "Ticket scanned again");
            return Ok(ScanOutcome {
                already_scanned: true,
                ticket: ticket.summary(),
            });
        }

        let updated = self
            .tickets
            .compare_and_set_checked_in(ticket.id, operator.id, Utc::now())
            .await?;

        match updated {
            Some(updated) => {
                info!(
                    booking_id = updated.booking_id,
                    ticket_id = updated.id,
                    operator_id = operator.id,
                    "Ticket checked in"
                );
                Ok(ScanOutcome {
                    already_scanned: false,
                    ticket: updated.summary(),
                })
            }
            None => {
                // Another scan won the update between our read and write.
                let current = self
                    .tickets
                    .find_ticket(ticket.id)
                    .await?
                    .ok_or(ScanError::BookingNotFound(payload.booking_id))?;

                debug!(ticket_id = current.id, operator_id = operator.id, "Lost check-in race");
                Ok(ScanOutcome {
                    already_scanned: true,
                    ticket: current.summary(),
                })
            }
        }
    }
}

fn names_match(stored: &str, scanned: &str) -> bool {
    stored.trim().to_lowercase() == scanned.trim().to_lowercase()
}
