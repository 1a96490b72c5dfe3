use std::sync::Arc;

use crate::auth::JwtKeys;
use crate::checkin::{CheckInPolicy, CheckInVerifier, RolePolicy};
use crate::issuance::{StandardMinter, SvgQrRenderer, TicketIssuer};
use crate::repository::{BookingRepository, TicketRepository};

#[derive(Clone)]
pub struct AppState {
    pub tickets: Arc<dyn TicketRepository>,
    pub verifier: Arc<CheckInVerifier>,
    pub issuer: Arc<TicketIssuer>,
    pub policy: Arc<dyn CheckInPolicy>,
    pub jwt: Arc<JwtKeys>,
}

impl AppState {
    /// Wires the services around one store that backs both repositories.
    pub fn new<S>(store: Arc<S>, jwt: JwtKeys, qr_min_size: u32) -> Self
    where
        S: TicketRepository + BookingRepository + 'static,
    {
        let tickets: Arc<dyn TicketRepository> = store.clone();
        let bookings: Arc<dyn BookingRepository> = store;
        let policy: Arc<dyn CheckInPolicy> = Arc::new(RolePolicy::default());

        let minter = StandardMinter::new(Arc::new(SvgQrRenderer::new(qr_min_size)));

        Self {
            verifier: Arc::new(CheckInVerifier::new(tickets.clone(), policy.clone())),
            issuer: Arc::new(TicketIssuer::new(bookings, Arc::new(minter))),
            tickets,
            policy,
            jwt: Arc::new(jwt),
        }
    }
}
