use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, Config, SecurityHeadersLayer};
use crate::handlers::bookings::{create_booking, get_booking};
use crate::handlers::health_check;
use crate::handlers::tickets::scan_ticket;
use crate::state::AppState;

pub fn create_routes(state: AppState, config: &Config) -> Router {
    // Scan results reflect live check-in state and must never be cached.
    let ticket_routes = Router::new()
        .route("/scan", post(scan_ticket))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/bookings", post(create_booking))
        .route("/bookings/:id", get(get_booking))
        .nest("/tickets", ticket_routes)
        .layer(TraceLayer::new_for_http())
        .layer(SecurityHeadersLayer::new(config.production))
        .layer(create_cors_layer(&config.cors_allowed_origins))
        .with_state(state)
}
