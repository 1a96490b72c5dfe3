use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::models::Traveler;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub travel_id: i32,
    pub travelers: Vec<Traveler>,
}

pub async fn create_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Response, AppError> {
    let booking = state
        .issuer
        .issue(user.id, request.travel_id, &request.travelers)
        .await?;

    Ok(created(booking, "Booking created"))
}

/// Visible to the traveler who booked and to staff allowed to check tickets in.
pub async fn get_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(booking_id): Path<i32>,
) -> Result<Response, AppError> {
    let booking = state
        .tickets
        .find_booking_with_tickets(booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {booking_id} not found")))?;

    if booking.booking.traveler_id != user.id && !state.policy.can_check_in(&user) {
        return Err(AppError::Forbidden(
            "You cannot view this booking".to_string(),
        ));
    }

    Ok(success(booking, "Booking retrieved"))
}
