use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use transit_booking::{NewBooking, PaymentConfirmation};
use transit_shared::models::{Booking, PassengerDetail};

use crate::error::AppError;
use crate::middleware::Caller;
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub route_id: String,
    pub departure_date: String,
    pub seat_numbers: Vec<String>,
    /// Defaults to the authenticated caller
    pub user_id: Option<String>,
    pub passenger_details: Vec<PassengerDetail>,
}

impl CreateBookingRequest {
    fn into_new_booking(self, caller: &Caller) -> NewBooking {
        NewBooking {
            route_id: self.route_id,
            departure_date: self.departure_date,
            seat_numbers: self.seat_numbers,
            user_id: self
                .user_id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| caller.user_id.clone()),
            passenger_details: self.passenger_details,
        }
    }
}

/// Requires bearer authentication; the router applies the layer.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/bookings", post(create_booking))
        .route("/api/bookings/{id}", get(get_booking))
        .route("/api/bookings/{id}/confirm", post(confirm_payment))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/bookings
/// Open a booking awaiting payment
async fn create_booking(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let Json(req) = payload?;
    let booking = state.bookings.create_booking(req.into_new_booking(&caller))?;

    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /api/bookings/{id}
async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.bookings.get_booking(&booking_id)?))
}

/// POST /api/bookings/{id}/confirm
/// Client-side payment confirmation; issues the ticket on success
async fn confirm_payment(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
    payload: Result<Json<PaymentConfirmation>, JsonRejection>,
) -> Result<Json<Booking>, AppError> {
    let Json(payment) = payload?;
    Ok(Json(state.bookings.confirm_payment(&booking_id, payment)?))
}
