use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use transit_booking::WebhookPayment;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/webhooks/payment", post(handle_payment_webhook))
}

/// POST /webhooks/payment
/// Receive payment status updates from the payment counterparty
async fn handle_payment_webhook(
    State(state): State<AppState>,
    payload: Result<Json<WebhookPayment>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(notification) = payload?;
    tracing::info!(
        "Received payment webhook: {} for reference {}",
        notification.status,
        notification.booking_reference
    );

    state.bookings.process_webhook_payment(notification)?;

    Ok(Json(json!({ "message": "payment webhook processed successfully" })))
}
