use chrono::{DateTime, Utc};
use serde::Deserialize;
use transit_shared::models::PassengerDetail;

/// Status value a payment notifier sends for a settled payment.
pub const WEBHOOK_SUCCESS: &str = "success";

/// Payment method recorded for bookings confirmed through a notification.
pub const WEBHOOK_PAYMENT_METHOD: &str = "webhook";

/// Everything needed to open a booking against a route
#[derive(Debug, Clone, Deserialize)]
pub struct NewBooking {
    pub route_id: String,
    pub departure_date: String,
    pub seat_numbers: Vec<String>,
    pub user_id: String,
    pub passenger_details: Vec<PassengerDetail>,
}

/// A client-reported payment for a booking
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfirmation {
    pub transaction_id: String,
    pub payment_method: String,
    pub amount: i64,
}

/// Asynchronous notification from the payment counterparty
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayment {
    pub transaction_id: String,
    /// The booking's payment reference, not its id
    pub booking_reference: String,
    pub status: String,
    pub amount: i64,
    pub timestamp: DateTime<Utc>,
}

impl WebhookPayment {
    pub fn is_success(&self) -> bool {
        self.status == WEBHOOK_SUCCESS
    }
}
