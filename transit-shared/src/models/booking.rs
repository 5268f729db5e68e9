use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Route;
use crate::pii::Masked;

/// Booking status in the lifecycle.
///
/// `Created` only exists while a record is being assembled; stored bookings
/// start at `PendingPayment`. `Confirmed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Created,
    PendingPayment,
    Confirmed,
    Failed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Created => "created",
            BookingStatus::PendingPayment => "pending_payment",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Failed => "failed",
        }
    }

    /// Whether the state machine has an edge from `self` to `next`.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Created, BookingStatus::PendingPayment)
                | (BookingStatus::PendingPayment, BookingStatus::Confirmed)
                | (BookingStatus::PendingPayment, BookingStatus::Failed)
        )
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status change the state machine has no edge for.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Booking {booking_id} cannot move from {from} to {to}")]
pub struct TransitionError {
    pub booking_id: String,
    pub from: BookingStatus,
    pub to: BookingStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PassengerDetail {
    pub name: String,
    pub phone: Masked<String>,
}

impl PassengerDetail {
    pub fn new(name: &str, phone: &str) -> Self {
        Self {
            name: name.to_string(),
            phone: Masked(phone.to_string()),
        }
    }
}

/// A reservation of one or more seats on a route, carrying its payment and
/// ticketing state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    #[serde(rename = "booking_id")]
    pub id: String,
    pub route_id: String,
    pub departure_date: String,
    pub seat_numbers: Vec<String>,
    pub user_id: String,
    pub passenger_details: Vec<PassengerDetail>,
    pub amount: i64,
    pub currency: String,
    /// Correlation token for asynchronous payment notifications
    pub payment_reference: String,
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
    /// Transaction named by the notification that failed the booking
    #[serde(skip)]
    pub failed_transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Assemble a booking against `route`. The amount is fixed here from the
    /// route fare and the seat count.
    pub fn new(
        id: String,
        payment_reference: String,
        route: &Route,
        departure_date: String,
        seat_numbers: Vec<String>,
        user_id: String,
        passenger_details: Vec<PassengerDetail>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            route_id: route.id.clone(),
            departure_date,
            amount: route.fare_for(seat_numbers.len()),
            seat_numbers,
            user_id,
            passenger_details,
            currency: route.currency.clone(),
            payment_reference,
            status: BookingStatus::Created,
            transaction_id: None,
            payment_method: None,
            ticket_number: None,
            qr_code: None,
            failed_transaction_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to `new_status` along a state machine edge. The booking is left
    /// unchanged when no such edge exists.
    pub fn update_status(&mut self, new_status: BookingStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(new_status) {
            return Err(TransitionError {
                booking_id: self.id.clone(),
                from: self.status,
                to: new_status,
            });
        }
        self.status = new_status;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Record a successful payment and the ticket issued for it.
    pub fn confirm(
        &mut self,
        transaction_id: String,
        payment_method: String,
        ticket_number: String,
        qr_code: String,
    ) -> Result<(), TransitionError> {
        self.update_status(BookingStatus::Confirmed)?;
        self.transaction_id = Some(transaction_id);
        self.payment_method = Some(payment_method);
        self.ticket_number = Some(ticket_number);
        self.qr_code = Some(qr_code);
        Ok(())
    }

    /// Record a failed payment. The transaction is remembered for matching
    /// redeliveries but never exposed as `transaction_id`.
    pub fn fail(&mut self, transaction_id: String) -> Result<(), TransitionError> {
        self.update_status(BookingStatus::Failed)?;
        self.failed_transaction_id = Some(transaction_id);
        Ok(())
    }

    pub fn seat_count(&self) -> usize {
        self.seat_numbers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route() -> Route {
        Route::new("DSM-MWZ-001", "Dar es Salaam", "Mwanza", 45000, "TZS", 22)
    }

    fn booking() -> Booking {
        Booking::new(
            "BK-1".to_string(),
            "REF-1".to_string(),
            &route(),
            "2025-01-15".to_string(),
            vec!["A1".to_string(), "A2".to_string()],
            "user-1".to_string(),
            vec![
                PassengerDetail::new("Asha", "+255700000001"),
                PassengerDetail::new("Juma", "+255700000002"),
            ],
        )
    }

    #[test]
    fn test_new_booking_prices_from_route() {
        let booking = booking();
        assert_eq!(booking.amount, 90000);
        assert_eq!(booking.currency, "TZS");
        assert_eq!(booking.status, BookingStatus::Created);
    }

    #[test]
    fn test_state_machine_edges() {
        use BookingStatus::*;

        assert!(Created.can_transition_to(PendingPayment));
        assert!(PendingPayment.can_transition_to(Confirmed));
        assert!(PendingPayment.can_transition_to(Failed));

        assert!(!Created.can_transition_to(Confirmed));
        assert!(!Confirmed.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Confirmed));
        assert!(!Confirmed.can_transition_to(PendingPayment));
    }

    #[test]
    fn test_rejected_transition_leaves_booking_unchanged() {
        let mut booking = booking();

        let err = booking
            .confirm("TXN-1".into(), "mpesa".into(), "TKT-1".into(), "qr".into())
            .unwrap_err();
        assert_eq!(err.from, BookingStatus::Created);
        assert_eq!(err.to, BookingStatus::Confirmed);
        assert_eq!(booking.status, BookingStatus::Created);
        assert!(booking.transaction_id.is_none());
        assert!(booking.ticket_number.is_none());

        booking.update_status(BookingStatus::PendingPayment).unwrap();
        booking.fail("TXN-2".into()).unwrap();
        assert_eq!(booking.status, BookingStatus::Failed);
        assert!(booking.fail("TXN-3".into()).is_err());
        assert_eq!(booking.failed_transaction_id.as_deref(), Some("TXN-2"));
    }

    #[test]
    fn test_failed_transaction_is_not_serialized() {
        let mut booking = booking();
        booking.update_status(BookingStatus::PendingPayment).unwrap();
        booking.fail("TXN-F".into()).unwrap();

        let json = serde_json::to_value(&booking).unwrap();
        assert_eq!(json["status"], "failed");
        assert!(json.get("transaction_id").is_none());
        assert!(json.get("failed_transaction_id").is_none());
    }

    #[test]
    fn test_serialization_omits_unset_payment_fields() {
        let mut booking = booking();
        booking.update_status(BookingStatus::PendingPayment).unwrap();

        let json = serde_json::to_value(&booking).unwrap();
        assert_eq!(json["booking_id"], "BK-1");
        assert_eq!(json["status"], "pending_payment");
        assert!(json.get("transaction_id").is_none());
        assert!(json.get("ticket_number").is_none());

        booking.confirm(
            "TXN-1".to_string(),
            "mpesa".to_string(),
            "TKT-1".to_string(),
            "qr".to_string(),
        )
        .unwrap();
        let json = serde_json::to_value(&booking).unwrap();
        assert_eq!(json["status"], "confirmed");
        assert_eq!(json["transaction_id"], "TXN-1");
        assert_eq!(json["ticket_number"], "TKT-1");
    }
}
