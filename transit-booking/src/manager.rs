use std::sync::Arc;

use tracing::{info, warn};
use transit_catalog::RouteCatalog;
use transit_shared::models::{Booking, BookingStatus, Route, TransitionError};
use transit_store::{BookingStore, StoreError};
use uuid::Uuid;

use crate::models::{NewBooking, PaymentConfirmation, WebhookPayment, WEBHOOK_PAYMENT_METHOD};
use crate::ticketing::TicketIssuer;

/// Fresh identifiers to try before giving up on an insert.
const MAX_ID_ATTEMPTS: usize = 3;

/// Owns booking records and drives them through the payment lifecycle:
///
/// ```text
/// created → pending_payment → confirmed
///                           → failed
/// ```
///
/// Every operation is synchronous and safe to call from any number of threads.
pub struct BookingManager {
    catalog: Arc<RouteCatalog>,
    store: Arc<BookingStore>,
    tickets: TicketIssuer,
}

impl BookingManager {
    pub fn new(catalog: Arc<RouteCatalog>, store: Arc<BookingStore>) -> Self {
        Self {
            catalog,
            store,
            tickets: TicketIssuer::new(),
        }
    }

    pub fn list_routes(&self) -> Vec<Route> {
        self.catalog.list_routes()
    }

    /// Open a booking awaiting payment. The fare is fixed from the route price
    /// and the seat count.
    pub fn create_booking(&self, request: NewBooking) -> Result<Booking, BookingError> {
        let route = self
            .catalog
            .find_route(&request.route_id)
            .ok_or_else(|| BookingError::RouteNotFound(request.route_id.clone()))?;

        if request.seat_numbers.is_empty() {
            return Err(BookingError::NoSeatsSelected);
        }
        if request.passenger_details.len() != request.seat_numbers.len() {
            return Err(BookingError::PassengerCountMismatch {
                seats: request.seat_numbers.len(),
                passengers: request.passenger_details.len(),
            });
        }

        let mut booking = Booking::new(
            new_booking_id(),
            new_payment_reference(),
            route,
            request.departure_date,
            request.seat_numbers,
            request.user_id,
            request.passenger_details,
        );
        booking.update_status(BookingStatus::PendingPayment)?;

        let mut attempts = 1;
        loop {
            match self.store.insert(booking.clone()) {
                Ok(()) => break,
                Err(err) if attempts < MAX_ID_ATTEMPTS => {
                    warn!(error = %err, "Identifier collision, regenerating");
                    booking.id = new_booking_id();
                    booking.payment_reference = new_payment_reference();
                    attempts += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }

        info!(
            booking_id = %booking.id,
            route_id = %booking.route_id,
            seats = booking.seat_count(),
            amount = booking.amount,
            "Booking created"
        );
        Ok(booking)
    }

    pub fn get_booking(&self, booking_id: &str) -> Result<Booking, BookingError> {
        self.store
            .get(booking_id)
            .ok_or_else(|| BookingError::BookingNotFound(booking_id.to_string()))
    }

    /// Transition: PendingPayment → Confirmed, on a client-reported payment.
    ///
    /// Checks run in order: the booking exists, it is awaiting payment, the
    /// amount matches, and the transaction has not confirmed another booking.
    pub fn confirm_payment(
        &self,
        booking_id: &str,
        payment: PaymentConfirmation,
    ) -> Result<Booking, BookingError> {
        info!(booking_id, transaction_id = %payment.transaction_id, "Confirming payment");

        let outcome = self
            .store
            .update(booking_id, |booking| -> Result<Booking, BookingError> {
                ensure_transition(booking, BookingStatus::Confirmed)?;
                ensure_amount(booking, payment.amount)?;
                require("payment_method", &payment.payment_method)?;
                self.issue_ticket(booking, payment.transaction_id, payment.payment_method)?;
                Ok(booking.clone())
            })
            .ok_or_else(|| BookingError::BookingNotFound(booking_id.to_string()))?;

        match &outcome {
            Ok(booking) => info!(
                booking_id,
                ticket_number = booking.ticket_number.as_deref().unwrap_or_default(),
                "Payment confirmed, ticket issued"
            ),
            Err(err) => warn!(booking_id, error = %err, "Payment confirmation rejected"),
        }
        outcome
    }

    /// Apply a payment notification, matched to its booking by payment reference.
    ///
    /// A pending booking is confirmed on `"success"` and failed on anything
    /// else. Against a settled booking, a redelivery of the notification that
    /// settled it (same transaction, same outcome) is accepted without effect;
    /// any other notification conflicts.
    pub fn process_webhook_payment(&self, notification: WebhookPayment) -> Result<(), BookingError> {
        let reference = notification.booking_reference.clone();
        let booking_id = self
            .store
            .id_for_reference(&reference)
            .ok_or_else(|| BookingError::BookingReferenceNotFound(reference.clone()))?;

        info!(
            booking_id = %booking_id,
            transaction_id = %notification.transaction_id,
            status = %notification.status,
            notified_at = %notification.timestamp,
            "Processing payment webhook"
        );

        let success = notification.is_success();
        let outcome = self
            .store
            .update(&booking_id, |booking| -> Result<WebhookOutcome, BookingError> {
                match booking.status {
                    BookingStatus::PendingPayment if success => {
                        ensure_amount(booking, notification.amount)?;
                        self.issue_ticket(
                            booking,
                            notification.transaction_id,
                            WEBHOOK_PAYMENT_METHOD.to_string(),
                        )?;
                        Ok(WebhookOutcome::Applied(BookingStatus::Confirmed))
                    }
                    BookingStatus::PendingPayment => {
                        booking.fail(notification.transaction_id)?;
                        Ok(WebhookOutcome::Applied(BookingStatus::Failed))
                    }
                    BookingStatus::Confirmed
                        if success
                            && booking.transaction_id.as_deref()
                                == Some(notification.transaction_id.as_str()) =>
                    {
                        ensure_amount(booking, notification.amount)?;
                        Ok(WebhookOutcome::Replayed)
                    }
                    BookingStatus::Failed
                        if !success
                            && booking.failed_transaction_id.as_deref()
                                == Some(notification.transaction_id.as_str()) =>
                    {
                        Ok(WebhookOutcome::Replayed)
                    }
                    current => Err(BookingError::InvalidStateTransition {
                        booking_id: booking.id.clone(),
                        current,
                    }),
                }
            })
            .ok_or(BookingError::BookingReferenceNotFound(reference))?;

        match &outcome {
            Ok(WebhookOutcome::Applied(status)) => {
                info!(booking_id = %booking_id, %status, "Webhook applied")
            }
            Ok(WebhookOutcome::Replayed) => {
                info!(booking_id = %booking_id, "Duplicate webhook ignored")
            }
            Err(err) => warn!(booking_id = %booking_id, error = %err, "Webhook rejected"),
        }
        outcome.map(|_| ())
    }

    /// Claim the transaction and mint the ticket. Callers check the transition
    /// first: the claim is never released, so nothing after it may fail.
    fn issue_ticket(
        &self,
        booking: &mut Booking,
        transaction_id: String,
        payment_method: String,
    ) -> Result<(), BookingError> {
        require("transaction_id", &transaction_id)?;
        self.store
            .claim_transaction(&transaction_id, &booking.id)
            .map_err(|owner| BookingError::DuplicateTransactionId {
                transaction_id: transaction_id.clone(),
                booking_id: owner,
            })?;

        let ticket = self.tickets.issue(booking);
        booking.confirm(transaction_id, payment_method, ticket.number, ticket.qr_code)?;
        Ok(())
    }
}

enum WebhookOutcome {
    Applied(BookingStatus),
    Replayed,
}

fn ensure_transition(booking: &Booking, next: BookingStatus) -> Result<(), BookingError> {
    if !booking.status.can_transition_to(next) {
        return Err(BookingError::InvalidStateTransition {
            booking_id: booking.id.clone(),
            current: booking.status,
        });
    }
    Ok(())
}

fn ensure_amount(booking: &Booking, received: i64) -> Result<(), BookingError> {
    if received != booking.amount {
        return Err(BookingError::AmountMismatch {
            expected: booking.amount,
            received,
        });
    }
    Ok(())
}

fn require(field: &'static str, value: &str) -> Result<(), BookingError> {
    if value.trim().is_empty() {
        return Err(BookingError::MissingField(field));
    }
    Ok(())
}

fn new_booking_id() -> String {
    format!("BK-{}", Uuid::new_v4().simple())
}

fn new_payment_reference() -> String {
    format!("REF-{}", Uuid::new_v4().simple())
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("At least one seat must be selected")]
    NoSeatsSelected,

    #[error("Passenger details must match number of seats: {seats} seats, {passengers} passengers")]
    PassengerCountMismatch { seats: usize, passengers: usize },

    #[error("Booking not found: {0}")]
    BookingNotFound(String),

    #[error("Booking with reference {0} not found")]
    BookingReferenceNotFound(String),

    #[error("Booking {booking_id} is not in pending payment status, current status: {current}")]
    InvalidStateTransition {
        booking_id: String,
        current: BookingStatus,
    },

    #[error("Payment amount does not match booking amount. Expected: {expected}, Got: {received}")]
    AmountMismatch { expected: i64, received: i64 },

    #[error("Transaction {transaction_id} already confirmed booking {booking_id}")]
    DuplicateTransactionId {
        transaction_id: String,
        booking_id: String,
    },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl From<TransitionError> for BookingError {
    fn from(err: TransitionError) -> Self {
        BookingError::InvalidStateTransition {
            booking_id: err.booking_id,
            current: err.from,
        }
    }
}
