pub mod models;
pub mod manager;
pub mod ticketing;

pub use models::{NewBooking, PaymentConfirmation, WebhookPayment};
pub use manager::{BookingError, BookingManager};
pub use ticketing::{Ticket, TicketIssuer};
