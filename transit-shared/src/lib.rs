pub mod models;
pub mod pii;

pub use models::{Booking, BookingStatus, PassengerDetail, Route, TransitionError};
pub use pii::Masked;
