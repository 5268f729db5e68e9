pub mod booking;
pub mod route;

pub use booking::{Booking, BookingStatus, PassengerDetail, TransitionError};
pub use route::Route;
