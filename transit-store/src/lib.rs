pub mod app_config;
pub mod booking_repo;

pub use booking_repo::{BookingStore, StoreError};
