use serde::{Deserialize, Serialize};

/// A bus route offered for booking. Seeded once at startup and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Route {
    pub id: String,
    pub origin: String,
    pub destination: String,
    /// Fare per seat in whole currency units
    pub price: i64,
    pub currency: String,
    pub duration_hours: u32,
}

impl Route {
    pub fn new(
        id: &str,
        origin: &str,
        destination: &str,
        price: i64,
        currency: &str,
        duration_hours: u32,
    ) -> Self {
        Self {
            id: id.to_string(),
            origin: origin.to_string(),
            destination: destination.to_string(),
            price,
            currency: currency.to_string(),
            duration_hours,
        }
    }

    /// Total fare for `seats` seats.
    pub fn fare_for(&self, seats: usize) -> i64 {
        self.price * seats as i64
    }
}
