use std::sync::Arc;
use transit_booking::BookingManager;
use transit_catalog::RouteCatalog;
use transit_store::{app_config::Config, BookingStore};

#[derive(Clone)]
pub struct AuthConfig {
    pub min_token_length: usize,
    pub token_prefixes: Vec<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub bookings: Arc<BookingManager>,
    pub auth: AuthConfig,
    pub environment: String,
}

impl AppState {
    /// State over the seeded route catalog and an empty booking store.
    pub fn from_config(config: &Config) -> Self {
        let bookings = BookingManager::new(
            Arc::new(RouteCatalog::seeded()),
            Arc::new(BookingStore::new()),
        );

        Self {
            bookings: Arc::new(bookings),
            auth: AuthConfig {
                min_token_length: config.auth.min_token_length,
                token_prefixes: config.auth.token_prefixes.clone(),
            },
            environment: config.app.environment.clone(),
        }
    }
}
