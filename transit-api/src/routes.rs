use axum::{extract::State, routing::get, Json, Router};
use transit_shared::models::Route;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/routes", get(list_routes))
}

/// GET /api/routes
/// The full route catalog
async fn list_routes(State(state): State<AppState>) -> Json<Vec<Route>> {
    Json(state.bookings.list_routes())
}
