use axum::{
    extract::State,
    http::Method,
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod bookings;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod webhooks;

pub use state::AppState;

/// Method and path of every endpoint, logged at startup.
pub const ROUTE_TABLE: &[(&str, &str)] = &[
    ("GET", "/api/routes"),
    ("POST", "/api/bookings (requires Authorization header)"),
    ("GET", "/api/bookings/{id} (requires Authorization header)"),
    ("POST", "/api/bookings/{id}/confirm (requires Authorization header)"),
    ("POST", "/webhooks/payment"),
    ("GET", "/health"),
];

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let protected = bookings::routes().route_layer(from_fn_with_state(
        state.clone(),
        middleware::bearer_auth_middleware,
    ));

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .merge(protected)
        .merge(webhooks::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "transit booking backend",
        "environment": state.environment,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
