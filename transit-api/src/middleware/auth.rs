use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::state::{AppState, AuthConfig};

// ============================================================================
// Caller identity
// ============================================================================

/// Who is calling, as far as the placeholder token check can tell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub source: String,
}

const HOST_TOKEN_PREFIX: &str = "host-token";

/// Validate an `Authorization` header value. This is a format check on
/// known token sources, not a credential verification.
pub fn authenticate(header: Option<&str>, auth: &AuthConfig) -> Result<Caller, AppError> {
    let header = header
        .ok_or_else(|| AppError::AuthenticationError("Authorization header required".into()))?;

    let token = header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::AuthenticationError("Invalid authorization header format".into())
    })?;

    if token.is_empty() {
        return Err(AppError::AuthenticationError("Bearer token is empty".into()));
    }
    if token.len() < auth.min_token_length {
        return Err(AppError::AuthenticationError("Invalid token format".into()));
    }
    if !auth
        .token_prefixes
        .iter()
        .any(|prefix| token.starts_with(prefix.as_str()))
    {
        return Err(AppError::AuthenticationError("Invalid token source".into()));
    }

    let (user_id, source) = if token.starts_with(HOST_TOKEN_PREFIX) {
        ("host-app-user-123", "host_app")
    } else {
        ("mock-user-456", "mock")
    };

    Ok(Caller {
        user_id: user_id.to_string(),
        source: source.to_string(),
    })
}

// ============================================================================
// Bearer Authentication Middleware
// ============================================================================

pub async fn bearer_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let caller = authenticate(header, &state.auth)?;
    tracing::debug!(user_id = %caller.user_id, source = %caller.source, "Caller authenticated");

    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}
