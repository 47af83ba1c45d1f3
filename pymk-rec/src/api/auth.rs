//! Session middleware for pymk-rec
//!
//! Resolves the caller from `Authorization: Bearer <token>` or, failing
//! that, the `session` cookie. Unknown or expired tokens get 401 before any
//! recommendation work starts.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use pymk_common::session::resolve_session;
use pymk_common::time::now;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::AppState;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session";

/// Authenticated requester, inserted into request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester(pub String);

/// Session middleware
///
/// Applied to protected routes only; `/health` does not use it.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = session_token(request.headers()) else {
        debug!("Request without session token");
        return Err(ApiError::Unauthorized);
    };

    let user_id = resolve_session(&state.db, &token, now()).await?;
    let Some(user_id) = user_id else {
        warn!("Rejected unknown or expired session token");
        return Err(ApiError::Unauthorized);
    };

    request.extensions_mut().insert(Requester(user_id));
    Ok(next.run(request).await)
}

/// Extract the session token from headers
fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
