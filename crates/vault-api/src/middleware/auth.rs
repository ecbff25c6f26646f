//! Signed session cookie.
//!
//! The cookie carries the owner and an expiry, signed with a key derived
//! from `auth.cookie_secret`. Any request under the protected routes
//! without a valid, unexpired cookie is answered with 401 before a handler
//! runs.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use chrono::Utc;
use tracing::debug;

use vault_core::config::auth::AuthConfig;
use vault_core::error::AppError;
use vault_entity::Owner;
use vault_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Build the cookie that signs `owner` in until the session TTL elapses.
pub fn session_cookie(config: &AuthConfig, owner: Owner) -> Cookie<'static> {
    let expires_at = Utc::now().timestamp() + config.session_ttl_seconds as i64;
    Cookie::build((config.cookie_name.clone(), format!("{owner}:{expires_at}")))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie that clears the session.
pub fn removal_cookie(config: &AuthConfig) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), "")).path("/").build()
}

/// The owner of a valid session, if the jar holds one.
pub fn session_owner(jar: &SignedCookieJar, config: &AuthConfig) -> Option<Owner> {
    let cookie = jar.get(&config.cookie_name)?;
    let (owner, expires_at) = cookie.value().split_once(':')?;
    let expires_at: i64 = expires_at.parse().ok()?;
    if expires_at <= Utc::now().timestamp() {
        debug!(owner, "Session cookie expired");
        return None;
    }
    owner.parse().ok()
}

/// Reject requests without a session; attach the request context otherwise.
pub async fn require_session(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let owner = session_owner(&jar, &state.config.auth)
        .ok_or_else(|| AppError::authentication("A valid session is required"))?;
    request.extensions_mut().insert(RequestContext::new(owner));
    Ok(next.run(request).await)
}
