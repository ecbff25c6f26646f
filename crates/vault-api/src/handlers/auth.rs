//! Session handlers: login, logout, whoami.

use axum::Json;
use axum::extract::State;
use axum_extra::extract::cookie::SignedCookieJar;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use vault_core::config::auth::AuthConfig;
use vault_core::error::AppError;
use vault_entity::Owner;

use crate::dto::request::LoginRequest;
use crate::dto::response::{ApiResponse, SessionResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::middleware::auth::{removal_cookie, session_cookie};
use crate::state::AppState;

/// The owner whose configured key equals `master_key`.
///
/// Keys are compared in constant time. Every failure looks the same to the
/// caller.
fn check_credentials(config: &AuthConfig, identity: &str, master_key: &str) -> Result<Owner, AppError> {
    let denied = || AppError::authentication("Invalid identity or master key");
    let owner: Owner = identity.parse().map_err(|_| denied())?;
    if master_key.chars().count() < config.min_key_length {
        return Err(denied());
    }
    let configured = config
        .identities
        .iter()
        .find(|i| i.owner.parse::<Owner>().is_ok_and(|o| o == owner))
        .ok_or_else(denied)?;
    let matches: bool = configured
        .master_key
        .as_bytes()
        .ct_eq(master_key.as_bytes())
        .into();
    if matches { Ok(owner) } else { Err(denied()) }
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<(SignedCookieJar, Json<ApiResponse<SessionResponse>>), ApiError> {
    let auth = &state.config.auth;
    let owner = check_credentials(auth, &body.identity, &body.master_key).inspect_err(|_| {
        warn!(identity = %body.identity, "Rejected login");
    })?;
    info!(owner = %owner, "Signed in");
    Ok((
        jar.add(session_cookie(auth, owner)),
        Json(ApiResponse::ok(SessionResponse { owner })),
    ))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> (SignedCookieJar, Json<ApiResponse<()>>) {
    (
        jar.remove(removal_cookie(&state.config.auth)),
        Json(ApiResponse::ok(())),
    )
}

/// GET /api/auth/me
pub async fn me(auth: AuthUser) -> Json<ApiResponse<SessionResponse>> {
    Json(ApiResponse::ok(SessionResponse { owner: auth.owner }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_core::config::auth::IdentityConfig;
    use vault_core::error::ErrorKind;

    fn config() -> AuthConfig {
        AuthConfig {
            identities: vec![IdentityConfig {
                owner: "Belle".to_string(),
                master_key: "k".repeat(62),
            }],
            min_key_length: 62,
            cookie_name: "active_identity".to_string(),
            session_ttl_seconds: 60,
            cookie_secure: false,
            cookie_secret: "s".repeat(64),
        }
    }

    #[test]
    fn test_accepts_configured_key() {
        let owner = check_credentials(&config(), "belle", &"k".repeat(62)).unwrap();
        assert_eq!(owner, Owner::Belle);
    }

    #[test]
    fn test_rejections_are_indistinguishable() {
        let cfg = config();
        for (identity, key) in [
            ("Belle", "k".repeat(61)),
            ("Belle", "x".repeat(62)),
            ("Wise", "k".repeat(62)),
            ("nobody", "k".repeat(62)),
        ] {
            let err = check_credentials(&cfg, identity, &key).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Authentication);
            assert_eq!(err.message, "Invalid identity or master key");
        }
    }
}
