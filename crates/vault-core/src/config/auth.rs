//! Session cookie and identity configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One identity allowed to sign in, with its master key.
#[derive(Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Owner name the identity maps to.
    pub owner: String,
    /// Secret the caller must present.
    pub master_key: String,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("owner", &self.owner)
            .field("master_key", &"***")
            .finish()
    }
}

/// Authentication configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Identities permitted to sign in.
    #[serde(default)]
    pub identities: Vec<IdentityConfig>,
    /// Minimum accepted master key length.
    #[serde(default = "default_min_key_length")]
    pub min_key_length: usize,
    /// Name of the session cookie.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Session lifetime in seconds.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: u64,
    /// Mark the cookie `Secure`.
    #[serde(default = "default_true")]
    pub cookie_secure: bool,
    /// Secret the cookie signing key is derived from.
    pub cookie_secret: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("identities", &self.identities)
            .field("min_key_length", &self.min_key_length)
            .field("cookie_name", &self.cookie_name)
            .field("session_ttl_seconds", &self.session_ttl_seconds)
            .field("cookie_secure", &self.cookie_secure)
            .field("cookie_secret", &"***")
            .finish()
    }
}

/// Shortest secret accepted for deriving the cookie signing key.
pub const MIN_COOKIE_SECRET_LEN: usize = 64;

impl AuthConfig {
    /// Reject secrets that are too short to be safe.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.cookie_secret.len() < MIN_COOKIE_SECRET_LEN {
            return Err(AppError::configuration(format!(
                "auth.cookie_secret must be at least {MIN_COOKIE_SECRET_LEN} bytes"
            )));
        }
        for identity in &self.identities {
            if identity.master_key.len() < self.min_key_length {
                return Err(AppError::configuration(format!(
                    "Master key for '{}' is shorter than {} characters",
                    identity.owner, self.min_key_length
                )));
            }
        }
        Ok(())
    }
}

fn default_min_key_length() -> usize {
    62
}

fn default_cookie_name() -> String {
    "active_identity".to_string()
}

fn default_session_ttl() -> u64 {
    24 * 60 * 60
}

fn default_true() -> bool {
    true
}
