//! Request context carrying the authenticated identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vault_entity::Owner;

/// Context for the current authenticated request.
///
/// Built by the session middleware and passed into service methods so
/// every operation knows which identity is acting. It is request-scoped;
/// services hold no per-user state of their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The identity from the session cookie.
    pub owner: Owner,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(owner: Owner) -> Self {
        Self {
            owner,
            request_time: Utc::now(),
        }
    }

    /// The owner to record on a new row: the explicit one, else the caller.
    pub fn owner_or_self(&self, owner: Option<Owner>) -> Owner {
        owner.unwrap_or(self.owner)
    }
}
