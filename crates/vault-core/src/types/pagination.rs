//! Keyset pagination over the `(created_at DESC, id DESC)` ordering.
//!
//! A cursor is the sort key of the last row a client has seen. The next page
//! holds rows strictly after it in that order, which stays exact when many
//! rows share a timestamp, unlike an offset.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Sort key of the last row returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor {
    /// Creation time of the row.
    pub created_at: DateTime<Utc>,
    /// Id of the row, the tie-breaker.
    pub id: Uuid,
}

impl Cursor {
    /// Create a cursor from a row's sort key.
    pub fn new(created_at: DateTime<Utc>, id: Uuid) -> Self {
        Self { created_at, id }
    }

    /// Whether a row with the given key comes strictly after this cursor in
    /// descending `(created_at, id)` order.
    pub fn precedes(&self, created_at: DateTime<Utc>, id: Uuid) -> bool {
        created_at < self.created_at || (created_at == self.created_at && id < self.id)
    }

    /// Opaque token handed to clients.
    pub fn encode(&self) -> String {
        let raw = format!(
            "{}|{}",
            self.created_at.timestamp_micros(),
            self.id.as_simple()
        );
        URL_SAFE_NO_PAD.encode(raw)
    }

    /// Parse a token produced by [`Cursor::encode`].
    pub fn decode(token: &str) -> Result<Self, AppError> {
        let invalid = || AppError::validation("Invalid pagination cursor");
        let bytes = URL_SAFE_NO_PAD.decode(token).map_err(|_| invalid())?;
        let raw = String::from_utf8(bytes).map_err(|_| invalid())?;
        let (micros, id) = raw.split_once('|').ok_or_else(invalid)?;
        let micros: i64 = micros.parse().map_err(|_| invalid())?;
        let created_at = DateTime::<Utc>::from_timestamp_micros(micros).ok_or_else(invalid)?;
        let id = Uuid::parse_str(id).map_err(|_| invalid())?;
        Ok(Self { created_at, id })
    }
}

/// One page of a keyset-paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// The items on this page, at most the requested limit.
    pub items: Vec<T>,
    /// Token for the following page, `None` when the listing is exhausted.
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Build a page from up to `limit + 1` rows fetched in order.
    ///
    /// The extra row only signals that another page exists; it is dropped
    /// and the cursor points at the last row kept.
    pub fn from_overfetch(mut rows: Vec<T>, limit: usize, key: impl Fn(&T) -> Cursor) -> Self {
        let has_more = rows.len() > limit;
        rows.truncate(limit);
        let next_cursor = if has_more {
            rows.last().map(|row| key(row).encode())
        } else {
            None
        };
        Self {
            items: rows,
            next_cursor,
        }
    }
}
