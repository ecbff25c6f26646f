//! PostgreSQL repositories, one per table family.
//!
//! Reads run against the pool. Writes take a connection so the catalog
//! store can run them inside one transaction.

pub mod file;
pub mod folder;
pub mod tag;

pub use file::FileRepository;
pub use folder::FolderRepository;
pub use tag::TagRepository;

use vault_core::error::{AppError, ErrorKind};

/// Map a sqlx error into the application taxonomy.
///
/// Constraint violations become conflicts; connection-level failures
/// become `StoreUnavailable` so callers can tell them from bad queries.
pub(crate) fn map_db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::with_source(ErrorKind::Conflict, format!("{context}: duplicate entry"), e)
        }
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => AppError::with_source(
            ErrorKind::Conflict,
            format!("{context}: referenced row missing or still referenced"),
            e,
        ),
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            AppError::with_source(ErrorKind::StoreUnavailable, format!("{context}: database unreachable"), e)
        }
        _ => AppError::with_source(ErrorKind::Database, context, e),
    }
}
