//! # vault-api
//!
//! HTTP API layer for the media vault built on Axum.
//!
//! Provides the REST endpoints under `/api`, the signed-cookie session
//! middleware, extractors, DTOs, and the mapping from [`AppError`] kinds to
//! HTTP status codes.
//!
//! [`AppError`]: vault_core::AppError

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state, run_server};
pub use error::ApiError;
pub use state::AppState;
