//! Request handlers, grouped by resource.

pub mod auth;
pub mod entries;
pub mod files;
pub mod folders;
pub mod health;
pub mod media;
pub mod tags;
pub mod uploads;
