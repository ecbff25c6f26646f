//! End-to-end tests driving the router in process.

mod helpers;

mod auth_test;
mod catalog_test;
mod media_test;
mod mutation_test;
mod upload_test;
