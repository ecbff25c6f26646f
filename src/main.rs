//! Media vault server.
//!
//! Main entry point: loads configuration, installs logging, and hands over
//! to the API crate to wire stores and services and serve requests.

use tracing_subscriber::{EnvFilter, fmt};

use vault_core::config::AppConfig;
use vault_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = vault_api::run_server(config).await {
        tracing::error!(kind = %e.kind, error = %e.message, "Server error");
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the `VAULT_ENV` overlay, and environment
/// variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("VAULT_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        database = if config.database.is_memory() { "memory" } else { "postgres" },
        storage = ?config.storage.provider,
        "Configuration loaded"
    );
}
