//! Pipit Server: Application entry point.
//!
//! Loads configuration, connects and migrates the store, seeds the
//! administrator, then holds the shared services until shutdown.

mod settings;
mod state;

use anyhow::{Context, Result};
use pipit_db::Store;
use pipit_db::bootstrap::{AdminSeed, SeedOutcome};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::settings::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::load()?;

    let filter = match &config.log_filter {
        Some(directive) => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(directive))
            .context("invalid log filter")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pipit=info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    info!("Starting Pipit server...");

    let auth_config = config.auth.to_auth_config()?;

    // Accounts are hashed and verified with the same pepper.
    let store = Store::connect(&config.database, auth_config.passwords.clone())
        .await
        .context("opening SurrealDB store")?;

    match config.admin.password {
        Some(password) => {
            let seed = AdminSeed {
                username: config.admin.username,
                password,
            };
            match store.seed_admin(seed).await? {
                SeedOutcome::Created(user) => info!(user_id = %user.id, "Administrator created"),
                SeedOutcome::AlreadyPresent(_) => {}
            }
        }
        None => warn!(
            username = %config.admin.username,
            "No admin password configured; skipping admin seeding"
        ),
    }

    let state = AppState::new(store.users().clone(), store.posts().clone(), auth_config);
    state.announce_ready().await?;

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;

    info!("Pipit server stopped.");
    Ok(())
}
