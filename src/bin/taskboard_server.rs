//! Task board HTTP server.
//!
//! Configuration comes from `TASKBOARD_*` environment variables (see
//! [`taskboard::config`]). Without `TASKBOARD_DATABASE_URL` the server keeps
//! everything in memory; with it, the schema under `migrations/` must
//! already be applied.

use std::sync::Arc;

use anyhow::Context;
use taskboard::{
    api::{self, AppState, AuthConfig},
    config::ServerConfig,
    storage::{InMemoryStore, PostgresStore},
    telemetry,
    tenancy::adapters::StaticIdentityProvider,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let config = ServerConfig::from_env().context("invalid configuration")?;

    let identity: StaticIdentityProvider = config.sessions.iter().cloned().collect();
    tracing::info!(sessions = config.sessions.len(), "static sessions loaded");
    let mut auth = AuthConfig::new(Arc::new(identity));
    match &config.service_key {
        Some(key) => auth = auth.with_service_key(key),
        None => tracing::warn!("TASKBOARD_SERVICE_KEY not set; service calls are disabled"),
    }

    let state = match &config.database_url {
        Some(url) => {
            let store = PostgresStore::connect(url, config.pool_size)
                .context("failed to connect to PostgreSQL")?;
            tracing::info!(pool_size = config.pool_size, "using PostgreSQL store");
            AppState::from_store(Arc::new(store), auth)
        }
        None => {
            tracing::warn!("TASKBOARD_DATABASE_URL not set; data is kept in memory only");
            AppState::from_store(Arc::new(InMemoryStore::new()), auth)
        }
    };

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "taskboard server listening");
    axum::serve(listener, api::router(state)).await?;

    Ok(())
}
