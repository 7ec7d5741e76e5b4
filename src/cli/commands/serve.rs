use anyhow::Context;
use std::sync::Arc;

use crate::app::{app, AppState};
use crate::auth::TokenIssuer;
use crate::config::AppConfig;
use crate::database::{CatalogStore, DatabaseManager, PgCatalogStore, PgUserStore, UserStore};
use crate::memory::{MemoryCatalogStore, MemoryUserStore};

pub async fn handle(port: Option<u16>, in_memory: bool) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env();
    if let Some(port) = port {
        config.api.port = port;
    }
    tracing::info!("Starting music catalog API in {:?} mode", config.environment);

    let tokens = TokenIssuer::from_config(&config.security).context("invalid token configuration")?;

    let (catalog, users): (Arc<dyn CatalogStore>, Arc<dyn UserStore>) = if in_memory {
        tracing::warn!("Using in-memory stores; data is lost on exit");
        (
            Arc::new(MemoryCatalogStore::default()),
            Arc::new(MemoryUserStore::default()),
        )
    } else {
        let pool = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to database")?;
        (
            Arc::new(PgCatalogStore::new(pool.clone(), config.database.enable_query_logging)),
            Arc::new(PgUserStore::new(pool)),
        )
    };

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let state = AppState::new(config, catalog, users, tokens);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
