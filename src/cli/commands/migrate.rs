use anyhow::Context;

use crate::config::AppConfig;
use crate::database::{schema, DatabaseManager};

pub async fn handle() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;

    schema::ensure_tables(&pool).await.context("migration failed")?;
    tracing::info!("Catalog and account tables are up to date");
    Ok(())
}
